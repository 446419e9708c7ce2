use std::borrow::Cow;
use std::collections::HashMap;

use regex::Regex;
use serde_json;
use validator::ValidationError;

use models::product::Price;

pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    lazy_static! {
        static ref SLUG_VALIDATION_RE: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
    }

    if SLUG_VALIDATION_RE.is_match(slug) {
        Ok(())
    } else {
        Err(ValidationError {
            code: Cow::from("slug"),
            message: Some(Cow::from("Incorrect slug format")),
            params: HashMap::new(),
        })
    }
}

pub fn validate_price(price: &Price) -> Result<(), ValidationError> {
    if price.currency.is_empty() {
        return Err(ValidationError {
            code: Cow::from("currency"),
            message: Some(Cow::from("Currency must not be empty")),
            params: HashMap::new(),
        });
    }
    validate_non_negative(price.amount)
}

pub fn validate_non_negative<T: Into<f64>>(val: T) -> Result<(), ValidationError> {
    if val.into() > 0f64 {
        Ok(())
    } else {
        Err(ValidationError {
            code: Cow::from("value"),
            message: Some(Cow::from("Value must be non negative.")),
            params: HashMap::new(),
        })
    }
}

pub fn validate_string_list(list: &serde_json::Value) -> Result<(), ValidationError> {
    serde_json::from_value::<Vec<String>>(list.clone()).map_err(|_| ValidationError {
        code: Cow::from("list"),
        message: Some(Cow::from("Invalid json format of string list.")),
        params: HashMap::new(),
    })?;

    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    lazy_static! {
        static ref PHONE_VALIDATION_RE: Regex = Regex::new(r"^\+?\d{7}\d*$").unwrap();
    }

    if PHONE_VALIDATION_RE.is_match(phone) {
        Ok(())
    } else {
        Err(ValidationError {
            code: Cow::from("phone"),
            message: Some(Cow::from("Incorrect phone format")),
            params: HashMap::new(),
        })
    }
}
