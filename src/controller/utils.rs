//! Helpers of the http layer: query string and body parsing, bearer token
//! verification, response serialization
use std::collections::HashMap;
use std::str::FromStr;

use failure::Error as FailureError;
use failure::Fail;
use futures::future::IntoFuture;
use futures::{Future, Stream};
use hyper;
use hyper::header::{Authorization, Bearer, Headers};
use jsonwebtoken::{self, Validation};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json;
use urlencoding;

use super::types::ControllerFuture;
use errors::Error;
use models::{
    ApplicationsSearchTerms, CompaniesSearchTerms, PaginationParams, ProductsSearchTerms, RangeFilter, RfqsSearchTerms,
};

/// Claims carried by the bearer token. Tokens are minted by the accounts
/// service; this one only verifies them.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JWTPayload {
    pub user_id: i32,
    pub exp: i64,
}

/// Verifies the Authorization header and returns the calling user, if any.
/// Missing, malformed and expired tokens all read as an anonymous caller.
pub fn user_id_from_headers(headers: &Headers, jwt_secret: &str) -> Option<i32> {
    headers.get::<Authorization<Bearer>>().and_then(|auth| {
        jsonwebtoken::decode::<JWTPayload>(&auth.0.token, jwt_secret.as_bytes(), &Validation::default())
            .ok()
            .map(|data| data.claims.user_id)
    })
}

/// Reads the whole request body into a string
pub fn read_body(body: hyper::Body) -> Box<Future<Item = String, Error = FailureError>> {
    Box::new(
        body.concat2()
            .map_err(|e| FailureError::from(e).context(Error::Internal).into())
            .and_then(|chunk| String::from_utf8(chunk.to_vec()).map_err(|e| FailureError::from(e).context(Error::Parse).into())),
    )
}

/// Reads the request body and deserializes it
pub fn parse_body<T: DeserializeOwned + 'static>(body: hyper::Body) -> Box<Future<Item = T, Error = FailureError>> {
    Box::new(read_body(body).and_then(|body| {
        serde_json::from_str::<T>(&body).map_err(|e| {
            FailureError::from(e)
                .context(format!("Parsing body {} failed", body))
                .context(Error::Parse)
                .into()
        })
    }))
}

/// Serializes the result of a future into the response body
pub fn serialize_future<T, E, F>(f: F) -> ControllerFuture
where
    T: Serialize,
    E: Into<FailureError> + 'static,
    F: IntoFuture<Item = T, Error = E> + 'static,
{
    Box::new(f.into_future().map_err(E::into).and_then(|resp| {
        serde_json::to_string(&resp).map_err(|e| FailureError::from(e).context("Serializing response failed").into())
    }))
}

/// Splits a query string into decoded key/value pairs; keys without values
/// and undecodable values are dropped
pub fn query_params(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some(key), Some(value)) if !key.is_empty() && !value.is_empty() => urlencoding::decode(&value.replace("+", " "))
                    .ok()
                    .map(|value| (key.to_string(), value)),
                _ => None,
            }
        })
        .collect()
}

/// Parses one typed query parameter; a missing key is no constraint, an
/// unparsable value is the caller's error
pub fn parse_value<T: FromStr>(params: &HashMap<String, String>, key: &str) -> Result<Option<T>, FailureError> {
    match params.get(key) {
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| format_err!("Could not parse query parameter {}: {}", key, value).context(Error::Parse).into()),
        None => Ok(None),
    }
}

/// Boolean query flags: only the literal "true" switches a filter on
pub fn parse_flag(params: &HashMap<String, String>, key: &str) -> bool {
    params.get(key).map(|value| value == "true").unwrap_or(false)
}

/// Pagination values that are missing or fail to parse fall back to the
/// defaults, they never reject a request
pub fn parse_pagination(params: &HashMap<String, String>) -> PaginationParams {
    PaginationParams::new(
        params.get("page").and_then(|value| value.parse().ok()),
        params.get("pageSize").and_then(|value| value.parse().ok()),
    )
}

pub fn parse_products_search_terms(params: &HashMap<String, String>) -> Result<ProductsSearchTerms, FailureError> {
    let min_price = parse_value::<f64>(params, "minPrice")?;
    let max_price = parse_value::<f64>(params, "maxPrice")?;
    let price_range = if min_price.is_some() || max_price.is_some() {
        Some(RangeFilter {
            min_value: min_price,
            max_value: max_price,
        })
    } else {
        None
    };

    Ok(ProductsSearchTerms {
        term: params.get("search").cloned(),
        category: params.get("category").cloned(),
        price_range,
        company_id: parse_value(params, "companyId")?,
        verified_only: parse_flag(params, "verifiedOnly"),
        gold_supplier_only: parse_flag(params, "goldSupplierOnly"),
        membership_tier: parse_value(params, "membershipTier")?,
        tags: params.get("tags").map(|tags| tags.split(',').map(|tag| tag.to_string()).collect()),
    })
}

pub fn parse_companies_search_terms(params: &HashMap<String, String>) -> Result<CompaniesSearchTerms, FailureError> {
    Ok(CompaniesSearchTerms {
        term: params.get("search").cloned(),
        category: params.get("category").cloned(),
        city: params.get("city").cloned(),
        province: params.get("province").cloned(),
        verified_only: parse_flag(params, "verifiedOnly"),
        gold_supplier_only: parse_flag(params, "goldSupplierOnly"),
        min_trust_score: parse_value(params, "minTrustScore")?,
    })
}

pub fn parse_rfqs_search_terms(params: &HashMap<String, String>) -> Result<RfqsSearchTerms, FailureError> {
    Ok(RfqsSearchTerms {
        status: parse_value(params, "status")?,
        category_id: parse_value(params, "categoryId")?,
        buyer_id: parse_value(params, "buyerId")?,
        supplier_id: parse_value(params, "supplierId")?,
    })
}

pub fn parse_applications_search_terms(params: &HashMap<String, String>) -> Result<ApplicationsSearchTerms, FailureError> {
    Ok(ApplicationsSearchTerms {
        status: parse_value(params, "status")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_params_decode_values() {
        let params = query_params("search=cotton+shirt&page=2&empty=&category=textiles");
        assert_eq!(params.get("search"), Some(&"cotton shirt".to_string()));
        assert_eq!(params.get("page"), Some(&"2".to_string()));
        assert_eq!(params.get("empty"), None);
        assert_eq!(params.get("category"), Some(&"textiles".to_string()));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let params = query_params("foo=bar&search=x");
        let terms = parse_products_search_terms(&params).unwrap();
        assert_eq!(terms.term, Some("x".to_string()));
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let params = query_params("minPrice=notanumber");
        assert!(parse_products_search_terms(&params).is_err());
    }

    #[test]
    fn price_bounds_are_independent() {
        let params = query_params("maxPrice=12.5");
        let terms = parse_products_search_terms(&params).unwrap();
        let range = terms.price_range.unwrap();
        assert_eq!(range.min_value, None);
        assert_eq!(range.max_value, Some(12.5));
    }

    #[test]
    fn flags_require_the_literal_true() {
        let params = query_params("verifiedOnly=true&goldSupplierOnly=1");
        let terms = parse_products_search_terms(&params).unwrap();
        assert!(terms.verified_only);
        assert!(!terms.gold_supplier_only);
    }

    #[test]
    fn pagination_falls_back_to_defaults() {
        let params = query_params("page=0&pageSize=abc");
        let pagination = parse_pagination(&params);
        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.page_size, 20);
    }

    #[test]
    fn tags_are_comma_separated() {
        let params = query_params("tags=cotton,shirt");
        let terms = parse_products_search_terms(&params).unwrap();
        assert_eq!(terms.tags, Some(vec!["cotton".to_string(), "shirt".to_string()]));
    }
}
