//! Module containg product model for query, insert, update
use chrono::NaiveDateTime;
use serde_json;
use validator::Validate;

use models::validation_rules::*;
use models::{CategorySummary, CompanySummary, MembershipTier, ProductStatus};
use schema::products;

/// Price of a product as it travels over the wire
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub amount: f64,
    pub currency: String,
    pub min_order_quantity: Option<i32>,
}

/// Payload for querying products
#[derive(Debug, Serialize, Deserialize, Queryable, Clone, Identifiable)]
#[serde(rename_all = "camelCase")]
#[table_name = "products"]
pub struct Product {
    pub id: i32,
    pub company_id: i32,
    pub category_id: i32,
    pub name: String,
    pub description: String,
    pub short_description: Option<String>,
    pub price_amount: f64,
    pub price_currency: String,
    pub min_order_quantity: Option<i32>,
    pub images: Option<serde_json::Value>,
    pub specifications: Option<serde_json::Value>,
    pub tags: Option<serde_json::Value>,
    pub status: ProductStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Product {
    pub fn price(&self) -> Price {
        Price {
            amount: self.price_amount,
            currency: self.price_currency.clone(),
            min_order_quantity: self.min_order_quantity,
        }
    }

    /// Tags as a plain string list; malformed or absent json yields an empty
    /// list
    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .clone()
            .and_then(|tags| serde_json::from_value::<Vec<String>>(tags).ok())
            .unwrap_or_default()
    }
}

/// Payload for creating products. The owning company is not part of the wire
/// payload - it is taken from the authenticated user.
#[derive(Serialize, Deserialize, Validate, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[validate(length(min = "1", message = "Name must not be empty"))]
    pub name: String,
    #[validate(length(min = "1", message = "Description must not be empty"))]
    pub description: String,
    pub short_description: Option<String>,
    pub category_id: i32,
    #[validate(custom = "validate_price")]
    pub price: Price,
    #[validate(custom = "validate_string_list")]
    pub images: Option<serde_json::Value>,
    pub specifications: Option<serde_json::Value>,
    #[validate(custom = "validate_string_list")]
    pub tags: Option<serde_json::Value>,
    pub status: Option<ProductStatus>,
}

impl NewProduct {
    pub fn into_insert(self, company_id: i32) -> InsertProduct {
        InsertProduct {
            company_id,
            category_id: self.category_id,
            name: self.name,
            description: self.description,
            short_description: self.short_description,
            price_amount: self.price.amount,
            price_currency: self.price.currency,
            min_order_quantity: self.price.min_order_quantity,
            images: self.images,
            specifications: self.specifications,
            tags: self.tags,
            status: self.status.unwrap_or(ProductStatus::Active),
        }
    }
}

/// Row payload the repo inserts after the service has resolved the owner
#[derive(Serialize, Deserialize, Insertable, Clone, Debug)]
#[table_name = "products"]
pub struct InsertProduct {
    pub company_id: i32,
    pub category_id: i32,
    pub name: String,
    pub description: String,
    pub short_description: Option<String>,
    pub price_amount: f64,
    pub price_currency: String,
    pub min_order_quantity: Option<i32>,
    pub images: Option<serde_json::Value>,
    pub specifications: Option<serde_json::Value>,
    pub tags: Option<serde_json::Value>,
    pub status: ProductStatus,
}

/// Payload for updating products
#[derive(Serialize, Deserialize, Insertable, Validate, AsChangeset, Debug, Default)]
#[serde(rename_all = "camelCase")]
#[table_name = "products"]
pub struct UpdateProduct {
    #[validate(length(min = "1", message = "Name must not be empty"))]
    pub name: Option<String>,
    #[validate(length(min = "1", message = "Description must not be empty"))]
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub category_id: Option<i32>,
    #[validate(custom = "validate_non_negative")]
    pub price_amount: Option<f64>,
    pub price_currency: Option<String>,
    pub min_order_quantity: Option<i32>,
    #[validate(custom = "validate_string_list")]
    pub images: Option<serde_json::Value>,
    pub specifications: Option<serde_json::Value>,
    #[validate(custom = "validate_string_list")]
    pub tags: Option<serde_json::Value>,
    pub status: Option<ProductStatus>,
}

/// Inclusive range over a numeric field; either bound may be open
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default)]
pub struct RangeFilter {
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

/// Filters accepted by the public products listing, as parsed at the http
/// boundary. `category` is a slug or an id, resolved by the service; `tags`
/// are matched in memory against the fetched page, not pushed into the store
/// predicate.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ProductsSearchTerms {
    pub term: Option<String>,
    pub category: Option<String>,
    pub price_range: Option<RangeFilter>,
    pub company_id: Option<i32>,
    pub verified_only: bool,
    pub gold_supplier_only: bool,
    pub membership_tier: Option<MembershipTier>,
    pub tags: Option<Vec<String>>,
}

/// Predicate clauses the products repo composes with AND on top of the fixed
/// `status = active` baseline
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ProductsSearchFilters {
    pub term: Option<String>,
    pub category_ids: Option<Vec<i32>>,
    pub price_range: Option<RangeFilter>,
    pub company_id: Option<i32>,
    pub verified_only: bool,
    pub gold_supplier_only: bool,
    pub membership_tier: Option<MembershipTier>,
}

/// Wire representation of a product in listings: the long description is
/// replaced with the short one, relations are embedded.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProductListItem {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub images: Option<serde_json::Value>,
    pub category: CategorySummary,
    pub company: CompanySummary,
    pub tags: Option<serde_json::Value>,
    pub status: ProductStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl ProductListItem {
    pub fn new(product: Product, category: CategorySummary, company: CompanySummary) -> Self {
        let price = product.price();
        Self {
            id: product.id,
            name: product.name,
            description: product.short_description,
            price,
            images: product.images,
            category,
            company,
            tags: product.tags,
            status: product.status,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// Wire representation of a single product with the full description
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetails {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub short_description: Option<String>,
    pub price: Price,
    pub images: Option<serde_json::Value>,
    pub category: CategorySummary,
    pub company: CompanySummary,
    pub specifications: Option<serde_json::Value>,
    pub tags: Option<serde_json::Value>,
    pub status: ProductStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl ProductDetails {
    pub fn new(product: Product, category: CategorySummary, company: CompanySummary) -> Self {
        let price = product.price();
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            short_description: product.short_description,
            price,
            images: product.images,
            category,
            company,
            specifications: product.specifications,
            tags: product.tags,
            status: product.status,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn product_with_tags(tags: Option<serde_json::Value>) -> Product {
        let timestamp = NaiveDate::from_ymd(2024, 1, 1).and_hms(0, 0, 0);
        Product {
            id: 1,
            company_id: 1,
            category_id: 1,
            name: "Cotton shirt".to_string(),
            description: "Plain cotton shirt".to_string(),
            short_description: None,
            price_amount: 4.5,
            price_currency: "USD".to_string(),
            min_order_quantity: Some(100),
            images: None,
            specifications: None,
            tags,
            status: ProductStatus::Active,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    #[test]
    fn tag_list_parses_json_list() {
        let product = product_with_tags(Some(json!(["cotton", "shirt"])));
        assert_eq!(product.tag_list(), vec!["cotton".to_string(), "shirt".to_string()]);
    }

    #[test]
    fn tag_list_is_empty_for_missing_or_malformed_tags() {
        assert!(product_with_tags(None).tag_list().is_empty());
        assert!(product_with_tags(Some(json!({"not": "a list"}))).tag_list().is_empty());
    }
}
