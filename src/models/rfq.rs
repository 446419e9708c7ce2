//! Module containg rfq (request for quotation) and rfq response models
use chrono::NaiveDateTime;
use serde_json;
use validator::Validate;

use models::validation_rules::*;
use models::{CategorySummary, RfqResponseStatus, RfqStatus, User, UserSummary};
use schema::{rfq_responses, rfqs};

/// Payload for querying rfqs
#[derive(Debug, Serialize, Deserialize, Queryable, Clone, Identifiable)]
#[serde(rename_all = "camelCase")]
#[table_name = "rfqs"]
pub struct Rfq {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub buyer_id: i32,
    pub category_id: i32,
    pub quantity_min: Option<i32>,
    pub quantity_max: Option<i32>,
    pub quantity_unit: Option<String>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    pub budget_currency: Option<String>,
    pub specifications: Option<serde_json::Value>,
    pub status: RfqStatus,
    pub deadline: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Requested quantity range of an rfq
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Quantity {
    pub min: Option<i32>,
    pub max: Option<i32>,
    pub unit: Option<String>,
}

/// Budget range of an rfq
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Budget {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub currency: Option<String>,
}

/// Payload for creating rfqs. The buyer is not part of the wire payload - it
/// is taken from the authenticated user.
#[derive(Serialize, Deserialize, Validate, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NewRfq {
    #[validate(length(min = "1", message = "Title must not be empty"))]
    pub title: String,
    #[validate(length(min = "1", message = "Description must not be empty"))]
    pub description: String,
    pub category_id: i32,
    pub quantity: Option<Quantity>,
    pub budget: Option<Budget>,
    pub specifications: Option<serde_json::Value>,
    pub deadline: Option<NaiveDateTime>,
}

impl NewRfq {
    pub fn into_insert(self, buyer_id: i32) -> InsertRfq {
        let quantity = self.quantity.unwrap_or_default();
        let budget = self.budget.unwrap_or_default();
        InsertRfq {
            title: self.title,
            description: self.description,
            buyer_id,
            category_id: self.category_id,
            quantity_min: quantity.min,
            quantity_max: quantity.max,
            quantity_unit: quantity.unit,
            budget_min: budget.min,
            budget_max: budget.max,
            budget_currency: budget.currency,
            specifications: self.specifications,
            status: RfqStatus::Open,
            deadline: self.deadline,
        }
    }
}

/// Row payload the repo inserts after the service has resolved the buyer
#[derive(Serialize, Deserialize, Insertable, Clone, Debug)]
#[table_name = "rfqs"]
pub struct InsertRfq {
    pub title: String,
    pub description: String,
    pub buyer_id: i32,
    pub category_id: i32,
    pub quantity_min: Option<i32>,
    pub quantity_max: Option<i32>,
    pub quantity_unit: Option<String>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    pub budget_currency: Option<String>,
    pub specifications: Option<serde_json::Value>,
    pub status: RfqStatus,
    pub deadline: Option<NaiveDateTime>,
}

/// Payload for updating rfqs
#[derive(Serialize, Deserialize, Insertable, Validate, AsChangeset, Debug, Default)]
#[serde(rename_all = "camelCase")]
#[table_name = "rfqs"]
pub struct UpdateRfq {
    #[validate(length(min = "1", message = "Title must not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = "1", message = "Description must not be empty"))]
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub quantity_min: Option<i32>,
    pub quantity_max: Option<i32>,
    pub quantity_unit: Option<String>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    pub budget_currency: Option<String>,
    pub specifications: Option<serde_json::Value>,
    pub status: Option<RfqStatus>,
    pub deadline: Option<NaiveDateTime>,
}

/// Payload for querying rfq responses
#[derive(Debug, Serialize, Deserialize, Queryable, Clone, Identifiable)]
#[serde(rename_all = "camelCase")]
#[table_name = "rfq_responses"]
pub struct RfqResponse {
    pub id: i32,
    pub rfq_id: i32,
    pub supplier_id: i32,
    pub supplier_company: Option<String>,
    pub price_amount: f64,
    pub price_currency: String,
    pub message: Option<String>,
    pub status: RfqResponseStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Payload for creating rfq responses. The supplier is taken from the
/// authenticated user, the rfq from the route.
#[derive(Serialize, Deserialize, Validate, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NewRfqResponse {
    pub supplier_company: Option<String>,
    #[validate(custom = "validate_non_negative")]
    pub price_amount: f64,
    #[validate(length(min = "1", message = "Currency must not be empty"))]
    pub price_currency: String,
    pub message: Option<String>,
}

impl NewRfqResponse {
    pub fn into_insert(self, rfq_id: i32, supplier_id: i32, supplier_company: Option<String>) -> InsertRfqResponse {
        InsertRfqResponse {
            rfq_id,
            supplier_id,
            supplier_company: self.supplier_company.or(supplier_company),
            price_amount: self.price_amount,
            price_currency: self.price_currency,
            message: self.message,
            status: RfqResponseStatus::Pending,
        }
    }
}

/// Row payload the repo inserts for a new rfq response
#[derive(Serialize, Deserialize, Insertable, Clone, Debug)]
#[table_name = "rfq_responses"]
pub struct InsertRfqResponse {
    pub rfq_id: i32,
    pub supplier_id: i32,
    pub supplier_company: Option<String>,
    pub price_amount: f64,
    pub price_currency: String,
    pub message: Option<String>,
    pub status: RfqResponseStatus,
}

/// Payload for accepting or rejecting an rfq response
#[derive(Serialize, Deserialize, Insertable, AsChangeset, Clone, Copy, Debug)]
#[table_name = "rfq_responses"]
pub struct UpdateRfqResponse {
    pub status: RfqResponseStatus,
}

/// Filters accepted by the rfq listing. When a supplier browses without an
/// explicit status the listing narrows to open rfqs.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct RfqsSearchTerms {
    pub status: Option<RfqStatus>,
    pub category_id: Option<i32>,
    pub buyer_id: Option<i32>,
    pub supplier_id: Option<i32>,
}

/// Predicate clauses the rfqs repo composes with AND
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct RfqsSearchFilters {
    pub status: Option<RfqStatus>,
    pub category_id: Option<i32>,
    pub buyer_id: Option<i32>,
}

/// Wire representation of the buyer embedded into rfq payloads
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RfqBuyer {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
}

impl RfqBuyer {
    pub fn new(user: User, company: Option<String>) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            company,
        }
    }
}

/// Wire representation of an rfq response with its supplier attached
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RfqResponseListItem {
    pub id: i32,
    pub rfq_id: i32,
    pub supplier: UserSummary,
    pub supplier_company: Option<String>,
    pub price_amount: f64,
    pub price_currency: String,
    pub message: Option<String>,
    pub status: RfqResponseStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl RfqResponseListItem {
    pub fn new(response: RfqResponse, supplier: UserSummary) -> Self {
        Self {
            id: response.id,
            rfq_id: response.rfq_id,
            supplier,
            supplier_company: response.supplier_company,
            price_amount: response.price_amount,
            price_currency: response.price_currency,
            message: response.message,
            status: response.status,
            created_at: response.created_at,
            updated_at: response.updated_at,
        }
    }
}

/// Wire representation of an rfq with category, buyer and responses embedded
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RfqListItem {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub category: CategorySummary,
    pub buyer: RfqBuyer,
    pub quantity: Option<Quantity>,
    pub budget: Option<Budget>,
    pub specifications: Option<serde_json::Value>,
    pub status: RfqStatus,
    pub deadline: Option<NaiveDateTime>,
    pub responses: Vec<RfqResponseListItem>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl RfqListItem {
    pub fn new(rfq: Rfq, category: CategorySummary, buyer: RfqBuyer, responses: Vec<RfqResponseListItem>) -> Self {
        let quantity = match (rfq.quantity_min, rfq.quantity_max, rfq.quantity_unit.clone()) {
            (None, None, None) => None,
            (min, max, unit) => Some(Quantity { min, max, unit }),
        };
        let budget = match (rfq.budget_min, rfq.budget_max) {
            (None, None) => None,
            (min, max) => Some(Budget {
                min,
                max,
                currency: rfq.budget_currency.clone(),
            }),
        };
        Self {
            id: rfq.id,
            title: rfq.title,
            description: rfq.description,
            category,
            buyer,
            quantity,
            budget,
            specifications: rfq.specifications,
            status: rfq.status,
            deadline: rfq.deadline,
            responses,
            created_at: rfq.created_at,
            updated_at: rfq.updated_at,
        }
    }
}
