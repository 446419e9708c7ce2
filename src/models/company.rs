//! Module containg company model for query, insert, update
use chrono::NaiveDateTime;
use serde_json;
use validator::Validate;

use models::validation_rules::*;
use models::{CategorySummary, MembershipTier};
use schema::{companies, company_categories};

/// Payload for querying companies
#[derive(Debug, Serialize, Deserialize, Queryable, Clone, Identifiable)]
#[serde(rename_all = "camelCase")]
#[table_name = "companies"]
pub struct Company {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub email: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub city: String,
    pub province: String,
    pub country: String,
    pub logo: Option<String>,
    pub cover_image: Option<String>,
    pub verified: bool,
    pub gold_supplier: bool,
    pub membership_tier: Option<MembershipTier>,
    pub trust_score: Option<i32>,
    pub product_count: i32,
    pub year_established: Option<i32>,
    pub employee_count: Option<String>,
    pub certifications: Option<serde_json::Value>,
    pub main_products: Option<serde_json::Value>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Payload for creating companies. Verification flags and the denormalized
/// product count start from their db defaults.
#[derive(Serialize, Deserialize, Insertable, Validate, Clone, Debug)]
#[serde(rename_all = "camelCase")]
#[table_name = "companies"]
pub struct NewCompany {
    #[validate(length(min = "1", message = "Name must not be empty"))]
    pub name: String,
    #[validate(length(min = "1", message = "Description must not be empty"))]
    pub description: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,
    pub website: Option<String>,
    pub city: String,
    pub province: String,
    pub country: String,
    pub logo: Option<String>,
    pub cover_image: Option<String>,
    pub year_established: Option<i32>,
    pub employee_count: Option<String>,
    #[validate(custom = "validate_string_list")]
    pub certifications: Option<serde_json::Value>,
    #[validate(custom = "validate_string_list")]
    pub main_products: Option<serde_json::Value>,
}

/// Payload for updating companies
#[derive(Serialize, Deserialize, Insertable, Validate, AsChangeset, Debug, Default)]
#[serde(rename_all = "camelCase")]
#[table_name = "companies"]
pub struct UpdateCompany {
    #[validate(length(min = "1", message = "Name must not be empty"))]
    pub name: Option<String>,
    #[validate(length(min = "1", message = "Description must not be empty"))]
    pub description: Option<String>,
    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,
    pub website: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub logo: Option<String>,
    pub cover_image: Option<String>,
    pub verified: Option<bool>,
    pub gold_supplier: Option<bool>,
    pub membership_tier: Option<MembershipTier>,
    pub trust_score: Option<i32>,
    pub year_established: Option<i32>,
    pub employee_count: Option<String>,
    #[validate(custom = "validate_string_list")]
    pub certifications: Option<serde_json::Value>,
    #[validate(custom = "validate_string_list")]
    pub main_products: Option<serde_json::Value>,
}

/// Wire payload for creating a company together with its category links
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NewCompanyPayload {
    #[serde(flatten)]
    pub company: NewCompany,
    #[serde(default)]
    pub category_ids: Vec<i32>,
}

/// Link between a company and one of its categories
#[derive(Debug, Serialize, Deserialize, Queryable, Clone, Identifiable)]
#[table_name = "company_categories"]
pub struct CompanyCategory {
    pub id: i32,
    pub company_id: i32,
    pub category_id: i32,
}

/// Payload for linking a company to a category
#[derive(Serialize, Deserialize, Insertable, Clone, Debug)]
#[table_name = "company_categories"]
pub struct NewCompanyCategory {
    pub company_id: i32,
    pub category_id: i32,
}

/// Filters accepted by the public companies listing, as parsed at the http
/// boundary. `category` is a slug or an id, resolved by the service.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct CompaniesSearchTerms {
    pub term: Option<String>,
    pub category: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub verified_only: bool,
    pub gold_supplier_only: bool,
    pub min_trust_score: Option<i32>,
}

/// Predicate clauses the companies repo composes with AND
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct CompaniesSearchFilters {
    pub term: Option<String>,
    pub category_ids: Option<Vec<i32>>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub verified_only: bool,
    pub gold_supplier_only: bool,
    pub min_trust_score: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Location {
    pub city: String,
    pub province: String,
    pub country: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Contact {
    pub email: String,
    pub phone: Option<String>,
    pub website: Option<String>,
}

/// Wire representation of a company in listings: the description is cut down
/// to a short preview, linked categories are embedded.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CompanyListItem {
    pub id: i32,
    pub name: String,
    pub short_description: String,
    pub logo: Option<String>,
    pub cover_image: Option<String>,
    pub verified: bool,
    pub gold_supplier: bool,
    pub membership_tier: Option<MembershipTier>,
    pub trust_score: Option<i32>,
    pub location: Location,
    pub contact: Contact,
    pub categories: Vec<CategorySummary>,
    pub product_count: i32,
    pub year_established: Option<i32>,
    pub employee_count: Option<String>,
    pub certifications: Option<serde_json::Value>,
    pub main_products: Option<serde_json::Value>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

const SHORT_DESCRIPTION_LEN: usize = 200;

impl CompanyListItem {
    pub fn new(company: Company, categories: Vec<CategorySummary>) -> Self {
        let short_description = company.description.chars().take(SHORT_DESCRIPTION_LEN).collect();
        Self {
            id: company.id,
            name: company.name,
            short_description,
            logo: company.logo,
            cover_image: company.cover_image,
            verified: company.verified,
            gold_supplier: company.gold_supplier,
            membership_tier: company.membership_tier,
            trust_score: company.trust_score,
            location: Location {
                city: company.city,
                province: company.province,
                country: company.country,
            },
            contact: Contact {
                email: company.email,
                phone: company.phone,
                website: company.website,
            },
            categories,
            product_count: company.product_count,
            year_established: company.year_established,
            employee_count: company.employee_count,
            certifications: company.certifications,
            main_products: company.main_products,
            created_at: company.created_at,
            updated_at: company.updated_at,
        }
    }
}

/// Wire representation of a single company with the full description
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetails {
    pub description: String,
    #[serde(flatten)]
    pub summary: CompanyListItem,
}

impl CompanyDetails {
    pub fn new(company: Company, categories: Vec<CategorySummary>) -> Self {
        let description = company.description.clone();
        Self {
            description,
            summary: CompanyListItem::new(company, categories),
        }
    }
}

/// Wire representation of a company embedded into product payloads
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CompanySummary {
    pub id: i32,
    pub name: String,
    pub logo: Option<String>,
    pub verified: bool,
    pub gold_supplier: bool,
    pub membership_tier: Option<MembershipTier>,
}

impl From<Company> for CompanySummary {
    fn from(company: Company) -> Self {
        Self {
            id: company.id,
            name: company.name,
            logo: company.logo,
            verified: company.verified,
            gold_supplier: company.gold_supplier,
            membership_tier: company.membership_tier,
        }
    }
}
