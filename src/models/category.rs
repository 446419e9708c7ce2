//! Module containg category model for query, insert, update
use chrono::NaiveDateTime;
use validator::Validate;

use models::validation_rules::*;
use schema::categories;

/// RawCategory is an object stored in PG, used only for Category tree creation
#[derive(Debug, Serialize, Deserialize, Queryable, Clone, Identifiable)]
#[serde(rename_all = "camelCase")]
#[table_name = "categories"]
pub struct RawCategory {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<i32>,
    pub level: i32,
    pub ordering: i32,
    pub product_count: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Payload for creating categories
#[derive(Serialize, Deserialize, Insertable, Clone, Validate, Debug)]
#[serde(rename_all = "camelCase")]
#[table_name = "categories"]
pub struct NewCategory {
    #[validate(length(min = "1", message = "Name must not be empty"))]
    pub name: String,
    #[validate(custom = "validate_slug")]
    pub slug: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<i32>,
    #[validate(range(min = "1", max = "3"))]
    pub level: i32,
    pub ordering: i32,
}

/// Payload for updating categories
#[derive(Serialize, Deserialize, Insertable, AsChangeset, Validate, Debug, Default)]
#[serde(rename_all = "camelCase")]
#[table_name = "categories"]
pub struct UpdateCategory {
    #[validate(length(min = "1", message = "Name must not be empty"))]
    pub name: Option<String>,
    #[validate(custom = "validate_slug")]
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<i32>,
    #[validate(range(min = "1", max = "3"))]
    pub level: Option<i32>,
    pub ordering: Option<i32>,
}

/// Category with its children, the shape all category reads return
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<i32>,
    pub level: i32,
    pub ordering: i32,
    pub product_count: i32,
    pub children: Vec<Category>,
}

impl From<RawCategory> for Category {
    fn from(cat: RawCategory) -> Self {
        Self {
            id: cat.id,
            name: cat.name,
            slug: cat.slug,
            description: cat.description,
            image: cat.image,
            icon: cat.icon,
            parent_id: cat.parent_id,
            level: cat.level,
            ordering: cat.ordering,
            product_count: cat.product_count,
            children: vec![],
        }
    }
}

impl<'a> From<&'a RawCategory> for Category {
    fn from(cat: &'a RawCategory) -> Self {
        cat.clone().into()
    }
}

/// Wire representation of a category embedded into product, company and rfq
/// payloads
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CategorySummary {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

impl From<RawCategory> for CategorySummary {
    fn from(cat: RawCategory) -> Self {
        Self {
            id: cat.id,
            name: cat.name,
            slug: cat.slug,
        }
    }
}
