use chrono::{DateTime, Utc};
use mongodb::bson;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kindergarten {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub name: String,
    pub description: String,
    pub neighborhood: String,
    pub monthly_fee: f64,

    // Accepted age range, in months
    pub min_age_months: i32,
    pub max_age_months: i32,

    pub services: Vec<String>, // "bus", "meals", "medical", ...
    pub has_transport: bool,
    pub open_weekends: bool,
    pub capacity: i32,
    pub phone: String,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateKindergarten {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,

    pub description: String,

    #[validate(length(min = 1, message = "Neighborhood is required"))]
    pub neighborhood: String,

    #[validate(range(min = 0.0, message = "Monthly fee cannot be negative"))]
    pub monthly_fee: f64,

    #[validate(range(min = 0, message = "Minimum age cannot be negative"))]
    pub min_age_months: i32,

    pub max_age_months: i32,
    pub services: Vec<String>,
    pub has_transport: bool,
    pub open_weekends: bool,

    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: i32,

    pub phone: String,
}
