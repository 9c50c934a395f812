use chrono::{DateTime, Utc};
use mongodb::bson;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Child {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub kindergarten_id: ObjectId,
    pub name: String,
    pub age_months: i32,
    pub parent_name: String,
    pub parent_phone: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub allergies: Option<String>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateChild {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,

    #[validate(range(min = 0, max = 72, message = "Age must be between 0 and 72 months"))]
    pub age_months: i32,

    pub parent_name: String,
    pub parent_phone: String,
    pub allergies: Option<String>,
}
