use chrono::{DateTime, Utc};
use mongodb::bson;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub kindergarten_id: ObjectId,
    pub child_id: ObjectId,
    pub amount: f64,
    pub month: String, // YYYY-MM
    pub method: String, // "cash", "transfer", ...

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePayment {
    pub child_id: String,

    #[validate(range(min = 0.0, message = "Amount cannot be negative"))]
    pub amount: f64,

    #[validate(length(min = 7, max = 7, message = "Month must be formatted YYYY-MM"))]
    pub month: String,

    pub method: String,
}
