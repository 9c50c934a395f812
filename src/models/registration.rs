use chrono::{DateTime, Utc};
use mongodb::bson;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Rejected,
}

/// A parent's request to enroll a child at a kindergarten. Once approved or
/// rejected it is immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRequest {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub kindergarten_id: ObjectId,
    pub parent_id: ObjectId,
    pub parent_name: String,
    pub parent_phone: String,
    pub parent_email: String,
    pub child_name: String,
    pub child_age_months: i32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_notes: Option<String>,

    pub status: RegistrationStatus,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRegistrationRequest {
    pub kindergarten_id: String,

    #[validate(length(min = 2, message = "Parent name must be at least 2 characters"))]
    pub parent_name: String,

    #[validate(length(min = 1, message = "Parent phone is required"))]
    pub parent_phone: String,

    #[validate(length(min = 2, message = "Child name must be at least 2 characters"))]
    pub child_name: String,

    #[validate(range(min = 0, max = 72, message = "Child age must be between 0 and 72 months"))]
    pub child_age_months: i32,

    pub medical_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DecideRegistration {
    pub status: RegistrationStatus,
}
