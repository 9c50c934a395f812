use chrono::{DateTime, Utc};
use mongodb::bson;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderCategory {
    Pediatrician,
    SpeechTherapist,
    ClothingStore,
}

impl ProviderCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderCategory::Pediatrician => "pediatrician",
            ProviderCategory::SpeechTherapist => "speech_therapist",
            ProviderCategory::ClothingStore => "clothing_store",
        }
    }
}

/// A non-kindergarten directory entry: pediatrician, speech therapist or
/// children's clothing store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub name: String,
    pub category: ProviderCategory,
    pub city: String,
    pub address: String,
    pub phone: String,
    pub description: String,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProvider {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,

    pub category: ProviderCategory,

    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,

    pub address: String,
    pub phone: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ProviderQuery {
    pub category: Option<ProviderCategory>,
    pub city: Option<String>,
}
