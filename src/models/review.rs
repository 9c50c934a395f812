use chrono::{DateTime, Utc};
use mongodb::bson;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A visitor review for one kindergarten. No edit or delete surface exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub kindergarten_id: ObjectId,
    pub display_name: String,
    pub rating: i32, // 1..=5

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReview {
    #[validate(length(min = 1, message = "Display name is required"))]
    pub display_name: String,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,

    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rating: i32) -> CreateReview {
        CreateReview {
            display_name: "Amina".to_string(),
            rating,
            comment: None,
        }
    }

    #[test]
    fn rating_must_stay_between_one_and_five() {
        assert!(review(0).validate().is_err());
        assert!(review(6).validate().is_err());
        assert!(review(1).validate().is_ok());
        assert!(review(5).validate().is_ok());
    }

    #[test]
    fn display_name_is_required() {
        let mut anonymous = review(3);
        anonymous.display_name = String::new();
        assert!(anonymous.validate().is_err());
    }
}
