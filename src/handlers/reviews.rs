use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Collection;
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::models::kindergarten::Kindergarten;
use crate::models::review::{CreateReview, Review};
use crate::state::AppState;

pub async fn get_reviews(
    State(state): State<AppState>,
    Path(kindergarten_id): Path<String>,
) -> Result<Json<Vec<Review>>> {
    let kindergarten_id = ObjectId::parse_str(&kindergarten_id)?;

    let collection: Collection<Review> = state.db.collection("reviews");
    let cursor = collection
        .find(doc! { "kindergarten_id": kindergarten_id })
        .await?;
    let mut reviews: Vec<Review> = cursor.try_collect().await?;
    reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(reviews))
}

// Any visitor may leave a review; there is no edit or delete surface.
pub async fn create_review(
    State(state): State<AppState>,
    Path(kindergarten_id): Path<String>,
    Json(payload): Json<CreateReview>,
) -> Result<Json<Review>> {
    payload
        .validate()
        .map_err(|e| AppError::invalid_data(e.to_string()))?;

    let kindergarten_id = ObjectId::parse_str(&kindergarten_id)?;

    // The target must exist
    let kindergartens: Collection<Kindergarten> = state.db.collection("kindergartens");
    kindergartens
        .find_one(doc! { "_id": kindergarten_id })
        .await?
        .ok_or(AppError::DocumentNotFound)?;

    let collection: Collection<Review> = state.db.collection("reviews");

    let review = Review {
        _id: Some(ObjectId::new()),
        kindergarten_id,
        display_name: payload.display_name,
        rating: payload.rating,
        comment: payload.comment.filter(|c| !c.trim().is_empty()),
        created_at: Utc::now(),
    };

    collection.insert_one(&review).await?;
    Ok(Json(review))
}
