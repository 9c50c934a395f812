use axum::{extract::State, response::Json, Extension};
use chrono::Utc;
use mongodb::bson::{doc, oid::ObjectId, to_bson, DateTime};
use mongodb::Collection;
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, Result};
use crate::models::language::{Direction, Language};
use crate::models::user::{Claims, User, UserResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetLanguageRequest {
    pub language: Language,
}

#[derive(Debug, Serialize)]
pub struct LanguageResponse {
    pub language: Language,
    pub direction: Direction,
}

async fn load_user(state: &AppState, claims: &Claims) -> Result<(ObjectId, User)> {
    let user_id = ObjectId::parse_str(&claims.sub)?;
    let users: Collection<User> = state.db.collection("users");
    let user = users
        .find_one(doc! { "_id": user_id })
        .await?
        .ok_or(AppError::AuthError)?;
    Ok((user_id, user))
}

pub async fn get_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserResponse>> {
    let (user_id, user) = load_user(&state, &claims).await?;
    Ok(Json(UserResponse::from_user(&user, user_id)))
}

// The stored language drives layout direction on the clients: Arabic is RTL.
pub async fn get_language(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<LanguageResponse>> {
    let (_, user) = load_user(&state, &claims).await?;
    let language = user.selected_language.unwrap_or_default();

    Ok(Json(LanguageResponse {
        language,
        direction: language.direction(),
    }))
}

pub async fn set_language(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SetLanguageRequest>,
) -> Result<Json<LanguageResponse>> {
    let (user_id, _) = load_user(&state, &claims).await?;

    let users: Collection<User> = state.db.collection("users");
    let now = Utc::now();
    users
        .update_one(
            doc! { "_id": user_id },
            doc! { "$set": {
                "selected_language": to_bson(&payload.language)
                    .map_err(|e| AppError::service(format!("BSON conversion failed: {}", e)))?,
                "updated_at": DateTime::from_millis(now.timestamp_millis()),
            }},
        )
        .await?;

    Ok(Json(LanguageResponse {
        language: payload.language,
        direction: payload.language.direction(),
    }))
}
