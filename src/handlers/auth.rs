use axum::{extract::State, response::Json, Extension};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use futures_util::TryStreamExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Collection;
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::models::user::{AuthResponse, Claims, CreateUser, LoginUser, User, UserResponse};
use crate::recovery::RoleContext;
use crate::state::AppState;

const TOKEN_TTL_SECS: i64 = 86400; // 24 hours

fn issue_token(state: &AppState, user_id: &ObjectId, user: &User) -> Result<String> {
    let claims = Claims {
        sub: user_id.to_hex(),
        email: user.email.clone(),
        role: user.role,
        exp: (Utc::now().timestamp() + TOKEN_TTL_SECS) as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config.jwt_secret.as_ref()),
    )?;
    Ok(token)
}

/// One registration handler shared by all three auth surfaces; the mounted
/// role context decides which role the account gets.
pub async fn register(
    State(state): State<AppState>,
    Extension(ctx): Extension<RoleContext>,
    Json(payload): Json<CreateUser>,
) -> Result<Json<AuthResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::invalid_data(e.to_string()))?;

    let collection: Collection<User> = state.db.collection("users");

    // One account per email and role surface
    let filter = doc! { "email": &payload.email, "role": ctx.role.as_str() };
    if collection.find_one(filter).await?.is_some() {
        return Err(AppError::DuplicateAccount);
    }

    let password_hash = hash(&payload.password, DEFAULT_COST)?;

    let user_id = ObjectId::new();
    let user = User {
        _id: Some(user_id),
        email: payload.email.clone(),
        full_name: payload.full_name.clone(),
        phone: payload.phone.clone(),
        password_hash,
        role: ctx.role,
        selected_language: None,
        kindergarten_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        reset_otp: None,
    };

    collection.insert_one(&user).await?;
    tracing::info!("New {} account registered: {}", ctx.role.as_str(), payload.email);

    let token = issue_token(&state, &user_id, &user)?;

    Ok(Json(AuthResponse {
        user: UserResponse::from_user(&user, user_id),
        token,
        redirect_to: ctx.dashboard_path.to_string(),
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Extension(ctx): Extension<RoleContext>,
    Json(payload): Json<LoginUser>,
) -> Result<Json<AuthResponse>> {
    let collection: Collection<User> = state.db.collection("users");

    let filter = doc! { "email": &payload.email, "role": ctx.role.as_str() };
    let user = collection.find_one(filter).await?.ok_or(AppError::AuthError)?;

    let valid = verify(&payload.password, &user.password_hash)?;
    if !valid {
        return Err(AppError::AuthError);
    }

    let user_id = user._id.ok_or(AppError::DocumentNotFound)?;
    let token = issue_token(&state, &user_id, &user)?;

    Ok(Json(AuthResponse {
        user: UserResponse::from_user(&user, user_id),
        token,
        redirect_to: ctx.dashboard_path.to_string(),
    }))
}

// Admin view over all accounts
pub async fn get_all_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>> {
    let collection: Collection<User> = state.db.collection("users");

    let cursor = collection.find(doc! {}).await?;
    let users: Vec<User> = cursor.try_collect().await?;

    let responses: Vec<UserResponse> = users
        .into_iter()
        .filter_map(|user| user._id.map(|id| UserResponse::from_user(&user, id)))
        .collect();

    Ok(Json(responses))
}
