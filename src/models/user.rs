use chrono::{DateTime, Utc};
use mongodb::bson;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::language::Language;
use crate::models::otp::RecoverySession;

/// Role claim carried by every authenticated session. Each role has its own
/// login surface and dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Parent,
    Owner,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Parent => "parent",
            Role::Owner => "owner",
            Role::Admin => "admin",
        }
    }

    pub fn login_path(&self) -> &'static str {
        match self {
            Role::Parent => "/auth",
            Role::Owner => "/owner-auth",
            Role::Admin => "/admin-auth",
        }
    }

    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::Parent => "/dashboard",
            Role::Owner => "/owner-dashboard",
            Role::Admin => "/admin-dashboard",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub password_hash: String,
    pub role: Role,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_language: Option<Language>,

    // Owners are linked to the kindergarten they manage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kindergarten_id: Option<ObjectId>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_otp: Option<RecoverySession>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,

    #[validate(length(min = 2, message = "Full name must be at least 2 characters"))]
    pub full_name: String,

    pub phone: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginUser {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub role: Role,
    pub selected_language: Language,
}

impl UserResponse {
    pub fn from_user(user: &User, id: ObjectId) -> Self {
        UserResponse {
            id: id.to_hex(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            phone: user.phone.clone(),
            role: user.role,
            selected_language: user.selected_language.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
    pub redirect_to: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub exp: usize,
}
