use serde::{Deserialize, Serialize};

// Recovery-flow request DTOs. Field validation is done by the recovery flow
// itself so malformed input short-circuits before any backend work.

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResendCodeRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub reset_token: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct RecoveryLinkQuery {
    pub token: String,
}

// Response DTOs

#[derive(Debug, Serialize)]
pub struct ForgotPasswordResponse {
    pub success: bool,
    pub message: String,
    pub user_id: Option<String>,
    pub reset_token: Option<String>,
    pub resend_cooldown_seconds: u32,
}

#[derive(Debug, Serialize)]
pub struct ResendCodeResponse {
    pub success: bool,
    pub message: String,
    pub resend_cooldown_seconds: u32,
}

#[derive(Debug, Serialize)]
pub struct VerifyCodeResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ResetPasswordResponse {
    pub success: bool,
    pub message: String,
    pub redirect: String,
}

#[derive(Debug, Serialize)]
pub struct RecoveryLinkResponse {
    pub success: bool,
    pub stage: crate::recovery::Stage,
    pub email: String,
}
