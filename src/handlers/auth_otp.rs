use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    response::Json,
    Extension,
};
use bcrypt::{hash, DEFAULT_COST};
use chrono::Utc;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Collection;

use crate::dtos::auth_dtos::{
    ForgotPasswordRequest, ForgotPasswordResponse, RecoveryLinkQuery, RecoveryLinkResponse,
    ResendCodeRequest, ResendCodeResponse, ResetPasswordRequest, ResetPasswordResponse,
    VerifyCodeRequest, VerifyCodeResponse,
};
use crate::errors::{AppError, Result};
use crate::models::otp::RecoverySession;
use crate::models::user::User;
use crate::recovery::{RecoveryBackend, RecoveryFlow, ResetIssued, RoleContext};
use crate::services::otp_service::{OTPService, PURPOSE_PASSWORD_RESET, PURPOSE_RECOVERY_LINK};
use crate::state::AppState;

/// Recovery backend over the users collection, the OTP service and the email
/// service. One instance per request, scoped to the mounted role surface.
struct DbRecoveryBackend<'a> {
    state: &'a AppState,
    ctx: &'a RoleContext,
}

impl DbRecoveryBackend<'_> {
    async fn find_user(&self, email: &str) -> Result<(ObjectId, User)> {
        let users: Collection<User> = self.state.db.collection("users");
        let user = users
            .find_one(doc! { "email": email, "role": self.ctx.role.as_str() })
            .await?
            .ok_or(AppError::DocumentNotFound)?;
        let user_id = user._id.ok_or(AppError::DocumentNotFound)?;
        Ok((user_id, user))
    }

    fn recovery_link(&self, link_token: &str) -> String {
        format!(
            "{}{}?recovery=true&token={}",
            self.state.config.public_url, self.ctx.redirect_base, link_token
        )
    }

    async fn dispatch_code(&self, email: &str, user_id: &ObjectId, code: &str) {
        let link = match self
            .state
            .otp_service
            .generate_token(&user_id.to_hex(), PURPOSE_RECOVERY_LINK)
        {
            Ok(token) => self.recovery_link(&token),
            Err(e) => {
                tracing::error!("Failed to build recovery link: {}", e);
                String::new()
            }
        };

        // Delivery failure is logged, not fatal: the user can hit resend.
        if let Err(e) = self
            .state
            .email_service
            .send_recovery_code(email, code, &link)
            .await
        {
            tracing::error!("Failed to send recovery email: {}", e);
        }
    }
}

#[async_trait]
impl RecoveryBackend for DbRecoveryBackend<'_> {
    async fn request_reset(&self, email: &str, _redirect_target: &str) -> Result<ResetIssued> {
        let (user_id, _user) = self.find_user(email).await?;

        let code = OTPService::generate_otp();
        let reset_token = self
            .state
            .otp_service
            .generate_token(&user_id.to_hex(), PURPOSE_PASSWORD_RESET)?;

        self.state
            .otp_service
            .begin_session(&user_id, &code, &reset_token)
            .await?;
        self.dispatch_code(email, &user_id, &code).await;

        Ok(ResetIssued {
            user_id: user_id.to_hex(),
            reset_token,
        })
    }

    async fn resend_code(&self, email: &str) -> Result<()> {
        let (user_id, user) = self.find_user(email).await?;
        if user.reset_otp.is_none() {
            return Err(AppError::invalid_data("No recovery in progress"));
        }

        let code = OTPService::generate_otp();
        self.state.otp_service.refresh_code(&user_id, &code).await?;
        self.dispatch_code(email, &user_id, &code).await;
        Ok(())
    }

    async fn verify_code(&self, email: &str, code: &str) -> Result<()> {
        let (user_id, _user) = self.find_user(email).await?;
        if self.state.otp_service.verify_user_otp(&user_id, code).await? {
            Ok(())
        } else {
            Err(AppError::InvalidCode)
        }
    }

    async fn update_password(&self, email: &str, new_password: &str) -> Result<()> {
        let (user_id, _user) = self.find_user(email).await?;
        let password_hash = hash(new_password, DEFAULT_COST)?;
        self.state
            .otp_service
            .complete(&user_id, &password_hash)
            .await
    }
}

async fn load_session(
    state: &AppState,
    ctx: &RoleContext,
    email: &str,
) -> Result<(ObjectId, RecoverySession)> {
    let users: Collection<User> = state.db.collection("users");
    let user = users
        .find_one(doc! { "email": email, "role": ctx.role.as_str() })
        .await?
        .ok_or(AppError::DocumentNotFound)?;
    let user_id = user._id.ok_or(AppError::DocumentNotFound)?;
    let session = user
        .reset_otp
        .ok_or_else(|| AppError::invalid_data("No recovery in progress"))?;
    Ok((user_id, session))
}

// 1. Forgot password - request a code
pub async fn forgot_password(
    State(state): State<AppState>,
    Extension(ctx): Extension<RoleContext>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<ForgotPasswordResponse>> {
    let backend = DbRecoveryBackend { state: &state, ctx: &ctx };
    let mut flow = RecoveryFlow::open(ctx.clone());

    let issued = flow.submit_email(&backend, &req.email).await?;

    Ok(Json(ForgotPasswordResponse {
        success: true,
        message: "A 6-digit code has been sent to your email".to_string(),
        user_id: Some(issued.user_id),
        reset_token: Some(issued.reset_token),
        resend_cooldown_seconds: flow.cooldown(),
    }))
}

// 2. Resend the code, subject to the 60-second cooldown
pub async fn resend_code(
    State(state): State<AppState>,
    Extension(ctx): Extension<RoleContext>,
    Json(req): Json<ResendCodeRequest>,
) -> Result<Json<ResendCodeResponse>> {
    let (_user_id, session) = load_session(&state, &ctx, &req.email).await?;
    let remaining = session.resend_cooldown_remaining(Utc::now());

    let backend = DbRecoveryBackend { state: &state, ctx: &ctx };
    let mut flow = RecoveryFlow::resume(ctx.clone(), session.stage, &req.email, remaining);

    let sent = flow.resend(&backend).await?;
    if !sent {
        return Err(AppError::RateLimitExceeded);
    }

    Ok(Json(ResendCodeResponse {
        success: true,
        message: "A new code has been sent".to_string(),
        resend_cooldown_seconds: flow.cooldown(),
    }))
}

// 3. Verify the code
pub async fn verify_code(
    State(state): State<AppState>,
    Extension(ctx): Extension<RoleContext>,
    Json(req): Json<VerifyCodeRequest>,
) -> Result<Json<VerifyCodeResponse>> {
    let (_user_id, session) = load_session(&state, &ctx, &req.email).await?;

    let backend = DbRecoveryBackend { state: &state, ctx: &ctx };
    let mut flow = RecoveryFlow::resume(ctx.clone(), session.stage, &req.email, 0);

    flow.submit_code(&backend, &req.code).await?;

    Ok(Json(VerifyCodeResponse {
        success: true,
        message: "Code verified successfully".to_string(),
    }))
}

// 4. Set the new password and close the flow
pub async fn reset_password(
    State(state): State<AppState>,
    Extension(ctx): Extension<RoleContext>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<ResetPasswordResponse>> {
    let token_user = state
        .otp_service
        .verify_token(&req.reset_token, PURPOSE_PASSWORD_RESET)?;

    let (user_id, session) = load_session(&state, &ctx, &req.email).await?;
    if token_user != user_id.to_hex() {
        return Err(AppError::AuthError);
    }

    let backend = DbRecoveryBackend { state: &state, ctx: &ctx };
    let mut flow = RecoveryFlow::resume(ctx.clone(), session.stage, &req.email, 0);

    flow.submit_password(&backend, &req.new_password, &req.confirm_password)
        .await?;

    tracing::info!("Password reset completed for a {} account", ctx.role.as_str());

    Ok(Json(ResetPasswordResponse {
        success: true,
        message: "Password reset successful".to_string(),
        redirect: ctx.login_path.to_string(),
    }))
}

// 5. Direct entry from an emailed recovery link: skips code entry because the
// signed link already proves control of the mailbox.
pub async fn open_recovery_link(
    State(state): State<AppState>,
    Extension(ctx): Extension<RoleContext>,
    Query(query): Query<RecoveryLinkQuery>,
) -> Result<Json<RecoveryLinkResponse>> {
    let user_id_hex = state
        .otp_service
        .verify_token(&query.token, PURPOSE_RECOVERY_LINK)?;
    let user_id = ObjectId::parse_str(&user_id_hex)?;

    let users: Collection<User> = state.db.collection("users");
    let user = users
        .find_one(doc! { "_id": user_id, "role": ctx.role.as_str() })
        .await?
        .ok_or(AppError::DocumentNotFound)?;

    state.otp_service.open_from_link(&user_id).await?;
    let flow = RecoveryFlow::from_recovery_link(ctx.clone(), &user.email);

    Ok(Json(RecoveryLinkResponse {
        success: true,
        stage: flow.stage(),
        email: user.email,
    }))
}
