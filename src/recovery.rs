//! Credential-recovery flow shared by the three role surfaces.
//!
//! One parameterized flow (parent, kindergarten owner, admin) instead of
//! three copies: `Input -> AwaitingCode -> SettingNewPassword -> Closed`.
//! All local validation happens here, before any backend call is made, and
//! a failed backend call never advances the stage.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, Result};
use crate::models::user::Role;

pub const RESEND_COOLDOWN_SECS: u32 = 60;
pub const CODE_LENGTH: usize = 6;
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const CODE_TTL_MINUTES: i64 = 5;
pub const MAX_CODE_ATTEMPTS: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Input,
    AwaitingCode,
    SettingNewPassword,
    Closed,
}

/// Everything that differs between the three role surfaces.
#[derive(Debug, Clone)]
pub struct RoleContext {
    pub role: Role,
    pub login_path: &'static str,
    pub dashboard_path: &'static str,
    pub redirect_base: &'static str,
}

impl RoleContext {
    pub fn for_role(role: Role) -> Self {
        RoleContext {
            role,
            login_path: role.login_path(),
            dashboard_path: role.dashboard_path(),
            redirect_base: role.login_path(),
        }
    }

    pub fn parent() -> Self {
        Self::for_role(Role::Parent)
    }

    pub fn owner() -> Self {
        Self::for_role(Role::Owner)
    }

    pub fn admin() -> Self {
        Self::for_role(Role::Admin)
    }
}

/// Issued when a reset request is accepted: the token must accompany the
/// final password update.
#[derive(Debug)]
pub struct ResetIssued {
    pub user_id: String,
    pub reset_token: String,
}

#[async_trait]
pub trait RecoveryBackend: Send + Sync {
    async fn request_reset(&self, email: &str, redirect_target: &str) -> Result<ResetIssued>;
    async fn resend_code(&self, email: &str) -> Result<()>;
    async fn verify_code(&self, email: &str, code: &str) -> Result<()>;
    async fn update_password(&self, email: &str, new_password: &str) -> Result<()>;
}

pub struct RecoveryFlow {
    ctx: RoleContext,
    stage: Stage,
    email: Option<String>,
    cooldown: u32,
}

impl RecoveryFlow {
    pub fn open(ctx: RoleContext) -> Self {
        RecoveryFlow {
            ctx,
            stage: Stage::Input,
            email: None,
            cooldown: 0,
        }
    }

    /// Rebuild a flow from persisted state, e.g. between stateless requests.
    pub fn resume(ctx: RoleContext, stage: Stage, email: &str, cooldown: u32) -> Self {
        RecoveryFlow {
            ctx,
            stage,
            email: Some(email.to_string()),
            cooldown,
        }
    }

    /// Direct entry via a backend-issued recovery link. The link was already
    /// verified out-of-band, so code entry is skipped.
    pub fn from_recovery_link(ctx: RoleContext, email: &str) -> Self {
        RecoveryFlow {
            ctx,
            stage: Stage::SettingNewPassword,
            email: Some(email.to_string()),
            cooldown: 0,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    /// One-second countdown tick for resend eligibility.
    pub fn tick(&mut self) {
        self.cooldown = self.cooldown.saturating_sub(1);
    }

    pub async fn submit_email<B: RecoveryBackend>(
        &mut self,
        backend: &B,
        email: &str,
    ) -> Result<ResetIssued> {
        if self.stage != Stage::Input {
            return Err(AppError::invalid_data("A recovery is already in progress"));
        }

        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::invalid_data("A valid email address is required"));
        }

        let issued = backend.request_reset(email, self.ctx.redirect_base).await?;
        self.email = Some(email.to_string());
        self.stage = Stage::AwaitingCode;
        self.cooldown = RESEND_COOLDOWN_SECS;
        Ok(issued)
    }

    /// Returns `Ok(false)` without touching the backend while the cooldown
    /// is still running.
    pub async fn resend<B: RecoveryBackend>(&mut self, backend: &B) -> Result<bool> {
        if self.stage != Stage::AwaitingCode {
            return Err(AppError::invalid_data("There is no code to resend"));
        }
        if self.cooldown > 0 {
            return Ok(false);
        }

        let email = self
            .email
            .clone()
            .ok_or_else(|| AppError::invalid_data("No email on record"))?;
        backend.resend_code(&email).await?;
        self.cooldown = RESEND_COOLDOWN_SECS;
        Ok(true)
    }

    pub async fn submit_code<B: RecoveryBackend>(&mut self, backend: &B, code: &str) -> Result<()> {
        if self.stage != Stage::AwaitingCode {
            return Err(AppError::invalid_data("Code entry is not open"));
        }

        let code = code.trim();
        if code.len() != CODE_LENGTH || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::invalid_data("The code must be exactly 6 digits"));
        }

        let email = self
            .email
            .clone()
            .ok_or_else(|| AppError::invalid_data("No email on record"))?;
        backend.verify_code(&email, code).await?;
        self.stage = Stage::SettingNewPassword;
        Ok(())
    }

    pub async fn submit_password<B: RecoveryBackend>(
        &mut self,
        backend: &B,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<()> {
        if self.stage != Stage::SettingNewPassword {
            return Err(AppError::invalid_data("The code has not been verified yet"));
        }
        if new_password.len() < MIN_PASSWORD_LENGTH {
            return Err(AppError::invalid_data("Password must be at least 6 characters"));
        }
        if new_password != confirm_password {
            return Err(AppError::invalid_data("Passwords do not match"));
        }

        let email = self
            .email
            .clone()
            .ok_or_else(|| AppError::invalid_data("No email on record"))?;
        backend.update_password(&email, new_password).await?;
        self.stage = Stage::Closed;
        self.email = None;
        self.cooldown = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct MockBackend {
        reset_calls: AtomicUsize,
        resend_calls: AtomicUsize,
        verify_calls: AtomicUsize,
        update_calls: AtomicUsize,
        reject_code: AtomicBool,
    }

    impl MockBackend {
        fn rejecting_codes() -> Self {
            let backend = MockBackend::default();
            backend.reject_code.store(true, Ordering::SeqCst);
            backend
        }
    }

    #[async_trait]
    impl RecoveryBackend for MockBackend {
        async fn request_reset(&self, _email: &str, _redirect: &str) -> Result<ResetIssued> {
            self.reset_calls.fetch_add(1, Ordering::SeqCst);
            Ok(ResetIssued {
                user_id: "user-1".to_string(),
                reset_token: "reset-token".to_string(),
            })
        }

        async fn resend_code(&self, _email: &str) -> Result<()> {
            self.resend_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn verify_code(&self, _email: &str, _code: &str) -> Result<()> {
            self.verify_calls.fetch_add(1, Ordering::SeqCst);
            if self.reject_code.load(Ordering::SeqCst) {
                Err(AppError::InvalidCode)
            } else {
                Ok(())
            }
        }

        async fn update_password(&self, _email: &str, _new_password: &str) -> Result<()> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn malformed_email_never_reaches_backend() {
        let backend = MockBackend::default();
        let mut flow = RecoveryFlow::open(RoleContext::parent());

        assert!(flow.submit_email(&backend, "no-at-sign").await.is_err());
        assert!(flow.submit_email(&backend, "   ").await.is_err());

        assert_eq!(backend.reset_calls.load(Ordering::SeqCst), 0);
        assert_eq!(flow.stage(), Stage::Input);
    }

    #[tokio::test]
    async fn wrong_length_code_never_reaches_backend() {
        let backend = MockBackend::default();
        let mut flow = RecoveryFlow::open(RoleContext::owner());
        flow.submit_email(&backend, "owner@test.com").await.unwrap();

        assert!(flow.submit_code(&backend, "12345").await.is_err());
        assert!(flow.submit_code(&backend, "1234567").await.is_err());
        assert!(flow.submit_code(&backend, "12a456").await.is_err());

        assert_eq!(backend.verify_calls.load(Ordering::SeqCst), 0);
        assert_eq!(flow.stage(), Stage::AwaitingCode);
    }

    #[tokio::test]
    async fn mismatched_passwords_never_reach_backend() {
        let backend = MockBackend::default();
        let mut flow = RecoveryFlow::from_recovery_link(RoleContext::parent(), "parent@test.com");

        assert!(flow
            .submit_password(&backend, "abcdef", "abcdeg")
            .await
            .is_err());
        assert!(flow.submit_password(&backend, "abc", "abc").await.is_err());

        assert_eq!(backend.update_calls.load(Ordering::SeqCst), 0);
        assert_eq!(flow.stage(), Stage::SettingNewPassword);
    }

    #[tokio::test]
    async fn stages_cannot_be_skipped() {
        let backend = MockBackend::default();

        let mut flow = RecoveryFlow::open(RoleContext::admin());
        assert!(flow.submit_code(&backend, "123456").await.is_err());
        assert!(flow
            .submit_password(&backend, "abcdef", "abcdef")
            .await
            .is_err());

        assert_eq!(backend.verify_calls.load(Ordering::SeqCst), 0);
        assert_eq!(backend.update_calls.load(Ordering::SeqCst), 0);
        assert_eq!(flow.stage(), Stage::Input);
    }

    #[tokio::test]
    async fn resend_is_a_noop_while_cooling_down() {
        let backend = MockBackend::default();
        let mut flow = RecoveryFlow::open(RoleContext::parent());
        flow.submit_email(&backend, "parent@test.com").await.unwrap();
        assert_eq!(flow.cooldown(), RESEND_COOLDOWN_SECS);

        assert!(!flow.resend(&backend).await.unwrap());
        assert_eq!(backend.resend_calls.load(Ordering::SeqCst), 0);

        for _ in 0..RESEND_COOLDOWN_SECS {
            flow.tick();
        }
        assert_eq!(flow.cooldown(), 0);

        assert!(flow.resend(&backend).await.unwrap());
        assert_eq!(backend.resend_calls.load(Ordering::SeqCst), 1);
        assert_eq!(flow.cooldown(), RESEND_COOLDOWN_SECS);
    }

    #[tokio::test]
    async fn rejected_code_keeps_the_stage() {
        let backend = MockBackend::rejecting_codes();
        let mut flow = RecoveryFlow::open(RoleContext::parent());
        flow.submit_email(&backend, "parent@test.com").await.unwrap();

        assert!(flow.submit_code(&backend, "123456").await.is_err());
        assert_eq!(backend.verify_calls.load(Ordering::SeqCst), 1);
        assert_eq!(flow.stage(), Stage::AwaitingCode);
    }

    #[tokio::test]
    async fn full_flow_closes_after_one_password_update() {
        let backend = MockBackend::default();
        let mut flow = RecoveryFlow::open(RoleContext::parent());

        let issued = flow.submit_email(&backend, "parent@test.com").await.unwrap();
        assert_eq!(issued.user_id, "user-1");
        assert_eq!(flow.stage(), Stage::AwaitingCode);
        assert_eq!(flow.cooldown(), 60);

        flow.submit_code(&backend, "123456").await.unwrap();
        assert_eq!(flow.stage(), Stage::SettingNewPassword);

        flow.submit_password(&backend, "newPassword123", "newPassword123")
            .await
            .unwrap();
        assert_eq!(flow.stage(), Stage::Closed);
        assert_eq!(backend.update_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recovery_link_starts_at_password_stage() {
        let backend = MockBackend::default();
        let mut flow = RecoveryFlow::from_recovery_link(RoleContext::owner(), "owner@test.com");
        assert_eq!(flow.stage(), Stage::SettingNewPassword);

        flow.submit_password(&backend, "abcdef", "abcdef").await.unwrap();
        assert_eq!(flow.stage(), Stage::Closed);
        assert_eq!(backend.verify_calls.load(Ordering::SeqCst), 0);
        assert_eq!(backend.update_calls.load(Ordering::SeqCst), 1);
    }
}
