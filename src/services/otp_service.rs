use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::{
    bson::{doc, oid::ObjectId, to_bson, DateTime},
    Collection, Database,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, Result};
use crate::models::otp::RecoverySession;
use crate::models::user::User;
use crate::recovery::{Stage, CODE_TTL_MINUTES, MAX_CODE_ATTEMPTS, RESEND_COOLDOWN_SECS};

pub const PURPOSE_PASSWORD_RESET: &str = "password_reset";
pub const PURPOSE_RECOVERY_LINK: &str = "recovery_link";

#[derive(Debug, Serialize, Deserialize)]
struct ResetClaims {
    user_id: String,
    purpose: String,
    exp: usize,
}

#[derive(Clone)]
pub struct OTPService {
    db: Database,
    jwt_secret: String,
}

impl OTPService {
    pub fn new(db: Database, jwt_secret: String) -> Self {
        Self { db, jwt_secret }
    }

    // Generate 6-digit OTP
    pub fn generate_otp() -> String {
        let mut rng = rand::thread_rng();
        format!("{:06}", rng.gen_range(0..1_000_000))
    }

    /// Short-lived token tying the rest of the flow to this reset request.
    pub fn generate_token(&self, user_id: &str, purpose: &str) -> Result<String> {
        let expiration = Utc::now()
            .checked_add_signed(Duration::minutes(10))
            .ok_or_else(|| AppError::service("Failed to calculate expiration"))?
            .timestamp() as usize;

        let claims = ResetClaims {
            user_id: user_id.to_string(),
            purpose: purpose.to_string(),
            exp: expiration,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::service(format!("Token generation failed: {}", e)))
    }

    /// Returns the user id the token was issued for, or fails.
    pub fn verify_token(&self, token: &str, expected_purpose: &str) -> Result<String> {
        let data = decode::<ResetClaims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| AppError::AuthError)?;

        if data.claims.purpose != expected_purpose {
            return Err(AppError::AuthError);
        }
        Ok(data.claims.user_id)
    }

    /// Open a recovery session in the awaiting-code stage.
    pub async fn begin_session(&self, user_id: &ObjectId, code: &str, token: &str) -> Result<()> {
        let users: Collection<User> = self.db.collection("users");
        let now = Utc::now();

        let session = RecoverySession {
            code: code.to_string(),
            token: token.to_string(),
            attempts: 0,
            stage: Stage::AwaitingCode,
            expires_at: now + Duration::minutes(CODE_TTL_MINUTES),
            resend_available_at: now + Duration::seconds(RESEND_COOLDOWN_SECS as i64),
            created_at: now,
        };

        let update = doc! {
            "$set": {
                "reset_otp": to_bson(&session)
                    .map_err(|e| AppError::service(format!("BSON conversion failed: {}", e)))?,
                "updated_at": DateTime::from_millis(now.timestamp_millis()),
            }
        };

        users.update_one(doc! { "_id": user_id }, update).await?;
        Ok(())
    }

    /// Replace the code on an existing session and restart the cooldown.
    pub async fn refresh_code(&self, user_id: &ObjectId, code: &str) -> Result<()> {
        let users: Collection<User> = self.db.collection("users");
        let now = Utc::now();
        let expires_at = now + Duration::minutes(CODE_TTL_MINUTES);
        let resend_available_at = now + Duration::seconds(RESEND_COOLDOWN_SECS as i64);

        let update = doc! {
            "$set": {
                "reset_otp.code": code,
                "reset_otp.attempts": 0,
                "reset_otp.expires_at": DateTime::from_millis(expires_at.timestamp_millis()),
                "reset_otp.resend_available_at": DateTime::from_millis(resend_available_at.timestamp_millis()),
                "updated_at": DateTime::from_millis(now.timestamp_millis()),
            }
        };

        users.update_one(doc! { "_id": user_id }, update).await?;
        Ok(())
    }

    /// Check the submitted code; a success advances the stored stage to
    /// setting-new-password, a failure burns one attempt.
    pub async fn verify_user_otp(&self, user_id: &ObjectId, code: &str) -> Result<bool> {
        let users: Collection<User> = self.db.collection("users");

        let user = users.find_one(doc! { "_id": user_id }).await?;
        let Some(user) = user else { return Ok(false) };
        let Some(session) = user.reset_otp else { return Ok(false) };

        let now = Utc::now();
        let now_bson = DateTime::from_millis(now.timestamp_millis());

        let valid = session.stage == Stage::AwaitingCode
            && session.code == code
            && session.attempts < MAX_CODE_ATTEMPTS
            && session.expires_at > now;

        if valid {
            let update = doc! {
                "$set": {
                    "reset_otp.stage": "setting_new_password",
                    "updated_at": now_bson,
                }
            };
            users.update_one(doc! { "_id": user_id }, update).await?;
            Ok(true)
        } else {
            let update = doc! {
                "$inc": { "reset_otp.attempts": 1 },
                "$set": { "updated_at": now_bson },
            };
            users.update_one(doc! { "_id": user_id }, update).await?;
            Ok(false)
        }
    }

    /// Direct entry from a recovery link: the link token was already checked,
    /// so the session opens straight in the password stage.
    pub async fn open_from_link(&self, user_id: &ObjectId) -> Result<()> {
        let users: Collection<User> = self.db.collection("users");
        let now = Utc::now();

        let session = RecoverySession {
            code: String::new(),
            token: String::new(),
            attempts: 0,
            stage: Stage::SettingNewPassword,
            expires_at: now + Duration::minutes(10),
            resend_available_at: now,
            created_at: now,
        };

        let update = doc! {
            "$set": {
                "reset_otp": to_bson(&session)
                    .map_err(|e| AppError::service(format!("BSON conversion failed: {}", e)))?,
                "updated_at": DateTime::from_millis(now.timestamp_millis()),
            }
        };

        users.update_one(doc! { "_id": user_id }, update).await?;
        Ok(())
    }

    /// Store the new password hash and clear the session. Refused unless the
    /// stored stage shows the code (or link) was verified first.
    pub async fn complete(&self, user_id: &ObjectId, password_hash: &str) -> Result<()> {
        let users: Collection<User> = self.db.collection("users");

        let user = users
            .find_one(doc! { "_id": user_id })
            .await?
            .ok_or(AppError::DocumentNotFound)?;

        let verified = user
            .reset_otp
            .map(|s| s.stage == Stage::SettingNewPassword)
            .unwrap_or(false);
        if !verified {
            return Err(AppError::AuthError);
        }

        let now = Utc::now();
        let update = doc! {
            "$set": {
                "password_hash": password_hash,
                "updated_at": DateTime::from_millis(now.timestamp_millis()),
            },
            "$unset": { "reset_otp": "" },
        };

        users.update_one(doc! { "_id": user_id }, update).await?;
        Ok(())
    }
}
