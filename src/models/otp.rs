use chrono::{DateTime, Utc};
use mongodb::bson;
use serde::{Deserialize, Serialize};

use crate::recovery::Stage;

/// Per-user password-recovery session, embedded in the user document.
/// Cleared when the password update completes.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecoverySession {
    pub code: String,   // 6-digit OTP
    pub token: String,  // signed reset token handed back to the client
    pub attempts: i32,  // failed verification attempts
    pub stage: Stage,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub expires_at: DateTime<Utc>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub resend_available_at: DateTime<Utc>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl RecoverySession {
    /// Seconds left before a resend is allowed, clamped at zero.
    pub fn resend_cooldown_remaining(&self, now: DateTime<Utc>) -> u32 {
        let remaining = (self.resend_available_at - now).num_seconds();
        if remaining > 0 {
            remaining as u32
        } else {
            0
        }
    }
}
