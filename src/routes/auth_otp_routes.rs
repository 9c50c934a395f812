use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers::auth_otp, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        // Request a recovery code
        .route("/forgot-password", post(auth_otp::forgot_password))

        // Resend it, subject to the 60-second cooldown
        .route("/resend-code", post(auth_otp::resend_code))

        // Verify the code
        .route("/verify-code", post(auth_otp::verify_code))

        // Set the new password with the verified session
        .route("/reset-password", post(auth_otp::reset_password))

        // Direct entry from an emailed recovery link
        .route("/recovery", get(auth_otp::open_recovery_link))
}
