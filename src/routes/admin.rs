use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::handlers::{auth, kindergartens, providers, registrations};
use crate::state::AppState;

// Admin surface, mounted behind the admin role guard
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(auth::get_all_users))
        .route("/registrations", get(registrations::get_all_registrations))
        .route(
            "/registrations/:id",
            patch(registrations::admin_decide_registration),
        )
        .route("/kindergartens", post(kindergartens::create_kindergarten))
        .route("/providers", post(providers::create_provider))
}
