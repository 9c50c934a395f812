use axum::{routing::get, Router};

use crate::handlers::profile;
use crate::state::AppState;

// Any authenticated role
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(profile::get_me))
        .route(
            "/language",
            get(profile::get_language).put(profile::set_language),
        )
}
