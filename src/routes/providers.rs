use axum::{routing::get, Router};

use crate::handlers::providers;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        // GET /api/providers?category=pediatrician&city=...
        .route("/", get(providers::get_providers))
}
