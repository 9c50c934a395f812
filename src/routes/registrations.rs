use axum::{routing::get, Router};

use crate::handlers::registrations;
use crate::state::AppState;

// Parent surface, mounted behind the parent role guard
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(registrations::get_my_registrations).post(registrations::create_registration),
    )
}
