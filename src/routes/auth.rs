use axum::{routing::post, Extension, Router};

use crate::recovery::RoleContext;
use crate::routes::auth_otp_routes;
use crate::state::AppState;

/// One auth surface, mounted three times (parent, owner, admin). The role
/// context extension is the only thing that differs between the mounts.
pub fn routes(ctx: RoleContext) -> Router<AppState> {
    Router::new()
        .route("/register", post(crate::handlers::auth::register))
        .route("/login", post(crate::handlers::auth::login))
        .merge(auth_otp_routes::routes())
        .layer(Extension(ctx))
}
