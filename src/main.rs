use axum::extract::State;
use axum::{http::Method, response::Json, routing::get, Extension, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber;

mod config;
mod database;
mod dtos;
mod errors;
mod filters;
mod handlers;
mod middleware;
mod models;
mod recovery;
mod routes;
mod services;
mod state;

use config::AppConfig;
use database::connection::get_db_client;
use middleware::auth::{auth_middleware, role_guard, RequiredRole};
use models::user::Role;
use recovery::RoleContext;
use state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = AppConfig::from_env();
    let db = get_db_client(&config).await;
    let app_state = AppState::new(db, config);

    let app = build_router(app_state.clone());
    start_server(app, &app_state.config).await;
}

/// Wrap a route group with the session gatekeeper for one role: token check
/// first, then a per-request stored-role check.
fn guarded(router: Router<AppState>, state: &AppState, role: Role) -> Router<AppState> {
    router
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            role_guard,
        ))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .route_layer(Extension(RequiredRole(role)))
}

fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .allow_credentials(false);

    // One parameterized auth surface per role, never three copies
    let parent_auth = routes::auth::routes(RoleContext::parent());
    let owner_auth = routes::auth::routes(RoleContext::owner());
    let admin_auth = routes::auth::routes(RoleContext::admin());

    let registrations = guarded(routes::registrations::routes(), &app_state, Role::Parent);
    let owner_dashboard = guarded(routes::owner::routes(), &app_state, Role::Owner);
    let admin_dashboard = guarded(routes::admin::routes(), &app_state, Role::Admin);

    // Profile endpoints only need a valid session, whatever the role
    let profile = routes::profile::routes().route_layer(axum::middleware::from_fn_with_state(
        app_state.clone(),
        auth_middleware,
    ));

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/api/health", get(api_health_check))
        .nest("/api/auth", parent_auth)
        .nest("/api/owner-auth", owner_auth)
        .nest("/api/admin-auth", admin_auth)
        .nest("/api/kindergartens", routes::kindergartens::routes())
        .nest("/api/providers", routes::providers::routes())
        .nest("/api/registrations", registrations)
        .nest("/api/owner", owner_dashboard)
        .nest("/api/admin", admin_dashboard)
        .nest("/api/profile", profile)
        .layer(cors)
        .with_state(app_state)
}

async fn start_server(app: Router, config: &AppConfig) {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("HOST/PORT must form a valid socket address");

    tracing::info!("🚀 Server starting on {}", addr);

    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            axum::serve(listener, app).await.unwrap();
        }
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    }
}

async fn root_handler() -> &'static str {
    "🧸 Rawdati API - kindergartens and children's services directory"
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn api_health_check(State(state): State<AppState>) -> Json<Value> {
    use mongodb::bson::doc;

    let db_status = match state.db.run_command(doc! {"ping": 1}).await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    Json(json!({
        "status": "healthy",
        "database": db_status,
        "email": true,
        "otp": true,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
