use axum::{
    routing::{get, patch},
    Router,
};

use crate::handlers::{owner_dashboard, registrations};
use crate::state::AppState;

// Owner dashboard, mounted behind the owner role guard; every query is
// scoped to the owner's kindergarten.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/kindergarten",
            get(owner_dashboard::get_my_kindergarten).post(owner_dashboard::create_my_kindergarten),
        )
        .route("/registrations", get(registrations::get_owner_registrations))
        .route("/registrations/:id", patch(registrations::decide_registration))
        .route(
            "/children",
            get(owner_dashboard::get_children).post(owner_dashboard::create_child),
        )
        .route(
            "/staff",
            get(owner_dashboard::get_staff).post(owner_dashboard::create_staff_member),
        )
        .route(
            "/attendance",
            get(owner_dashboard::get_attendance).post(owner_dashboard::create_attendance_record),
        )
        .route(
            "/payments",
            get(owner_dashboard::get_payments).post(owner_dashboard::create_payment),
        )
}
