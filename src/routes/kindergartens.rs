use axum::{routing::get, Router};

use crate::handlers::{kindergartens, reviews};
use crate::state::AppState;

// Public directory surface
pub fn routes() -> Router<AppState> {
    Router::new()
        // GET /api/kindergartens - full catalog
        .route("/", get(kindergartens::get_kindergartens))

        // GET /api/kindergartens/search?q=&services=bus,meals&fee_min=...
        .route("/search", get(kindergartens::search_kindergartens))

        .route("/:id", get(kindergartens::get_kindergarten))

        // Reviews are public: anyone with a display name may post one
        .route(
            "/:id/reviews",
            get(reviews::get_reviews).post(reviews::create_review),
        )
}
