pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::pipeline::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Screening API
        .route("/api/v1/screenings", post(handlers::handle_screening))
        .route(
            "/api/v1/screenings/upload",
            post(handlers::handle_screening_upload),
        )
        .with_state(state)
}
