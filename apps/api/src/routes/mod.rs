pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::proposal::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/proposals/generate",
            post(handlers::handle_generate),
        )
        .route("/api/v1/usage", get(handlers::handle_get_usage))
        .with_state(state)
}
