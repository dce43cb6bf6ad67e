//! Route configuration.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::server::handlers::{self, AppState};

/// Creates the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/v1/option-chain", get(handlers::option_chain))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
