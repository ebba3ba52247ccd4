//! Presentation service route definitions.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::Level;

use super::handlers::{add, delete, health, index};
use super::FrontState;

/// Create the page router.
pub fn create_router(state: FrontState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/add", post(add))
        .route("/delete/:name", post(delete))
        .route("/health", get(health))
        .layer(
            TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::new().level(Level::INFO)),
        )
        .with_state(state)
}
