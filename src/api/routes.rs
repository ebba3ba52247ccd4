//! Data-access service route definitions.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::Level;

use super::handlers::{
    add_professional, delete_professional, health, list_professionals, ApiState,
};

/// Create the data-access router.
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/professionals",
            get(list_professionals).post(add_professional),
        )
        .route("/api/professionals/:name", delete(delete_professional))
        .layer(
            TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
