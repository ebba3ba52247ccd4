//! Data-access service handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::store::{
    Professional, ProfessionalStore, DELETE_PROFESSIONAL, INSERT_PROFESSIONAL, LIST_PROFESSIONALS,
};
use crate::telemetry::Telemetry;

/// State shared with data-access handlers.
#[derive(Clone)]
pub struct ApiState {
    /// Backing store.
    pub store: Arc<dyn ProfessionalStore>,
    /// Span capability.
    pub telemetry: Telemetry,
}

impl ApiState {
    /// Create new API state.
    pub fn new(store: Arc<dyn ProfessionalStore>, telemetry: Telemetry) -> Self {
        Self { store, telemetry }
    }
}

/// Acknowledgement body.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Always "success".
    pub status: &'static str,
}

impl StatusResponse {
    const SUCCESS: Self = Self { status: "success" };
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// `GET /api/professionals`
#[instrument(skip_all)]
pub async fn list_professionals(State(state): State<ApiState>) -> Result<Json<Vec<Professional>>> {
    let span = state.telemetry.db_span(
        "get_professionals_query",
        state.store.target(),
        &LIST_PROFESSIONALS,
    );
    let result = state.store.list().await;
    span.finish(&result);

    let professionals = result?;
    debug!(count = professionals.len(), "Returning professionals");
    Ok(Json(professionals))
}

/// `POST /api/professionals`
#[instrument(skip_all)]
pub async fn add_professional(
    State(state): State<ApiState>,
    Json(professional): Json<Professional>,
) -> Result<impl IntoResponse> {
    let span = state.telemetry.db_span(
        "add_professional_query",
        state.store.target(),
        &INSERT_PROFESSIONAL,
    );
    let result = state.store.create(&professional).await;
    span.finish(&result);
    result?;

    info!(name = ?professional.name, "Professional created");
    Ok((StatusCode::CREATED, Json(StatusResponse::SUCCESS)))
}

/// `DELETE /api/professionals/:name`
///
/// Succeeds whether or not a row matched.
#[instrument(skip_all)]
pub async fn delete_professional(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> Result<StatusCode> {
    let span = state.telemetry.db_span(
        "delete_professional_query",
        state.store.target(),
        &DELETE_PROFESSIONAL,
    );
    let result = state.store.delete(&name).await;
    span.finish(&result);

    let removed = result?;
    info!(name = %name, removed, "Professional delete processed");
    Ok(StatusCode::NO_CONTENT)
}
