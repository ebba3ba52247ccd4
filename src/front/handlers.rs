//! Page handlers.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::{Form, Json};
use serde::Deserialize;
use tracing::{info, instrument};

use super::FrontState;
use crate::api::handlers::HealthResponse;
use crate::error::Result;
use crate::store::Professional;

/// Fields posted by the add form. All three are required.
#[derive(Debug, Deserialize)]
pub struct AddForm {
    pub name: String,
    pub profession: String,
    pub years_of_experience: i64,
}

impl From<AddForm> for Professional {
    fn from(form: AddForm) -> Self {
        Professional::new(form.name, form.profession, form.years_of_experience)
    }
}

/// 302 back to the listing.
fn back_to_index() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, "/")])
}

pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// `GET /`
#[instrument(skip_all)]
pub async fn index(State(state): State<FrontState>) -> Result<Html<String>> {
    let professionals = state.directory.list().await?;
    let page = state.pages.index(&professionals)?;
    Ok(Html(page))
}

/// `POST /add`
#[instrument(skip_all)]
pub async fn add(
    State(state): State<FrontState>,
    Form(form): Form<AddForm>,
) -> Result<impl IntoResponse> {
    let professional = Professional::from(form);
    state.directory.add(&professional).await?;

    info!(name = ?professional.name, "Professional added");
    Ok(back_to_index())
}

/// `POST /delete/:name`
#[instrument(skip_all)]
pub async fn delete(
    State(state): State<FrontState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse> {
    state.directory.remove(&name).await?;

    info!(name = %name, "Professional removed");
    Ok(back_to_index())
}
