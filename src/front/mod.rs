//! Presentation service: an HTML page over a [`Directory`] of professionals.
//!
//! The same router serves both deployment shapes. The monolith reads the
//! table through [`StoreDirectory`]; the split front-end relays every call to
//! the data-access service through [`crate::client::ApiClient`].

pub mod handlers;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AppError;
use crate::render::Renderer;
use crate::store::{
    Professional, ProfessionalStore, DELETE_PROFESSIONAL, INSERT_PROFESSIONAL, LIST_PROFESSIONALS,
};
use crate::telemetry::Telemetry;

pub use routes::create_router;

/// Where the page reads and writes professionals.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Every professional, in source order.
    async fn list(&self) -> Result<Vec<Professional>, AppError>;

    /// Add one professional.
    async fn add(&self, professional: &Professional) -> Result<(), AppError>;

    /// Remove professionals with this exact name.
    async fn remove(&self, name: &str) -> Result<(), AppError>;
}

/// Direct table access for the single-process shape.
#[derive(Clone)]
pub struct StoreDirectory {
    store: Arc<dyn ProfessionalStore>,
    telemetry: Telemetry,
}

impl StoreDirectory {
    pub fn new(store: Arc<dyn ProfessionalStore>, telemetry: Telemetry) -> Self {
        Self { store, telemetry }
    }
}

#[async_trait]
impl Directory for StoreDirectory {
    async fn list(&self) -> Result<Vec<Professional>, AppError> {
        let span = self
            .telemetry
            .db_span("index_query", self.store.target(), &LIST_PROFESSIONALS);
        let result = self.store.list().await;
        span.finish(&result);
        Ok(result?)
    }

    async fn add(&self, professional: &Professional) -> Result<(), AppError> {
        let span = self
            .telemetry
            .db_span("insert_query", self.store.target(), &INSERT_PROFESSIONAL);
        let result = self.store.create(professional).await;
        span.finish(&result);
        Ok(result?)
    }

    async fn remove(&self, name: &str) -> Result<(), AppError> {
        let span = self
            .telemetry
            .db_span("delete_query", self.store.target(), &DELETE_PROFESSIONAL);
        let result = self.store.delete(name).await;
        span.finish(&result);
        result?;
        Ok(())
    }
}

/// State shared with page handlers.
#[derive(Clone)]
pub struct FrontState {
    pub directory: Arc<dyn Directory>,
    pub pages: Arc<Renderer>,
}

impl FrontState {
    pub fn new(directory: Arc<dyn Directory>, pages: Arc<Renderer>) -> Self {
        Self { directory, pages }
    }
}
