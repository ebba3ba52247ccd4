//! Persistence for the `professionals` table.
//!
//! This module handles:
//! - The [`Professional`] record and the three fixed statements
//! - The [`ProfessionalStore`] seam shared by every backend
//! - MySQL and SQLite backends, each opening one connection per call
//! - An in-memory mock for handler tests

pub mod mock;
pub mod mysql;
pub mod sqlite;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreError;

pub use mock::MockStore;
pub use mysql::MySqlStore;
pub use sqlite::SqliteStore;
pub use types::{
    DbOperation, Professional, Statement, StoreTarget, DELETE_PROFESSIONAL, INSERT_PROFESSIONAL,
    LIST_PROFESSIONALS,
};

/// Data access for professionals. Every call is an uncached round trip.
#[async_trait]
pub trait ProfessionalStore: Send + Sync {
    /// Connection target, used for span attributes.
    fn target(&self) -> &StoreTarget;

    /// All rows, in store order.
    async fn list(&self) -> Result<Vec<Professional>, StoreError>;

    /// Insert one row. No duplicate check.
    async fn create(&self, professional: &Professional) -> Result<(), StoreError>;

    /// Delete rows whose name matches exactly. Returns the number removed,
    /// which may be zero.
    async fn delete(&self, name: &str) -> Result<u64, StoreError>;

    /// Create the table if it does not exist.
    async fn ensure_schema(&self) -> Result<(), StoreError>;
}

/// Pick a backend from the URL scheme.
pub fn connect_store(url: &str) -> Result<Arc<dyn ProfessionalStore>, StoreError> {
    if url.starts_with("mysql:") {
        Ok(Arc::new(MySqlStore::new(url)?))
    } else if url.starts_with("sqlite:") {
        Ok(Arc::new(SqliteStore::new(url)?))
    } else {
        Err(StoreError::UnsupportedUrl(types::redact(url)))
    }
}
