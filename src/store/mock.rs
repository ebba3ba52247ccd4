//! In-memory store for unit testing.
//!
//! Behaves like the SQL backends (no uniqueness, delete-by-name removes every
//! match) without a database, and can be switched offline to exercise the
//! connection-failure path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::StoreError;

use super::types::{Professional, StoreTarget};
use super::ProfessionalStore;

/// Mock store for testing.
#[derive(Debug, Clone)]
pub struct MockStore {
    rows: Arc<Mutex<Vec<Professional>>>,
    offline: Arc<AtomicBool>,
    target: StoreTarget,
}

impl MockStore {
    /// Create an empty mock store that reports itself as the default MySQL target.
    pub fn new() -> Self {
        Self {
            rows: Arc::new(Mutex::new(Vec::new())),
            offline: Arc::new(AtomicBool::new(false)),
            target: StoreTarget {
                system: "mysql".to_string(),
                host: "mysql".to_string(),
                port: Some(3306),
                user: "root".to_string(),
                database: "testdb".to_string(),
            },
        }
    }

    /// Create a mock store pre-filled with rows.
    pub fn with_rows(rows: Vec<Professional>) -> Self {
        let store = Self::new();
        *store.lock() = rows;
        store
    }

    /// Simulate the database becoming unreachable (or reachable again).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Snapshot of the current rows.
    pub fn rows(&self) -> Vec<Professional> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Professional>> {
        // A poisoned lock only means another test thread panicked mid-push.
        self.rows.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Connection {
                target: self.target.connection_string(),
                source: sqlx::Error::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "mock store offline",
                )),
            });
        }
        Ok(())
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfessionalStore for MockStore {
    fn target(&self) -> &StoreTarget {
        &self.target
    }

    async fn list(&self) -> Result<Vec<Professional>, StoreError> {
        self.check_online()?;
        Ok(self.rows())
    }

    async fn create(&self, professional: &Professional) -> Result<(), StoreError> {
        self.check_online()?;
        self.lock().push(professional.clone());
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<u64, StoreError> {
        self.check_online()?;
        let mut rows = self.lock();
        let before = rows.len();
        rows.retain(|p| p.name.as_deref() != Some(name));
        Ok((before - rows.len()) as u64)
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        self.check_online()
    }
}
