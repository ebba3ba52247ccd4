//! SQLite-backed store for local runs and tests.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};
use tracing::{debug, instrument, warn};

use crate::error::StoreError;

use super::types::{
    Professional, StoreTarget, CREATE_TABLE, DELETE_PROFESSIONAL, INSERT_PROFESSIONAL,
    LIST_PROFESSIONALS,
};
use super::ProfessionalStore;

/// SQLite store with the same one-connection-per-call discipline as [`MySqlStore`].
///
/// [`MySqlStore`]: super::MySqlStore
#[derive(Debug, Clone)]
pub struct SqliteStore {
    options: SqliteConnectOptions,
    target: StoreTarget,
}

impl SqliteStore {
    /// Create a store for a `sqlite:` URL. The file is created on first connect.
    pub fn new(url: &str) -> Result<Self, StoreError> {
        let target = StoreTarget::from_url(url)?;
        if target.system != "sqlite" {
            return Err(StoreError::UnsupportedUrl(target.connection_string()));
        }
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|_| StoreError::UnsupportedUrl(url.to_string()))?
            .create_if_missing(true);

        Ok(Self { options, target })
    }

    /// Create a store backed by a file path.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        Self::new(&format!("sqlite://{}", path.to_string_lossy()))
    }

    async fn connect(&self) -> Result<SqliteConnection, StoreError> {
        self.options
            .connect()
            .await
            .map_err(|source| StoreError::Connection {
                target: self.target.connection_string(),
                source,
            })
    }
}

async fn release(conn: SqliteConnection) {
    if let Err(e) = conn.close().await {
        warn!("Failed to close SQLite connection cleanly: {}", e);
    }
}

#[async_trait]
impl ProfessionalStore for SqliteStore {
    fn target(&self) -> &StoreTarget {
        &self.target
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Professional>, StoreError> {
        let mut conn = self.connect().await?;
        let rows = sqlx::query_as::<_, Professional>(LIST_PROFESSIONALS.text)
            .fetch_all(&mut conn)
            .await
            .map_err(StoreError::query(LIST_PROFESSIONALS.operation))?;
        release(conn).await;

        debug!(count = rows.len(), "Listed professionals");
        Ok(rows)
    }

    #[instrument(skip(self, professional), fields(name = ?professional.name))]
    async fn create(&self, professional: &Professional) -> Result<(), StoreError> {
        let mut conn = self.connect().await?;
        sqlx::query(INSERT_PROFESSIONAL.text)
            .bind(&professional.name)
            .bind(&professional.profession)
            .bind(professional.years_of_experience)
            .execute(&mut conn)
            .await
            .map_err(StoreError::query(INSERT_PROFESSIONAL.operation))?;
        release(conn).await;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, name: &str) -> Result<u64, StoreError> {
        let mut conn = self.connect().await?;
        let result = sqlx::query(DELETE_PROFESSIONAL.text)
            .bind(name)
            .execute(&mut conn)
            .await
            .map_err(StoreError::query(DELETE_PROFESSIONAL.operation))?;
        release(conn).await;

        Ok(result.rows_affected())
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        let mut conn = self.connect().await?;
        sqlx::Executor::execute(&mut conn, sqlx::raw_sql(CREATE_TABLE))
            .await
            .map_err(StoreError::schema)?;
        release(conn).await;

        Ok(())
    }
}
