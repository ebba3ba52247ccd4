//! Unified error types for the professionals services.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::store::DbOperation;

/// Unified error type for the professionals services.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Database error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Call to the data-access service failed.
    #[error("relay error: {0}")]
    Relay(#[from] RelayError),

    /// HTML template error.
    #[error("render error: {0}")]
    Render(#[from] minijinja::Error),

    /// Telemetry pipeline setup error.
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Database errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Opening the connection failed.
    #[error("failed to connect to {target}: {source}")]
    Connection {
        /// Connection string, without password.
        target: String,
        /// Driver error.
        #[source]
        source: sqlx::Error,
    },

    /// The statement itself failed.
    #[error("{operation} failed: {source}")]
    Query {
        /// SQL verb of the failing statement.
        operation: DbOperation,
        /// Driver error.
        #[source]
        source: sqlx::Error,
    },

    /// Creating the table failed.
    #[error("schema bootstrap failed: {0}")]
    Schema(#[source] sqlx::Error),

    /// The database URL names a backend we do not have.
    #[error("unsupported database url: {0}")]
    UnsupportedUrl(String),
}

impl StoreError {
    /// Adapter for `map_err` on statement execution.
    pub fn query(operation: DbOperation) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Self::Query { operation, source }
    }

    /// Adapter for `map_err` on schema bootstrap.
    pub fn schema(source: sqlx::Error) -> Self {
        Self::Schema(source)
    }
}

/// Errors talking to the data-access service.
#[derive(Error, Debug)]
pub enum RelayError {
    /// The configured API URL cannot be used.
    #[error("invalid api url {url}: {reason}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Building the HTTP client failed.
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request never produced a response.
    #[error("request to {url} failed: {source}")]
    Request {
        /// Request URL.
        url: String,
        /// Transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The data-access service answered a list request with an error status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Request URL.
        url: String,
        /// Response status.
        status: u16,
    },

    /// The list response was not a JSON array of professionals.
    #[error("unexpected response body from {url}: {source}")]
    Body {
        /// Request URL.
        url: String,
        /// Decode error.
        #[source]
        source: reqwest::Error,
    },
}

/// Telemetry setup errors.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Telemetry enabled without a collector endpoint.
    #[error("OTEL_EXPORTER_OTLP_ENDPOINT is required when telemetry is enabled")]
    MissingEndpoint,

    /// A `key=value` header entry could not be parsed.
    #[error("invalid exporter header: {0}")]
    InvalidHeader(String),

    /// The OTLP exporter could not be built.
    #[error("failed to build OTLP exporter: {0}")]
    Exporter(String),

    /// A global subscriber was already installed.
    #[error("failed to install log subscriber: {0}")]
    Subscriber(String),
}

/// Error body returned by both services.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Error detail.
    pub error: ErrorDetail,
}

/// Machine-readable code plus a message.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Stable code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl AppError {
    /// Status code and stable error code for this error.
    pub fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Store(StoreError::Connection { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORE_UNAVAILABLE")
            }
            AppError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_QUERY"),
            AppError::Relay(RelayError::InvalidUrl { .. } | RelayError::Client(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "RELAY_MISCONFIGURED")
            }
            AppError::Relay(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_FAILED"),
            AppError::Render(_) => (StatusCode::INTERNAL_SERVER_ERROR, "RENDER_FAILED"),
            AppError::Config(_) | AppError::Telemetry(_) | AppError::Io(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.classify();
        tracing::error!(code, error = %self, "Request failed");

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;
