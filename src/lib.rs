//! Professionals directory: a small CRUD web system over one MySQL table.
//!
//! The system ships in two shapes from one binary:
//!
//! ```text
//! monolith:  browser ──form──▶ front ──SQL──▶ store
//!
//! split:     browser ──form──▶ front ──JSON/HTTP──▶ api ──SQL──▶ store
//! ```
//!
//! Every store call and every relay call runs inside a client span that is
//! exported over OTLP when telemetry is enabled.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`store`]: The professionals table and its backends
//! - [`telemetry`]: Logging, span export and the injected span handle
//! - [`api`]: JSON data-access service
//! - [`front`]: HTML presentation service
//! - [`client`]: HTTP client the split front-end relays through
//! - [`render`]: Page templates
//! - [`utils`]: Utility functions

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod front;
pub mod render;
pub mod store;
pub mod telemetry;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result};
