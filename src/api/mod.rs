//! Data-access service: JSON over HTTP in front of the professionals table.

pub mod handlers;
pub mod routes;

pub use handlers::ApiState;
pub use routes::create_router;
