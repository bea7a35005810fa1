//! HTTP API

pub mod handlers;
pub mod models;
pub mod routes;

pub use handlers::AppState;
pub use models::{error_codes, ApiError, McpRequest};
pub use routes::build_router;
