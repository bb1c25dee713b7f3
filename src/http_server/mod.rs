//! # Citizens HTTP Server Module
//!
//! Axum front for the import service.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/imports` - Create an import
//! - `/imports/:import_id/...` - Update citizens and query an import

mod config;
mod errors;
mod response;
mod routes;
mod server;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use response::{DataResponse, HealthResponse, ImportCreated};
pub use routes::{health_routes, import_routes, ImportState};
pub use server::HttpServer;
