//! # HTTP Server Module
//!
//! Exposes the engine over HTTP with Axum.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `POST /serialize` - Merge an incoming record over the persisted one
//! - `POST /deserialize` - Keep only declared root keys
//! - `POST /properties/defined` - Property pointer lookup
//! - `POST /properties/read-only` - Property mutability lookup
//! - `POST /validate` - Draft-07 validation

pub mod config;
pub mod errors;
pub mod routes;
pub mod server;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult};
pub use routes::{engine_routes, AppState, SchemaRef};
pub use server::HttpServer;
