//! # HTTP Server Module
//!
//! Axum server exposing the search and index services.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/about` - Server information
//! - `/services/{container}/search/*` - Search sessions and result pages
//! - `/services/{container}/indexes/*` - Annotation field indexes
//! - `/services/{container}/metadata` - Size and indexes of a container
//! - `/services/{container}/fields` - Field usage of a container
//! - `/list/*` - Container and annotation URL listings
//!
//! Every `/services/{container}` endpoint answers `400` when the container
//! does not exist.

pub mod config;
pub mod errors;
pub mod index_routes;
pub mod list_routes;
pub mod search_routes;
pub mod server;
pub mod service_routes;
pub mod state;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use server::{spawn_session_sweeper, HttpServer};
pub use state::AppState;
