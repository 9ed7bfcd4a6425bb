//! Ratefold Server
//!
//! Thin HTTP shell over the rate aggregator: parses requests, maps empty
//! results to 404 and exposes the metrics snapshot.

pub mod api;
pub mod config;
pub mod error;

pub use api::router;
pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
