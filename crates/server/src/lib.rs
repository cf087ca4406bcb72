//! HTTP API server for the Kagami asset mirror.
//!
//! This crate provides the thin transport layer over the mirror core:
//! - Asset synchronization endpoint
//! - Analytics proxy endpoint
//! - Health check and Prometheus metrics

pub mod error;
pub mod handlers;
pub mod metrics;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
