//! HTTP request handlers.

pub mod stats;
pub mod sync;

pub use stats::*;
pub use sync::*;

use axum::Json;
use serde::Serialize;

/// Success envelope: every externally observable result carries its payload
/// under `data`.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /v1/health - liveness probe.
///
/// Intentionally unauthenticated for load balancers and k8s probes.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
