//! Prometheus metrics for the Kagami server.
//!
//! Exposes counters for synchronization outcomes and analytics queries.
//!
//! # Security Note
//!
//! The `/metrics` endpoint is unauthenticated to allow Prometheus scraping.
//! **Deployment Requirement**: it MUST be network-restricted to authorized
//! Prometheus scraper IPs only, at the infrastructure level. Do NOT expose
//! `/metrics` on public networks.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::{LazyLock, Once};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

pub static SYNC_ATTEMPTS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "kagami_sync_attempts_total",
        "Total number of synchronization attempts",
    )
    .expect("metric creation failed")
});

pub static SYNC_ALREADY_MIRRORED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "kagami_sync_already_mirrored_total",
        "Total number of synchronizations short-circuited by the existence probe",
    )
    .expect("metric creation failed")
});

pub static SYNC_UPLOADS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "kagami_sync_uploads_total",
        "Total number of assets fetched and uploaded",
    )
    .expect("metric creation failed")
});

pub static SYNC_FAILURES: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "kagami_sync_failures_total",
            "Total synchronization failures by pipeline stage",
        ),
        &["stage"],
    )
    .expect("metric creation failed")
});

pub static ANALYTICS_QUERIES: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "kagami_analytics_queries_total",
        "Total number of analytics queries proxied",
    )
    .expect("metric creation failed")
});

/// Guard to ensure metrics are only registered once.
static REGISTER_ONCE: Once = Once::new();

/// Register all metrics with the global registry.
///
/// Idempotent: subsequent calls after the first are no-ops, which keeps
/// integration tests that build multiple routers safe.
pub fn register_metrics() {
    REGISTER_ONCE.call_once(|| {
        REGISTRY
            .register(Box::new(SYNC_ATTEMPTS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(SYNC_ALREADY_MIRRORED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(SYNC_UPLOADS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(SYNC_FAILURES.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(ANALYTICS_QUERIES.clone()))
            .expect("metric registration failed");
    });
}

/// GET /metrics - Prometheus metrics endpoint.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        ),
    }
}
