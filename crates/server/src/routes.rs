//! Route configuration.

use crate::handlers;
use crate::metrics::metrics_handler;
use crate::state::AppState;
use axum::Router;
use axum::http::Method;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Mirror control
        .route("/v1/sync", post(handlers::sync_asset))
        // Analytics proxy
        .route("/v1/stats/{kind}", get(handlers::get_stats))
        // Health check (intentionally unauthenticated for load balancers/k8s probes)
        .route("/v1/health", get(handlers::health_check));

    let mut router = Router::new().merge(api_routes);

    // Conditionally add metrics endpoint based on config.
    // SECURITY: When enabled, this endpoint MUST be network-restricted
    // to authorized Prometheus scraper IPs only.
    // See crate::metrics module documentation for details.
    if state.config.server.metrics_enabled {
        let metrics_routes = Router::new().route("/metrics", get(metrics_handler));
        router = router.merge(metrics_routes);
    }

    // Browser callers hit the API cross-origin; the mirror serves public
    // content, so the CORS policy is deliberately permissive.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
