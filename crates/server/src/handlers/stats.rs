//! Analytics proxy endpoint.

use crate::error::ApiResult;
use crate::handlers::DataResponse;
use crate::metrics;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use kagami_mirror::MetricKind;
use serde_json::Value;

/// GET /v1/stats/{kind} - proxy a read-only analytics query.
///
/// Unrecognized kinds fall back to the request-count metric.
pub async fn get_stats(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> ApiResult<Json<DataResponse<Value>>> {
    let kind = MetricKind::from_selector(&kind);

    metrics::ANALYTICS_QUERIES.inc();
    let rows = state.analytics.top_urls(kind).await?;

    Ok(Json(DataResponse { data: rows }))
}
