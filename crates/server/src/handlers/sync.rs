//! Asset synchronization endpoint.

use crate::error::{ApiError, ApiResult};
use crate::handlers::DataResponse;
use crate::metrics;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use kagami_core::AssetCoordinate;
use kagami_mirror::SyncOutcome;
use serde::Deserialize;

/// Request body for POST /v1/sync.
#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    pub name: String,
    pub version: String,
    pub key: String,
}

/// POST /v1/sync - mirror one asset into the destination store.
///
/// Returns `already-mirrored` when the existence probe short-circuits, or
/// `uploaded` after a successful fetch-and-upload. Stage failures surface
/// as the structured error payload.
pub async fn sync_asset(
    State(state): State<AppState>,
    Json(request): Json<SyncRequest>,
) -> ApiResult<Json<DataResponse<SyncOutcome>>> {
    let coordinate = AssetCoordinate::new(request.name, request.version, request.key)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    metrics::SYNC_ATTEMPTS.inc();
    let outcome = state.synchronizer.sync(&coordinate).await.map_err(|error| {
        metrics::SYNC_FAILURES.with_label_values(&[error.stage()]).inc();
        tracing::warn!(coordinate = %coordinate, stage = error.stage(), error = %error, "Synchronization failed");
        ApiError::from(error)
    })?;

    match &outcome {
        SyncOutcome::AlreadyMirrored { .. } => metrics::SYNC_ALREADY_MIRRORED.inc(),
        SyncOutcome::Uploaded { .. } => metrics::SYNC_UPLOADS.inc(),
    }

    Ok(Json(DataResponse { data: outcome }))
}
