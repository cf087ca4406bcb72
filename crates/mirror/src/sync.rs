//! Mirror synchronization: existence probe, source fetch, signed upload.

use crate::error::{MirrorError, MirrorResult};
use kagami_core::config::{CdnConfig, StorageConfig};
use kagami_core::{content_type_for_key, AssetCoordinate};
use kagami_signer::{CosSigner, RequestSigner, SignableRequest, SignerResult};
use reqwest::header::{CONTENT_TYPE, ETAG};
use serde::Serialize;
use time::OffsetDateTime;

/// Terminal outcome of one successful synchronization attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum SyncOutcome {
    /// The destination already holds the asset; no fetch or upload happened.
    AlreadyMirrored { content_hash: String },
    /// The asset was fetched from the source CDN and uploaded.
    Uploaded { key: String },
}

/// Drives the probe → fetch → upload state machine for one coordinate.
///
/// Stateless apart from the remote store itself: concurrent calls for the
/// same coordinate may both upload, and last write wins, which is acceptable
/// because content for a coordinate is immutable.
pub struct Synchronizer {
    http: reqwest::Client,
    cdn: CdnConfig,
    storage: StorageConfig,
    signer: CosSigner,
}

impl Synchronizer {
    /// Create a synchronizer over the given HTTP client and configuration.
    pub fn new(http: reqwest::Client, cdn: CdnConfig, storage: StorageConfig) -> SignerResult<Self> {
        let signer = CosSigner::new(storage.credentials.clone(), storage.sign_window_secs)?;
        Ok(Self {
            http,
            cdn,
            storage,
            signer,
        })
    }

    /// Synchronize one asset, terminal on first success or first failure.
    ///
    /// The three network calls run strictly in sequence; nothing is retried
    /// here. Re-running a failed synchronization is safe because the probe
    /// short-circuits coordinates that already made it to the store.
    pub async fn sync(&self, coordinate: &AssetCoordinate) -> MirrorResult<SyncOutcome> {
        if let Some(content_hash) = self.probe(coordinate).await {
            tracing::debug!(coordinate = %coordinate, "Asset already mirrored");
            return Ok(SyncOutcome::AlreadyMirrored { content_hash });
        }

        let source = self.fetch(coordinate).await?;
        let key = self.upload(coordinate, source).await?;
        Ok(SyncOutcome::Uploaded { key })
    }

    /// Existence probe against the destination's public URL.
    ///
    /// Any non-success status or transport error means "not yet mirrored";
    /// the two are deliberately not distinguished.
    async fn probe(&self, coordinate: &AssetCoordinate) -> Option<String> {
        let url = coordinate.probe_url(
            &self.storage.public_base_url,
            self.storage.folder.as_deref(),
        );
        let response = self.http.head(&url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        // A success status alone settles the outcome; the fingerprint is
        // best-effort and empty when the store sends no usable validator.
        let fingerprint = response
            .headers()
            .get(ETAG)
            .and_then(|value| value.to_str().ok())
            .map(fingerprint_from_etag)
            .unwrap_or_default();
        Some(fingerprint)
    }

    async fn fetch(&self, coordinate: &AssetCoordinate) -> MirrorResult<reqwest::Response> {
        let url = coordinate.source_url(&self.cdn.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(MirrorError::FetchTransport)?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(coordinate = %coordinate, status = status.as_u16(), "Source fetch failed");
            return Err(MirrorError::FetchStatus {
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    /// Upload the fetched body, streamed, with a freshly signed request.
    async fn upload(
        &self,
        coordinate: &AssetCoordinate,
        source: reqwest::Response,
    ) -> MirrorResult<String> {
        let content_type = source
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| content_type_for_key(&coordinate.key).to_string());

        let key = coordinate.storage_key();
        let url = format!("{}/{}", self.storage.upload_base_url(), key);
        let parsed = reqwest::Url::parse(&url).map_err(|e| MirrorError::Url(e.to_string()))?;
        let host = match (parsed.host_str(), parsed.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(MirrorError::Url(format!("no host in upload URL: {url}"))),
        };

        let signable = SignableRequest::new("PUT", format!("/{key}"))
            .header("Host", &host)
            .header("Content-Type", &content_type);
        let authorization = self
            .signer
            .authorization(&signable, OffsetDateTime::now_utc())?;

        let body = reqwest::Body::wrap_stream(source.bytes_stream());
        let response = self
            .http
            .put(parsed)
            .header("Authorization", authorization)
            .header("Content-Type", &content_type)
            .header("Content-Disposition", "inline")
            .body(body)
            .send()
            .await
            .map_err(MirrorError::UploadTransport)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(key = %key, status = status.as_u16(), "Upload rejected");
            return Err(MirrorError::UploadStatus {
                status: status.as_u16(),
                detail,
            });
        }

        tracing::info!(key = %key, content_type = %content_type, "Asset uploaded");
        Ok(key)
    }
}

/// Content fingerprint from a validator header: quoting stripped, segment
/// before the first `.`.
fn fingerprint_from_etag(etag: &str) -> String {
    let unquoted = etag.replace('"', "");
    unquoted
        .split('.')
        .next()
        .unwrap_or(unquoted.as_str())
        .to_string()
}
