//! Mirror and analytics error types.

use thiserror::Error;

/// Synchronization errors, tagged by the pipeline stage that failed.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("invalid asset coordinate: {0}")]
    Coordinate(#[from] kagami_core::Error),

    #[error("invalid upstream URL: {0}")]
    Url(String),

    #[error("source fetch returned status {status}")]
    FetchStatus { status: u16 },

    #[error("source fetch failed: {0}")]
    FetchTransport(#[source] reqwest::Error),

    #[error("upload returned status {status}: {detail}")]
    UploadStatus { status: u16, detail: String },

    #[error("upload failed: {0}")]
    UploadTransport(#[source] reqwest::Error),

    #[error("signing failed: {0}")]
    Signer(#[from] kagami_signer::SignerError),
}

impl MirrorError {
    /// The pipeline stage this failure belongs to.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Coordinate(_) | Self::Url(_) => "input",
            Self::FetchStatus { .. } | Self::FetchTransport(_) => "fetch",
            Self::UploadStatus { .. } | Self::UploadTransport(_) => "upload",
            Self::Signer(_) => "sign",
        }
    }
}

/// Result type alias for synchronization operations.
pub type MirrorResult<T> = std::result::Result<T, MirrorError>;

/// Analytics query errors.
///
/// A provider error envelope inside an HTTP success is a first-class
/// failure, never a success.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("metrics API returned status {status}")]
    Status { status: u16 },

    #[error("metrics request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("provider error {code}: {message}")]
    Provider { code: String, message: String },

    #[error("signing failed: {0}")]
    Signer(#[from] kagami_signer::SignerError),
}

/// Result type alias for analytics operations.
pub type AnalyticsResult<T> = std::result::Result<T, AnalyticsError>;
