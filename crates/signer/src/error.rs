//! Signer error types.

use thiserror::Error;

/// Signing error type.
///
/// Every variant is detected locally, before any signature is computed and
/// before anything reaches the network.
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("missing credential material: {0}")]
    MissingCredential(String),

    #[error("malformed signing date (expected YYYY-MM-DD): {0}")]
    InvalidDate(String),

    #[error("invalid signature validity window: {0}")]
    InvalidWindow(String),
}

/// Result type alias for signing operations.
pub type SignerResult<T> = std::result::Result<T, SignerError>;
