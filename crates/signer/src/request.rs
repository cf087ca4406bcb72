//! Signable request description and the signing seam.

use crate::error::SignerResult;
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// A deterministic description of an HTTP request's signable components.
///
/// Header canonicalization (lowercasing, trimming, sorting) happens inside
/// the signers, so the map here may be populated in any order.
#[derive(Clone, Debug, Default)]
pub struct SignableRequest {
    /// HTTP method, any case.
    pub method: String,
    /// Request path, already in the form the server will see (e.g. "/").
    pub path: String,
    /// Raw query string without the leading `?`, or empty.
    pub query: String,
    /// Request headers as supplied by the caller.
    pub headers: BTreeMap<String, String>,
    /// Request body bytes; empty for bodyless requests.
    pub payload: Vec<u8>,
}

impl SignableRequest {
    /// Create a request description for the given method and path.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    /// Add a header, returning self for chaining.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the payload, returning self for chaining.
    pub fn payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Canonicalized header map: keys lowercased, values trimmed, sorted by
    /// key. When `recognized` is given, every other header is dropped.
    pub(crate) fn canonical_headers(&self, recognized: Option<&[&str]>) -> BTreeMap<String, String> {
        self.headers
            .iter()
            .map(|(key, value)| (key.to_ascii_lowercase(), value.trim().to_string()))
            .filter(|(key, _)| match recognized {
                Some(names) => names.contains(&key.as_str()),
                None => true,
            })
            .collect()
    }
}

/// Builds the authorization value for a described request.
///
/// Implemented by both signing strategies; callers pick the strategy, never
/// a shared parameterization of the two.
pub trait RequestSigner {
    /// Compute the authorization value for `request` as of the instant `at`.
    ///
    /// The value embeds a timestamp (and, for the object-storage scheme, an
    /// expiry window) and must be computed fresh per outbound request.
    fn authorization(&self, request: &SignableRequest, at: OffsetDateTime) -> SignerResult<String>;
}
