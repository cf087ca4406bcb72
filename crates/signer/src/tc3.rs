//! Cloud-API request signing (TC3-style HMAC-SHA256 chain).

use crate::digest::{hmac_sha256, hmac_sha256_hex, sha256_hex};
use crate::error::{SignerError, SignerResult};
use crate::request::{RequestSigner, SignableRequest};
use kagami_core::Credentials;
use time::{OffsetDateTime, UtcOffset};

/// Algorithm identifier embedded in every authorization value.
pub const ALGORITHM: &str = "TC3-HMAC-SHA256";

/// Fixed credential-scope suffix. A protocol constant the server recomputes
/// independently, not a parameter.
const SCOPE_SUFFIX: &str = "tc3_request";

/// Signer for the cloud provider's general API.
///
/// Derives a date-scoped signing key through a three-step HMAC chain and
/// emits an `Authorization` header value.
pub struct Tc3Signer {
    credentials: Credentials,
    service: String,
}

impl Tc3Signer {
    /// Create a signer for the given service (e.g. "cdn").
    ///
    /// Fails if either half of the credential pair is empty, so that a
    /// misconfiguration is caught before any signature is computed.
    pub fn new(credentials: Credentials, service: impl Into<String>) -> SignerResult<Self> {
        if credentials.id.trim().is_empty() || credentials.secret.trim().is_empty() {
            return Err(SignerError::MissingCredential(
                "cloud API credential pair".to_string(),
            ));
        }
        Ok(Self {
            credentials,
            service: service.into(),
        })
    }

    /// Byte-exact canonical serialization of a request's signable components.
    ///
    /// The canonical-headers block ends with a blank line before the signed
    /// header list; that extra newline is part of the protocol.
    pub fn canonical_request(request: &SignableRequest) -> String {
        let headers = request.canonical_headers(None);
        let canonical_headers: String = headers
            .iter()
            .map(|(key, value)| format!("{key}:{value}\n"))
            .collect();
        let signed_headers = headers.keys().cloned().collect::<Vec<_>>().join(";");

        format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            request.method.to_uppercase(),
            request.path,
            request.query,
            canonical_headers,
            signed_headers,
            sha256_hex(&request.payload)
        )
    }

    /// String-to-sign for a request at the given instant.
    ///
    /// Returns the UTC date alongside it; the same date scopes the signing
    /// key in [`Tc3Signer::signature`].
    pub fn string_to_sign(
        &self,
        request: &SignableRequest,
        at: OffsetDateTime,
    ) -> (String, String) {
        let at = at.to_offset(UtcOffset::UTC);
        let date = format!(
            "{:04}-{:02}-{:02}",
            at.year(),
            u8::from(at.month()),
            at.day()
        );
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            at.unix_timestamp(),
            self.credential_scope(&date),
            sha256_hex(Self::canonical_request(request).as_bytes())
        );
        (date, string_to_sign)
    }

    /// Sign a precomputed string-to-sign with the date-scoped key chain.
    ///
    /// The chain is fixed and not reorderable:
    /// `kDate = HMAC("TC3" + secret, date)`, `kService = HMAC(kDate, service)`,
    /// `kSigning = HMAC(kService, "tc3_request")`.
    pub fn signature(&self, date: &str, string_to_sign: &str) -> SignerResult<String> {
        validate_date(date)?;

        let seeded = format!("TC3{}", self.credentials.secret);
        let k_date = hmac_sha256(seeded.as_bytes(), date.as_bytes());
        let k_service = hmac_sha256(&k_date, self.service.as_bytes());
        let k_signing = hmac_sha256(&k_service, SCOPE_SUFFIX.as_bytes());
        Ok(hmac_sha256_hex(&k_signing, string_to_sign.as_bytes()))
    }

    fn credential_scope(&self, date: &str) -> String {
        format!("{}/{}/{}", date, self.service, SCOPE_SUFFIX)
    }
}

impl RequestSigner for Tc3Signer {
    fn authorization(&self, request: &SignableRequest, at: OffsetDateTime) -> SignerResult<String> {
        let headers = request.canonical_headers(None);
        let signed_headers = headers.keys().cloned().collect::<Vec<_>>().join(";");

        let (date, string_to_sign) = self.string_to_sign(request, at);
        let signature = self.signature(&date, &string_to_sign)?;

        Ok(format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM,
            self.credentials.id,
            self.credential_scope(&date),
            signed_headers,
            signature
        ))
    }
}

/// Reject anything that is not a `YYYY-MM-DD` date.
fn validate_date(date: &str) -> SignerResult<()> {
    let bytes = date.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| matches!(i, 4 | 7) || b.is_ascii_digit());
    if well_formed {
        Ok(())
    } else {
        Err(SignerError::InvalidDate(date.to_string()))
    }
}
