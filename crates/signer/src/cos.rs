//! Object-storage request signing (COS-style time-windowed HMAC-SHA1).

use crate::digest::{hmac_sha1_hex, sha1_hex};
use crate::error::{SignerError, SignerResult};
use crate::request::{RequestSigner, SignableRequest};
use kagami_core::Credentials;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use time::OffsetDateTime;

/// Algorithm identifier embedded in every authorization value.
pub const ALGORITHM: &str = "sha1";

/// The only header names that participate in signing. Everything else is
/// silently dropped: the server verifies exactly this minimal surface, and
/// signing an unexpected header set breaks its verification.
const SIGNED_HEADERS: &[&str] = &["content-type", "host"];

/// RFC 3986 unreserved characters stay as-is; everything else is escaped.
const VALUE_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Signer for the object-storage PUT/HEAD API.
///
/// Derives a signing key scoped to a validity window through a two-step
/// HMAC-SHA1 chain and emits a query-string-style authorization value.
pub struct CosSigner {
    credentials: Credentials,
    window_secs: i64,
}

impl CosSigner {
    /// Create a signer whose signatures are valid for `window_secs` seconds.
    pub fn new(credentials: Credentials, window_secs: i64) -> SignerResult<Self> {
        if credentials.id.trim().is_empty() || credentials.secret.trim().is_empty() {
            return Err(SignerError::MissingCredential(
                "object storage credential pair".to_string(),
            ));
        }
        if window_secs <= 0 {
            return Err(SignerError::InvalidWindow(format!(
                "window must be positive, got {window_secs}"
            )));
        }
        Ok(Self {
            credentials,
            window_secs,
        })
    }

    /// Create a signer with the default validity window.
    pub fn with_default_window(credentials: Credentials) -> SignerResult<Self> {
        Self::new(credentials, kagami_core::DEFAULT_SIGN_WINDOW_SECS)
    }
}

impl RequestSigner for CosSigner {
    fn authorization(&self, request: &SignableRequest, at: OffsetDateTime) -> SignerResult<String> {
        let start = at.unix_timestamp();
        let sign_time = format!("{};{}", start, start + self.window_secs);
        let sign_key = hmac_sha1_hex(
            self.credentials.secret.as_bytes(),
            sign_time.as_bytes(),
        );

        let headers = request.canonical_headers(Some(SIGNED_HEADERS));
        let header_pairs = headers
            .iter()
            .map(|(key, value)| format!("{key}={}", utf8_percent_encode(value, VALUE_ENCODE)))
            .collect::<Vec<_>>()
            .join("&");
        let header_list = headers.keys().cloned().collect::<Vec<_>>().join(";");

        // The query-string segment stays empty: upload and probe requests
        // carry no query parameters.
        let http_string = format!(
            "{}\n{}\n\n{}\n",
            request.method.to_lowercase(),
            request.path,
            header_pairs
        );
        let string_to_sign = format!(
            "{}\n{}\n{}\n",
            ALGORITHM,
            sign_time,
            sha1_hex(http_string.as_bytes())
        );
        let signature = hmac_sha1_hex(sign_key.as_bytes(), string_to_sign.as_bytes());

        Ok(format!(
            "q-sign-algorithm={}&q-ak={}&q-sign-time={}&q-key-time={}&q-header-list={}&q-url-param-list=&q-signature={}",
            ALGORITHM, self.credentials.id, sign_time, sign_time, header_list, signature
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2023-11-14T22:13:20Z
    const NOW: i64 = 1_700_000_000;

    fn signer() -> CosSigner {
        CosSigner::new(Credentials::new("AKIDtest", "testsecret"), 600).unwrap()
    }

    fn at() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(NOW).unwrap()
    }

    fn request() -> SignableRequest {
        SignableRequest::new("PUT", "/jquery/3.6.0/jquery.min.js")
            .header("Host", "assets-1250000000.cos.ap-shanghai.myqcloud.com")
            .header("Content-Type", "application/javascript; charset=utf-8")
    }

    #[test]
    fn test_authorization_layout() {
        let authorization = signer().authorization(&request(), at()).unwrap();
        assert!(authorization.starts_with(
            "q-sign-algorithm=sha1&q-ak=AKIDtest\
             &q-sign-time=1700000000;1700000600\
             &q-key-time=1700000000;1700000600\
             &q-header-list=content-type;host\
             &q-url-param-list=&q-signature="
        ));
        let signature = authorization.rsplit('=').next().unwrap();
        assert_eq!(signature.len(), 40);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_authorization_is_reproducible() {
        let a = signer().authorization(&request(), at()).unwrap();
        let b = signer().authorization(&request(), at()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unsigned_header_does_not_affect_signature() {
        let plain = signer().authorization(&request(), at()).unwrap();
        let with_extras = signer()
            .authorization(
                &request()
                    .header("Content-Disposition", "inline")
                    .header("X-Custom", "anything"),
                at(),
            )
            .unwrap();
        assert_eq!(plain, with_extras);
    }

    #[test]
    fn test_signed_header_change_changes_signature() {
        let a = signer().authorization(&request(), at()).unwrap();
        let b = signer()
            .authorization(&request().header("Content-Type", "text/css"), at())
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_sign_time_changes_signature() {
        let a = signer().authorization(&request(), at()).unwrap();
        let later = OffsetDateTime::from_unix_timestamp(NOW + 1).unwrap();
        let b = signer().authorization(&request(), later).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_no_recognized_headers_yields_empty_list() {
        let bare = SignableRequest::new("HEAD", "/probe").header("X-Unknown", "1");
        let authorization = signer().authorization(&bare, at()).unwrap();
        assert!(authorization.contains("&q-header-list=&"));
    }

    #[test]
    fn test_default_window() {
        let signer =
            CosSigner::with_default_window(Credentials::new("AKIDtest", "testsecret")).unwrap();
        let authorization = signer.authorization(&request(), at()).unwrap();
        assert!(authorization.contains("q-sign-time=1700000000;1700000600"));
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert!(CosSigner::new(Credentials::new("", "s"), 600).is_err());
        assert!(CosSigner::new(Credentials::new("id", ""), 600).is_err());
        assert!(CosSigner::new(Credentials::new("id", "s"), 0).is_err());
    }
}
