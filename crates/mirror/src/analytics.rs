//! Analytics queries against the cloud provider's metrics API.

use crate::error::{AnalyticsError, AnalyticsResult};
use kagami_core::config::AnalyticsConfig;
use kagami_signer::{RequestSigner, SignableRequest, SignerResult, Tc3Signer};
use serde_json::{json, Value};
use time::{Duration, OffsetDateTime, UtcOffset};

/// Provider action for the top-URL listing.
pub const ACTION: &str = "ListTopData";

/// Provider API version.
pub const VERSION: &str = "2018-06-06";

/// Service identifier scoping the signing key chain.
const SERVICE: &str = "cdn";

/// Fixed listing dimension: rows are broken down by URL path.
const METRIC: &str = "url";

/// Trailing query window.
const WINDOW_DAYS: i64 = 30;

/// Metric kinds exposed to callers.
///
/// The first entry is the default for unrecognized selectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricKind {
    /// Request counts.
    Requests,
    /// Outbound traffic volume.
    Flow,
}

impl MetricKind {
    /// Map a caller-supplied selector onto a metric kind.
    pub fn from_selector(selector: &str) -> Self {
        match selector {
            "flow" => Self::Flow,
            _ => Self::Requests,
        }
    }

    /// Provider-side filter name for this kind.
    pub fn filter(self) -> &'static str {
        match self {
            Self::Requests => "request",
            Self::Flow => "flux",
        }
    }
}

/// Client for signed, read-only analytics queries.
pub struct AnalyticsClient {
    http: reqwest::Client,
    config: AnalyticsConfig,
    signer: Tc3Signer,
}

impl AnalyticsClient {
    /// Create a client over the given HTTP client and configuration.
    pub fn new(http: reqwest::Client, config: AnalyticsConfig) -> SignerResult<Self> {
        let signer = Tc3Signer::new(config.credentials.clone(), SERVICE)?;
        Ok(Self {
            http,
            config,
            signer,
        })
    }

    /// Query top-URL rows for a metric kind over the trailing 30 days.
    ///
    /// Returns the provider's pruned result rows: the per-row bookkeeping
    /// field is dropped and the root-path breakdown entry excluded.
    pub async fn top_urls(&self, kind: MetricKind) -> AnalyticsResult<Value> {
        let now = OffsetDateTime::now_utc();
        let payload = self.request_body(kind, now).to_string();

        let endpoint = self.config.endpoint_url();
        let host = host_of(&endpoint);
        let signable = SignableRequest::new("POST", "/")
            .header("Host", &host)
            .header("Content-Type", "application/json")
            .payload(payload.clone().into_bytes());
        let authorization = self.signer.authorization(&signable, now)?;

        let response = self
            .http
            .post(&endpoint)
            .header("Authorization", authorization)
            .header("Content-Type", "application/json")
            .header("X-Action", ACTION)
            .header("X-Timestamp", now.unix_timestamp().to_string())
            .header("X-Version", VERSION)
            .body(payload)
            .send()
            .await
            .map_err(AnalyticsError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Metrics query failed");
            return Err(AnalyticsError::Status {
                status: status.as_u16(),
            });
        }

        let mut envelope: Value = response.json().await.map_err(AnalyticsError::Transport)?;

        // A populated error envelope means failure even on HTTP 200.
        if let Some(error) = envelope.pointer("/Response/Error") {
            if !error.is_null() {
                let code = error
                    .get("Code")
                    .and_then(Value::as_str)
                    .unwrap_or("UnknownError")
                    .to_string();
                let message = error
                    .get("Message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                return Err(AnalyticsError::Provider { code, message });
            }
        }

        let mut data = envelope
            .pointer_mut("/Response/Data")
            .map(Value::take)
            .unwrap_or_else(|| json!([]));
        if data.is_null() {
            data = json!([]);
        }
        prune_rows(&mut data);
        Ok(data)
    }

    /// Fixed analytics payload with a 30-day trailing window.
    fn request_body(&self, kind: MetricKind, now: OffsetDateTime) -> Value {
        let start = now - Duration::days(WINDOW_DAYS);
        json!({
            "StartTime": format_timestamp(start),
            "EndTime": format_timestamp(now),
            "Metric": METRIC,
            "Filter": kind.filter(),
            "Domains": [self.config.domain],
        })
    }
}

/// Whole-second UTC timestamp, `YYYY-MM-DD HH:MM:SS`.
fn format_timestamp(at: OffsetDateTime) -> String {
    let at = at.to_offset(UtcOffset::UTC);
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        at.year(),
        u8::from(at.month()),
        at.day(),
        at.hour(),
        at.minute(),
        at.second()
    )
}

/// Host (with port, if any) of an endpoint URL, for the signed Host header.
fn host_of(endpoint: &str) -> String {
    match reqwest::Url::parse(endpoint) {
        Ok(url) => match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => endpoint.to_string(),
        },
        Err(_) => endpoint.to_string(),
    }
}

/// Drop the bookkeeping field from every row and exclude breakdown entries
/// keyed by the root path. Absent fields are left alone.
pub(crate) fn prune_rows(data: &mut Value) {
    let Some(rows) = data.as_array_mut() else {
        return;
    };
    for row in rows {
        let Some(object) = row.as_object_mut() else {
            continue;
        };
        object.remove("Resource");
        if let Some(detail) = object.get_mut("DetailData").and_then(Value::as_array_mut) {
            detail.retain(|entry| entry.get("Name").and_then(Value::as_str) != Some("/"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kagami_core::Credentials;

    fn client() -> AnalyticsClient {
        let config = AnalyticsConfig {
            host: "cdn.tencentcloudapi.com".to_string(),
            endpoint: None,
            domain: "static.example.com".to_string(),
            credentials: Credentials::new("AKIDtest", "testsecret"),
        };
        AnalyticsClient::new(reqwest::Client::new(), config).unwrap()
    }

    #[test]
    fn test_selector_mapping() {
        assert_eq!(MetricKind::from_selector("flow"), MetricKind::Flow);
        assert_eq!(MetricKind::from_selector("requests"), MetricKind::Requests);
        // Unrecognized selectors fall back to the first entry.
        assert_eq!(MetricKind::from_selector("bogus"), MetricKind::Requests);
        assert_eq!(MetricKind::from_selector(""), MetricKind::Requests);
    }

    #[test]
    fn test_filter_names() {
        assert_eq!(MetricKind::Flow.filter(), "flux");
        assert_eq!(MetricKind::Requests.filter(), "request");
    }

    #[test]
    fn test_request_body_window() {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let body = client().request_body(MetricKind::Flow, now);

        assert_eq!(body["EndTime"], "2023-11-14 22:13:20");
        assert_eq!(body["StartTime"], "2023-10-15 22:13:20");
        assert_eq!(body["Metric"], "url");
        assert_eq!(body["Filter"], "flux");
        assert_eq!(body["Domains"][0], "static.example.com");
    }

    #[test]
    fn test_timestamp_has_no_fractional_component() {
        let at = OffsetDateTime::from_unix_timestamp_nanos(1_700_000_000_123_456_789).unwrap();
        assert_eq!(format_timestamp(at), "2023-11-14 22:13:20");
    }

    #[test]
    fn test_prune_rows_strips_bookkeeping_and_root_entry() {
        let mut data = json!([
            {
                "Resource": "static.example.com",
                "DetailData": [
                    {"Name": "/", "Value": 10.0},
                    {"Name": "/jquery/3.6.0/jquery.min.js", "Value": 7.0}
                ]
            }
        ]);
        prune_rows(&mut data);

        let row = &data[0];
        assert!(row.get("Resource").is_none());
        let detail = row["DetailData"].as_array().unwrap();
        assert_eq!(detail.len(), 1);
        assert_eq!(detail[0]["Name"], "/jquery/3.6.0/jquery.min.js");
    }

    #[test]
    fn test_prune_rows_tolerates_absent_fields() {
        let mut missing_detail = json!([{"Resource": "x"}]);
        prune_rows(&mut missing_detail);
        assert!(missing_detail[0].get("Resource").is_none());

        let mut not_an_array = json!({"unexpected": true});
        prune_rows(&mut not_an_array);
        assert_eq!(not_an_array, json!({"unexpected": true}));
    }
}
