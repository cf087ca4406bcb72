//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw credential pair for a cloud provider account.
///
/// Opaque to everything except the signers. The secret never appears in
/// Debug output, logs, or error messages.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Public key identifier (access key id).
    pub id: String,
    /// Secret key material.
    pub secret: String,
}

impl Credentials {
    /// Create a credential pair.
    pub fn new(id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Enable the /metrics endpoint for Prometheus scraping (default: true).
    /// SECURITY: When enabled, ensure this endpoint is network-restricted
    /// to authorized Prometheus scraper IPs only at the infrastructure level.
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            metrics_enabled: default_metrics_enabled(),
        }
    }
}

/// Source CDN configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CdnConfig {
    /// Base URL of the upstream CDN.
    #[serde(default = "default_cdn_base_url")]
    pub base_url: String,
}

fn default_cdn_base_url() -> String {
    "https://cdnjs.cloudflare.com".to_string()
}

impl Default for CdnConfig {
    fn default() -> Self {
        Self {
            base_url: default_cdn_base_url(),
        }
    }
}

/// Destination object-storage configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Bucket name, including the numeric appid suffix the provider expects.
    pub bucket: String,
    /// Bucket region (e.g., "ap-shanghai").
    pub region: String,
    /// Optional full upload endpoint override (for local test servers).
    /// When unset, the endpoint is derived from bucket and region.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Public base URL (custom domain) used by the existence probe.
    pub public_base_url: String,
    /// Optional folder prefix under the public domain.
    #[serde(default)]
    pub folder: Option<String>,
    /// Credential pair for the storage API.
    pub credentials: Credentials,
    /// Validity window for upload signatures, in seconds.
    #[serde(default = "default_sign_window_secs")]
    pub sign_window_secs: i64,
}

fn default_sign_window_secs() -> i64 {
    crate::DEFAULT_SIGN_WINDOW_SECS
}

impl StorageConfig {
    /// Base URL uploads are issued against.
    pub fn upload_base_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://{}.cos.{}.myqcloud.com", self.bucket, self.region),
        }
    }
}

/// Analytics (metrics API) configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Metrics API host.
    #[serde(default = "default_analytics_host")]
    pub host: String,
    /// Optional full endpoint override (for local test servers).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// The mirror's public domain, used as the query filter.
    pub domain: String,
    /// Credential pair for the metrics API.
    pub credentials: Credentials,
}

fn default_analytics_host() -> String {
    "cdn.tencentcloudapi.com".to_string()
}

impl AnalyticsConfig {
    /// URL analytics queries are posted to.
    pub fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://{}", self.host),
        }
    }
}

/// Top-level application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cdn: CdnConfig,
    pub storage: StorageConfig,
    pub analytics: AnalyticsConfig,
}

impl AppConfig {
    /// Create a test configuration with dummy credentials.
    ///
    /// **For testing only.** Upstream endpoints point at example hosts and
    /// are expected to be overridden with local mock servers.
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig::default(),
            cdn: CdnConfig::default(),
            storage: StorageConfig {
                bucket: "assets-1250000000".to_string(),
                region: "ap-shanghai".to_string(),
                endpoint: None,
                public_base_url: "https://static.example.com".to_string(),
                folder: None,
                credentials: Credentials::new("AKIDtest", "testsecret"),
                sign_window_secs: default_sign_window_secs(),
            },
            analytics: AnalyticsConfig {
                host: default_analytics_host(),
                endpoint: None,
                domain: "static.example.com".to_string(),
                credentials: Credentials::new("AKIDtest", "testsecret"),
            },
        }
    }
}
