//! Application state shared across handlers.

use kagami_core::config::AppConfig;
use kagami_mirror::{AnalyticsClient, Synchronizer};
use kagami_signer::SignerResult;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Mirror synchronizer.
    pub synchronizer: Arc<Synchronizer>,
    /// Analytics client.
    pub analytics: Arc<AnalyticsClient>,
}

impl AppState {
    /// Create application state from configuration and a shared HTTP client.
    ///
    /// Fails when credential material is missing, so a misconfigured server
    /// never starts accepting requests.
    pub fn new(config: AppConfig, http: reqwest::Client) -> SignerResult<Self> {
        let synchronizer =
            Synchronizer::new(http.clone(), config.cdn.clone(), config.storage.clone())?;
        let analytics = AnalyticsClient::new(http, config.analytics.clone())?;

        Ok(Self {
            config: Arc::new(config),
            synchronizer: Arc::new(synchronizer),
            analytics: Arc::new(analytics),
        })
    }
}
