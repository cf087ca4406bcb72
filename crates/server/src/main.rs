//! Kagami server binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use kagami_core::config::AppConfig;
use kagami_server::{AppState, create_router};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Kagami - a CDN asset mirror with an analytics proxy
#[derive(Parser, Debug)]
#[command(name = "kagamid")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "KAGAMI_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Startup banner
    tracing::info!("Kagami v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration (file is optional, env vars can provide/override everything)
    let config_path = std::path::Path::new(&args.config);
    let mut figment = Figment::new();
    let has_config_file = config_path.exists();

    if has_config_file {
        tracing::info!(config_path = %args.config, "Loading configuration from file");
        figment = figment.merge(Toml::file(&args.config));
    } else {
        tracing::debug!("No config file found at {}", args.config);
    }

    // Check for KAGAMI_ environment variables (excluding KAGAMI_CONFIG which is just the path)
    let has_env_config =
        std::env::vars().any(|(key, _)| key.starts_with("KAGAMI_") && key != "KAGAMI_CONFIG");

    if !has_config_file && !has_env_config {
        anyhow::bail!(
            "No configuration provided.\n\n\
             Provide configuration via one of:\n  \
             1. Config file: kagamid --config /path/to/config.toml\n  \
             2. Environment variables: KAGAMI_SERVER__BIND=0.0.0.0:8080 \
             KAGAMI_STORAGE__BUCKET=assets-1250000000 kagamid\n\n\
             See config/server.example.toml for example configuration.\n\
             Set KAGAMI_CONFIG env var to specify a default config file path."
        );
    }

    if !has_config_file {
        tracing::info!("Using environment variables for configuration");
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("KAGAMI_").split("__"))
        .extract()
        .context("failed to load configuration")?;

    // Register Prometheus metrics
    kagami_server::metrics::register_metrics();
    tracing::info!("Prometheus metrics registered");

    // Initialize the mirror core. Credentials are validated here, before
    // the server accepts any request.
    let http = reqwest::Client::new();
    let state =
        AppState::new(config.clone(), http).context("failed to initialize mirror clients")?;
    tracing::info!(
        cdn = %state.config.cdn.base_url,
        bucket = %state.config.storage.bucket,
        "Mirror clients initialized"
    );

    // Create router
    let app = create_router(state);

    // Parse bind address
    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
