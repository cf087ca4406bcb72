//! Core domain types and shared logic for the Kagami asset mirror.
//!
//! This crate defines the canonical data model used across all other crates:
//! - Asset coordinates (library name, version, file key)
//! - Media-type inference for uploaded assets
//! - Configuration types and credential handling

pub mod config;
pub mod coordinate;
pub mod error;
pub mod media;

pub use config::{AnalyticsConfig, AppConfig, CdnConfig, Credentials, ServerConfig, StorageConfig};
pub use coordinate::AssetCoordinate;
pub use error::{Error, Result};
pub use media::content_type_for_key;

/// Default validity window for storage request signatures, in seconds.
pub const DEFAULT_SIGN_WINDOW_SECS: i64 = 600;
