//! CDN-to-object-storage synchronization and analytics queries.
//!
//! This crate provides:
//! - The mirror synchronizer (existence probe, source fetch, signed upload)
//! - The analytics client (signed metrics queries with response pruning)
//!
//! Both talk plain HTTP through `reqwest` and take explicit configuration;
//! nothing here reads ambient process state.

pub mod analytics;
pub mod error;
pub mod sync;

pub use analytics::{AnalyticsClient, MetricKind};
pub use error::{AnalyticsError, AnalyticsResult, MirrorError, MirrorResult};
pub use sync::{SyncOutcome, Synchronizer};
