//! Configuration shared by the orchestrator and its stage processors.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Current schema version stamped into every cache and progress row.
///
/// Bump on any change to the persisted shape; rows carrying another version are
/// discarded wholesale, never migrated.
pub const SCHEMA_VERSION: u32 = 4;

/// Global configuration for the `Journey` orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JourneyConfig {
    /// Fixed pause between consecutive requests to the remote site.
    pub request_delay: Duration,
    /// Persist a checkpoint every N pages (or every N works in the works stage).
    pub save_interval: u32,
    /// Hard page cap for the inbox crawl.
    pub max_inbox_pages: u32,
    /// Optional hard page cap for the reading-history crawl.
    pub max_history_pages: Option<u32>,
    /// Optional hard page cap for the works listing.
    pub max_works_pages: Option<u32>,
    /// Saved progress older than this is discarded instead of resumed.
    pub progress_max_age: Duration,
    /// Serialized cache/progress rows larger than this are not written.
    pub max_persisted_bytes: usize,
    /// Schema version written to and expected from persisted rows.
    pub schema_version: u32,
}

impl Default for JourneyConfig {
    fn default() -> Self {
        Self {
            request_delay: Duration::from_millis(1300),
            save_interval: 5,
            max_inbox_pages: 100,
            max_history_pages: None,
            max_works_pages: None,
            progress_max_age: Duration::from_secs(24 * 60 * 60),
            max_persisted_bytes: 4 * 1024 * 1024,
            schema_version: SCHEMA_VERSION,
        }
    }
}
