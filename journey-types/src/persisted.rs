//! Rows written to the durable cache and progress store.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stats::YearlyStats;

/// One of the three resource crawls, in fixed execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// The user's own works: listing, then one detail page per work.
    Works,
    /// Received-comment notifications, newest first.
    Inbox,
    /// Reading history, newest first.
    History,
}

impl Stage {
    /// All stages in execution order.
    pub const ORDER: [Self; 3] = [Self::Works, Self::Inbox, Self::History];

    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Works => "works",
            Self::Inbox => "inbox",
            Self::History => "history",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Works-stage resume state: the discovered url list and how far detail
/// fetching got.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorksResume {
    /// Every work url discovered by the listing phase, in visit order.
    pub work_urls: Vec<String>,
    /// Index of the last work whose detail page was fully processed.
    pub work_index: Option<usize>,
}

impl WorksResume {
    /// Index of the first work still to be visited.
    #[must_use]
    pub fn next_index(&self) -> usize {
        self.work_index.map_or(0, |i| i + 1)
    }
}

/// A completed scan's statistics, durable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheRecord {
    /// Schema version the row was written with.
    pub version: u32,
    /// Identity the statistics belong to.
    pub identity: String,
    /// Write time.
    pub saved_at: DateTime<Utc>,
    /// The finished statistics.
    pub data: YearlyStats,
}

/// Checkpoint of an in-flight scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanProgress {
    /// Schema version the row was written with.
    pub version: u32,
    /// Identity the scan runs for.
    pub identity: String,
    /// Write time.
    pub saved_at: DateTime<Utc>,
    /// Stage that was running when the checkpoint was taken.
    pub stage: Stage,
    /// Last fully processed page (works stage: number of works processed).
    pub last_page: u32,
    /// Page bound of the checkpointed stage (reported page count after the
    /// page cap), when the stage is paginated.
    #[serde(default)]
    pub total_pages: Option<u32>,
    /// Year filter of the interrupted scan; `None` for a full scan.
    #[serde(default)]
    pub target_year: Option<i32>,
    /// Accumulator snapshot including every earlier stage's results.
    pub data: YearlyStats,
    /// Works-stage resume state.
    #[serde(default)]
    pub extra: Option<WorksResume>,
}

/// Which years a new scan must crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YearsToScan {
    /// No usable cache: crawl the full history.
    All,
    /// Crawl only these years.
    Only(Vec<i32>),
}

/// Outcome of comparing the cache with the current calendar year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanScope {
    /// Cached records for years strictly before the current year.
    pub cached: Option<YearlyStats>,
    /// Years that can be reused from the cache, ascending.
    pub cached_years: Vec<i32>,
    /// Years that must be crawled.
    pub years_to_scan: YearsToScan,
}

impl ScanScope {
    /// Scope for a scan with no usable cache.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            cached: None,
            cached_years: Vec::new(),
            years_to_scan: YearsToScan::All,
        }
    }
}
