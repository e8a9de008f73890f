use serde::{Deserialize, Serialize};

use crate::error::JourneyError;
use crate::persisted::Stage;
use crate::stats::YearlyStats;

/// How a scan decided what to crawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ScanMode {
    /// Full history crawl; no cache was used.
    Full,
    /// Past years came from the cache; only `target_year` was crawled.
    Incremental {
        /// The single year crawled.
        target_year: i32,
    },
    /// Continued an interrupted scan from its checkpoint.
    Resumed {
        /// Stage the scan resumed in.
        stage: Stage,
        /// First page (or work index) visited after resuming.
        from_page: u32,
        /// Year filter restored from the checkpoint.
        target_year: Option<i32>,
    },
}

/// Terminal outcome of `Journey::start_scan`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ScanOutcome {
    /// Every stage finished; the store was handed to the cache.
    Completed {
        /// How the scan was scoped.
        mode: ScanMode,
        /// Whether the cache write succeeded (false when refused or failed).
        cache_written: bool,
    },
    /// No identity could be resolved; nothing was crawled.
    NotAuthenticated,
    /// Another scan was already running on this orchestrator.
    AlreadyRunning,
    /// A stage failed; the report carries whatever was accumulated so far.
    Failed {
        /// Stage that failed, if the failure happened inside one.
        stage: Option<Stage>,
        /// The error that aborted the scan.
        error: JourneyError,
    },
}

impl ScanOutcome {
    /// True for `Completed`.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// What a scan produced: the accumulated statistics and how it ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    /// Identity the scan ran for, when one was resolved.
    pub identity: Option<String>,
    /// Accumulated statistics (partial when the scan failed).
    pub stats: YearlyStats,
    /// Terminal outcome.
    pub outcome: ScanOutcome,
    /// Years reused verbatim from the cache.
    pub cached_years: Vec<i32>,
    /// Stages skipped because the site lacks the capability.
    pub skipped_stages: Vec<Stage>,
}

impl ScanReport {
    pub(crate) const fn empty(outcome: ScanOutcome) -> Self {
        Self {
            identity: None,
            stats: YearlyStats::new(),
            outcome,
            cached_years: Vec::new(),
            skipped_stages: Vec::new(),
        }
    }

    /// Report for a call rejected because a scan is already running.
    #[must_use]
    pub const fn already_running() -> Self {
        Self::empty(ScanOutcome::AlreadyRunning)
    }

    /// Report for a scan that could not resolve an identity.
    #[must_use]
    pub const fn not_authenticated() -> Self {
        Self::empty(ScanOutcome::NotAuthenticated)
    }
}

/// Status side-channel emitted throughout a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Short headline ("Scanning your inbox...").
    pub status: String,
    /// Detail line ("Fetching page 3 of 12").
    pub detail: String,
    /// Completion estimate in percent, when known.
    pub percent: Option<u8>,
}

impl ProgressUpdate {
    /// Build an update.
    pub fn new(status: impl Into<String>, detail: impl Into<String>, percent: Option<u8>) -> Self {
        Self {
            status: status.into(),
            detail: detail.into(),
            percent,
        }
    }
}
