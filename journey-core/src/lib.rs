//! journey-core
//!
//! Seams and pure algorithms shared by the journey orchestrator.
//!
//! - `site`: the `ActivitySite` trait and its capability role traits, plus the
//!   parsed page types a site hands back.
//! - `attribution`: day-weighted distribution of a work's lifetime metrics
//!   across the calendar years it was active in.
//! - `dedup`: per-run set of already-processed work urls.
//! - `timeparse`: calendar date parsing and the pluggable relative-time resolver.
//! - `labels`: author-name filtering and archive-warning detection.
//! - `clock`: injectable wall clock.
//! - `backend`: key/value persistence backends for cache and progress rows.
//!
//! Async runtime (Tokio)
//! ---------------------
//! `backend::MemoryBackend` guards its map with `tokio::sync::Mutex` and
//! `backend::FileBackend` performs I/O through `tokio::fs`, so both must be
//! driven from a Tokio 1.x runtime.
#![warn(missing_docs)]

/// Day-weighted attribution of lifetime metrics to calendar years.
pub mod attribution;
/// Persistence backends for cache and progress rows.
pub mod backend;
/// Wall-clock abstraction.
pub mod clock;
/// Per-run deduplication of processed urls.
pub mod dedup;
/// Author-label filtering and tag classification.
pub mod labels;
pub mod site;
/// Date parsing and relative-time resolution.
pub mod timeparse;

pub use attribution::{Allocation, WorkMetrics, attribute, days_per_year};
pub use backend::{FileBackend, MemoryBackend, StateBackend};
pub use clock::{Clock, FixedClock, SystemClock};
pub use dedup::DedupGuard;
pub use labels::{
    ARCHIVE_WARNINGS, AuthorFilter, UI_LABELS, UiLabelFilter, is_archive_warning,
    is_mature_rating,
};
pub use site::{
    ActivitySite, InboxEntry, InboxPage, InboxProvider, Paginated, ReadingEntry, ReadingsPage,
    ReadingsProvider, WorkActivityRecord, WorkBlurb, WorksListPage, WorksProvider,
};
pub use timeparse::{RelativeTimeResolver, TimeResolver, extract_year, parse_calendar_date};

pub use journey_types::*;
