//! Journey crawls a user's own activity on a paginated archive site into
//! per-calendar-year statistics.
//!
//! Overview
//! - Walks three resources in a fixed order: the user's works (listing, then
//!   one detail page per work), the received-comment inbox and the reading
//!   history. Requests are strictly sequential with a fixed delay between them.
//! - Attributes each work's lifetime words, kudos, comments and hits to the
//!   calendar years between its publish and last-update dates, weighted by
//!   the number of days in each year.
//! - Checkpoints the accumulator every few pages so an interrupted scan can
//!   resume where it stopped.
//! - Caches completed scans per identity; later scans reuse every past year
//!   and only crawl the current one.
//!
//! Key behaviors and trade-offs
//! - Incremental scans stop paging newest-first resources as soon as a page
//!   holds entries older than the target year. Fewer requests, but activity
//!   backdated into the current year behind older entries is missed.
//! - Per-year shares are rounded independently and not renormalized, so the
//!   yearly sum of a metric may differ from its lifetime total by a fraction
//!   of a unit per year spanned.
//! - Cache and progress rows are last-writer-wins. The in-flight guard only
//!   protects a single `Journey`; separate processes sharing a backend are
//!   not coordinated.
//! - A failed stage keeps what was accumulated, leaves its checkpoint in
//!   place and never writes the cache.
//!
//! Examples
//! ```rust,ignore
//! use std::sync::Arc;
//! use journey::{FileBackend, Journey, ProgressUpdate, ResumePolicy};
//!
//! let journey = Journey::builder()
//!     .site(Arc::new(MySite::connect()?))
//!     .state_backend(Arc::new(FileBackend::new("./journey-state")))
//!     .resume_policy(ResumePolicy::ask(|p| p.stage != journey::Stage::Works))
//!     .on_progress(|u: &ProgressUpdate| eprintln!("[{:?}%] {}", u.percent, u.detail))
//!     .build()?;
//!
//! let report = journey.start_scan(false).await;
//! for year in report.stats.years_desc() {
//!     let record = report.stats.get(year).unwrap();
//!     println!("{year}: {} words written", record.creator.words);
//! }
//! ```
//!
//! See `journey/examples/` for runnable end-to-end demonstrations.
#![warn(missing_docs)]

pub(crate) mod core;
mod scan;
mod state;

pub use core::{Journey, JourneyBuilder, ProgressSink, ResumePolicy};
pub use scan::ScanPhase;
pub use state::ScanStateStore;

// Re-export the seams and data model for convenience
pub use journey_core::{
    // Site seam
    ActivitySite,
    // Strategies
    AuthorFilter,
    AuthorStats,
    CacheRecord,
    Clock,
    CreatorStats,
    FileBackend,
    FixedClock,
    InboxEntry,
    InboxPage,
    InboxProvider,
    JourneyConfig,
    JourneyError,
    MemoryBackend,
    Paginated,
    ProgressUpdate,
    ReaderStats,
    ReadingEntry,
    ReadingsPage,
    ReadingsProvider,
    RelativeTimeResolver,
    SCHEMA_VERSION,
    ScanMode,
    ScanOutcome,
    ScanProgress,
    ScanReport,
    ScanScope,
    Stage,
    StateBackend,
    SystemClock,
    Tally,
    TimeResolver,
    TopWork,
    UiLabelFilter,
    WorkActivityRecord,
    WorkBlurb,
    WorkVisit,
    WorksListPage,
    WorksProvider,
    WorksResume,
    YearRecord,
    YearlyStats,
    YearsToScan,
};
