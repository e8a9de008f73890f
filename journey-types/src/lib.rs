//! Journey data model: per-year statistics, persisted scan records,
//! configuration primitives and the workspace error type.
#![warn(missing_docs)]

mod config;
mod error;
mod persisted;
mod report;
mod stats;
mod tally;

pub use config::{JourneyConfig, SCHEMA_VERSION};
pub use error::JourneyError;
pub use persisted::{CacheRecord, ScanProgress, ScanScope, Stage, WorksResume, YearsToScan};
pub use report::{ProgressUpdate, ScanMode, ScanOutcome, ScanReport};
pub use stats::{
    AuthorStats, CreatorStats, ReaderStats, TopWork, WorkVisit, YearRecord, YearlyStats,
    clean_relationship_tag,
};
pub use tally::Tally;
