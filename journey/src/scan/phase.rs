use core::fmt;

use journey_core::Stage;

/// Where a scan currently is.
///
/// Phases advance strictly forward through
/// `Preparing → ResumeCheck → Works → Inbox → History → Finalizing` (phases
/// may be skipped, never revisited), return to `Idle` when the scan ends, and
/// fall into `Failed` from any in-flight phase on an unrecovered error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanPhase {
    /// No scan in flight.
    Idle,
    /// Resolving the caller's identity.
    Preparing,
    /// Deciding between a checkpoint, the cache and a full crawl.
    ResumeCheck,
    /// Crawling the user's works.
    Works,
    /// Crawling the inbox.
    Inbox,
    /// Crawling reading history.
    History,
    /// Writing the cache and clearing the checkpoint.
    Finalizing,
    /// The last scan ended with an error.
    Failed,
}

impl ScanPhase {
    const fn rank(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Preparing => 1,
            Self::ResumeCheck => 2,
            Self::Works => 3,
            Self::Inbox => 4,
            Self::History => 5,
            Self::Finalizing => 6,
            Self::Failed => 7,
        }
    }

    /// True between `Preparing` and `Finalizing` inclusive.
    #[must_use]
    pub const fn is_in_flight(self) -> bool {
        !matches!(self, Self::Idle | Self::Failed)
    }

    /// Whether the state machine allows moving from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Idle | Self::Failed, Self::Preparing) => true,
            (Self::Preparing | Self::Finalizing, Self::Idle) => true,
            (from, Self::Failed) => from.is_in_flight(),
            (Self::Idle | Self::Failed, _) | (_, Self::Idle | Self::Preparing) => false,
            (from, to) => to.rank() > from.rank(),
        }
    }
}

impl From<Stage> for ScanPhase {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Works => Self::Works,
            Stage::Inbox => Self::Inbox,
            Stage::History => Self::History,
        }
    }
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Preparing => "preparing",
            Self::ResumeCheck => "resume-check",
            Self::Works => "works",
            Self::Inbox => "inbox",
            Self::History => "history",
            Self::Finalizing => "finalizing",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}
