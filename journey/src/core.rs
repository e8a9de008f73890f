use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::Duration;

use tokio::sync::watch;

use journey_core::{
    ActivitySite, AuthorFilter, Clock, JourneyConfig, JourneyError, MemoryBackend,
    ProgressUpdate, RelativeTimeResolver, ScanProgress, StateBackend, SystemClock, TimeResolver,
    UiLabelFilter,
};

use crate::scan::ScanPhase;
use crate::state::ScanStateStore;

/// Receives status updates while a scan runs.
///
/// Updates are a side channel: nothing the sink does affects the scan.
pub trait ProgressSink: Send + Sync {
    /// Called for every status change.
    fn on_progress(&self, update: &ProgressUpdate);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressUpdate) + Send + Sync,
{
    fn on_progress(&self, update: &ProgressUpdate) {
        self(update);
    }
}

/// What to do with an interrupted scan's checkpoint.
#[derive(Clone, Default)]
pub enum ResumePolicy {
    /// Continue from the checkpoint.
    #[default]
    Resume,
    /// Delete the checkpoint and start over.
    Discard,
    /// Ask the callback; `true` resumes.
    Ask(Arc<dyn Fn(&ScanProgress) -> bool + Send + Sync>),
}

impl ResumePolicy {
    /// Decide with a callback (typically a prompt in the calling shell).
    pub fn ask<F>(f: F) -> Self
    where
        F: Fn(&ScanProgress) -> bool + Send + Sync + 'static,
    {
        Self::Ask(Arc::new(f))
    }

    pub(crate) fn should_resume(&self, progress: &ScanProgress) -> bool {
        match self {
            Self::Resume => true,
            Self::Discard => false,
            Self::Ask(f) => f(progress),
        }
    }
}

impl fmt::Debug for ResumePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resume => f.write_str("Resume"),
            Self::Discard => f.write_str("Discard"),
            Self::Ask(_) => f.write_str("Ask(..)"),
        }
    }
}

/// Orchestrator that crawls one site's activity into yearly statistics.
pub struct Journey {
    pub(crate) site: Arc<dyn ActivitySite>,
    pub(crate) store: ScanStateStore,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) resolver: Arc<dyn TimeResolver>,
    pub(crate) authors: Arc<dyn AuthorFilter>,
    pub(crate) progress: Arc<dyn ProgressSink>,
    pub(crate) resume: ResumePolicy,
    pub(crate) cfg: JourneyConfig,
    pub(crate) running: AtomicBool,
    pub(crate) progress_floor: AtomicU8,
    pub(crate) phase: watch::Sender<ScanPhase>,
}

impl Journey {
    /// Start building a new `Journey` instance.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use journey::{Journey, FileBackend};
    ///
    /// let journey = Journey::builder()
    ///     .site(Arc::new(MySite::new()))
    ///     .state_backend(Arc::new(FileBackend::new("./state")))
    ///     .on_progress(|u: &journey::ProgressUpdate| println!("{} {}", u.status, u.detail))
    ///     .build()?;
    /// let report = journey.start_scan(false).await;
    /// ```
    #[must_use]
    pub fn builder() -> JourneyBuilder {
        JourneyBuilder::new()
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &JourneyConfig {
        &self.cfg
    }

    /// The cache and progress store, for read-only inspection by a renderer.
    #[must_use]
    pub const fn state(&self) -> &ScanStateStore {
        &self.store
    }

    /// Current phase of the scan state machine.
    #[must_use]
    pub fn phase(&self) -> ScanPhase {
        *self.phase.borrow()
    }

    /// Watch phase changes.
    #[must_use]
    pub fn subscribe_phase(&self) -> watch::Receiver<ScanPhase> {
        self.phase.subscribe()
    }

    /// Emit a status update. Percentages never decrease within one scan.
    pub(crate) fn report(&self, status: &str, detail: impl Into<String>, percent: Option<u8>) {
        let percent = percent.map(|p| {
            let p = p.min(100);
            p.max(self.progress_floor.fetch_max(p, Ordering::AcqRel))
        });
        self.progress
            .on_progress(&ProgressUpdate::new(status, detail, percent));
    }
}

/// Builder for constructing a `Journey` orchestrator with custom configuration.
pub struct JourneyBuilder {
    site: Option<Arc<dyn ActivitySite>>,
    backend: Arc<dyn StateBackend>,
    clock: Arc<dyn Clock>,
    resolver: Arc<dyn TimeResolver>,
    authors: Arc<dyn AuthorFilter>,
    progress: Arc<dyn ProgressSink>,
    resume: ResumePolicy,
    cfg: JourneyConfig,
}

impl Default for JourneyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl JourneyBuilder {
    /// Create a new builder with defaults.
    ///
    /// Behavior and trade-offs:
    /// - Starts with no site; you must provide one via [`Self::site`].
    /// - State lives in a process-local [`MemoryBackend`] unless another
    ///   backend is supplied, so nothing survives a restart by default.
    /// - Uses the system clock, the English relative-time resolver, the
    ///   built-in UI-label filter and automatic resume of fresh checkpoints.
    #[must_use]
    pub fn new() -> Self {
        Self {
            site: None,
            backend: Arc::new(MemoryBackend::new()),
            clock: Arc::new(SystemClock),
            resolver: Arc::new(RelativeTimeResolver),
            authors: Arc::new(UiLabelFilter::new()),
            progress: Arc::new(|_: &ProgressUpdate| {}),
            resume: ResumePolicy::default(),
            cfg: JourneyConfig::default(),
        }
    }

    /// Set the site to crawl.
    #[must_use]
    pub fn site(mut self, site: Arc<dyn ActivitySite>) -> Self {
        self.site = Some(site);
        self
    }

    /// Set the backend holding cache and progress rows.
    ///
    /// Behavior and trade-offs:
    /// - Rows are last-writer-wins. Two processes scanning the same identity
    ///   against a shared backend can overwrite each other's checkpoints.
    #[must_use]
    pub fn state_backend(mut self, backend: Arc<dyn StateBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Set the clock used for year scoping, relative times and checkpoint age.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the relative-time resolver used by the inbox and history stages.
    #[must_use]
    pub fn time_resolver(mut self, resolver: Arc<dyn TimeResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replace the filter deciding which inbox names are real commenters.
    #[must_use]
    pub fn author_filter(mut self, filter: Arc<dyn AuthorFilter>) -> Self {
        self.authors = filter;
        self
    }

    /// Set the status side channel.
    #[must_use]
    pub fn progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = sink;
        self
    }

    /// Set the status side channel from a closure.
    #[must_use]
    pub fn on_progress<F>(self, f: F) -> Self
    where
        F: Fn(&ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_sink(Arc::new(f))
    }

    /// Decide what happens to an interrupted scan's checkpoint.
    #[must_use]
    pub fn resume_policy(mut self, policy: ResumePolicy) -> Self {
        self.resume = policy;
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: JourneyConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Set the pause between consecutive requests.
    ///
    /// Behavior and trade-offs:
    /// - Requests are always sequential; this delay is the only rate limit.
    ///   Shorter delays finish sooner and load the remote site harder.
    #[must_use]
    pub const fn request_delay(mut self, delay: Duration) -> Self {
        self.cfg.request_delay = delay;
        self
    }

    /// Checkpoint every `n` pages (works stage: every `n` works).
    ///
    /// Behavior and trade-offs:
    /// - Smaller intervals lose less work on interruption and write more often.
    /// - Must be at least 1; [`Self::build`] rejects 0.
    #[must_use]
    pub const fn save_interval(mut self, n: u32) -> Self {
        self.cfg.save_interval = n;
        self
    }

    /// Hard page cap for the inbox crawl.
    #[must_use]
    pub const fn max_inbox_pages(mut self, n: u32) -> Self {
        self.cfg.max_inbox_pages = n;
        self
    }

    /// Optional hard page cap for the reading-history crawl.
    #[must_use]
    pub const fn max_history_pages(mut self, n: Option<u32>) -> Self {
        self.cfg.max_history_pages = n;
        self
    }

    /// Optional hard page cap for the works listing.
    #[must_use]
    pub const fn max_works_pages(mut self, n: Option<u32>) -> Self {
        self.cfg.max_works_pages = n;
        self
    }

    /// Checkpoints older than this are discarded instead of resumed.
    #[must_use]
    pub const fn progress_max_age(mut self, age: Duration) -> Self {
        self.cfg.progress_max_age = age;
        self
    }

    /// Refuse to persist rows whose serialized size exceeds `bytes`.
    #[must_use]
    pub const fn max_persisted_bytes(mut self, bytes: usize) -> Self {
        self.cfg.max_persisted_bytes = bytes;
        self
    }

    /// Build the `Journey` instance.
    ///
    /// # Errors
    /// Returns `InvalidArg` when no site was provided or the save interval is 0.
    pub fn build(self) -> Result<Journey, JourneyError> {
        let site = self
            .site
            .ok_or_else(|| JourneyError::InvalidArg("an activity site is required".into()))?;
        if self.cfg.save_interval == 0 {
            return Err(JourneyError::InvalidArg(
                "save_interval must be at least 1".into(),
            ));
        }
        let store = ScanStateStore::new(self.backend, Arc::clone(&self.clock), &self.cfg);
        let (phase, _) = watch::channel(ScanPhase::Idle);
        Ok(Journey {
            site,
            store,
            clock: self.clock,
            resolver: self.resolver,
            authors: self.authors,
            progress: self.progress,
            resume: self.resume,
            cfg: self.cfg,
            running: AtomicBool::new(false),
            progress_floor: AtomicU8::new(0),
            phase,
        })
    }
}
