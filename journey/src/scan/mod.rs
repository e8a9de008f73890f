//! Scan state machine and stage processors.
//!
//! A scan moves through `Preparing → ResumeCheck → Works → Inbox → History →
//! Finalizing` and owns its [`YearlyStats`] accumulator for its whole
//! lifetime; stage processors borrow it mutably in turn. Nothing is written to
//! the cache unless every stage finished.

mod history;
mod inbox;
mod pager;
mod phase;
mod works;

pub use phase::ScanPhase;

use std::sync::atomic::Ordering;

use journey_core::{
    JourneyError, ScanMode, ScanOutcome, ScanProgress, ScanReport, ScanScope, Stage, WorksResume,
    YearlyStats, YearsToScan,
};

use crate::core::Journey;
use pager::PagePlan;

/// Everything a stage processor needs besides the accumulator.
pub(crate) struct ScanContext<'a> {
    pub(crate) journey: &'a Journey,
    pub(crate) identity: &'a str,
    /// Year filter of an incremental (or resumed incremental) scan.
    pub(crate) target_year: Option<i32>,
}

impl ScanContext<'_> {
    pub(crate) fn report(&self, status: &str, detail: impl Into<String>, percent: u8) {
        self.journey.report(status, detail, Some(percent));
    }

    /// Suffix appended to status details, e.g. `" (2024 only)"`.
    pub(crate) fn year_label(&self) -> String {
        self.target_year
            .map(|y| format!(" ({y} only)"))
            .unwrap_or_default()
    }

    pub(crate) fn plan(&self, start: StageStart, page_cap: Option<u32>) -> PagePlan {
        PagePlan {
            start_page: start.page,
            page_cap,
            known_total: start.known_total,
            filtering: self.target_year.is_some(),
            delay: self.journey.cfg.request_delay,
            save_interval: self.journey.cfg.save_interval,
        }
    }

    pub(crate) async fn checkpoint(
        &self,
        stage: Stage,
        last_page: u32,
        total_pages: Option<u32>,
        stats: &YearlyStats,
        extra: Option<&WorksResume>,
    ) -> bool {
        self.journey
            .store
            .save_progress(
                self.identity,
                stage,
                last_page,
                total_pages,
                self.target_year,
                stats,
                extra,
            )
            .await
    }

    /// Classify a resolved entry year against the year filter.
    pub(crate) const fn scope_of(&self, year: i32) -> YearScope {
        match self.target_year {
            Some(target) if year < target => YearScope::Older,
            Some(target) if year > target => YearScope::Newer,
            _ => YearScope::Counted,
        }
    }
}

/// Where an entry's year falls relative to the scan's year filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum YearScope {
    /// Inside the filter (or no filter is active).
    Counted,
    /// Before the target year; newest-first crawls can stop after this page.
    Older,
    /// After the target year; ignored.
    Newer,
}

/// Map `done` of `total` onto `base..=base + width` percent.
pub(crate) fn span(base: u8, width: u8, done: usize, total: usize) -> u8 {
    if total == 0 {
        return base;
    }
    let done = done.min(total) as u64;
    let extra = u64::from(width) * done / total as u64;
    base.saturating_add(u8::try_from(extra).unwrap_or(width))
}

/// First page of a paginated stage, and the page count already known for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StageStart {
    pub(crate) page: u32,
    pub(crate) known_total: Option<u32>,
}

impl StageStart {
    pub(crate) const FIRST: Self = Self {
        page: 1,
        known_total: None,
    };
}

/// Where a resumed scan re-enters the stage sequence.
struct ResumePoint {
    stage: Stage,
    start_page: u32,
    total_pages: Option<u32>,
    works: Option<WorksResume>,
}

impl ResumePoint {
    fn from_progress(progress: ScanProgress) -> (Self, YearlyStats, Option<i32>) {
        let point = Self {
            stage: progress.stage,
            start_page: progress.last_page.saturating_add(1),
            total_pages: progress.total_pages,
            works: progress.extra,
        };
        (point, progress.data, progress.target_year)
    }
}

/// Clears the in-flight flag however `start_scan` exits, including when its
/// future is dropped mid-stage.
struct RunGuard<'a>(&'a Journey);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.phase.send_if_modified(|p| {
            if p.is_in_flight() {
                *p = ScanPhase::Idle;
                true
            } else {
                false
            }
        });
        self.0.running.store(false, Ordering::Release);
    }
}

impl Journey {
    pub(crate) fn enter(&self, next: ScanPhase) {
        self.phase.send_if_modified(|current| {
            if current.can_transition_to(next) {
                *current = next;
                true
            } else {
                #[cfg(feature = "tracing")]
                tracing::warn!(from = %current, to = %next, "rejected phase transition");
                false
            }
        });
    }

    /// Run one scan to completion and return what it accumulated.
    ///
    /// Behavior:
    /// - Only one scan runs per orchestrator; a concurrent call returns
    ///   immediately with `ScanOutcome::AlreadyRunning`.
    /// - Without an identity the scan ends with `ScanOutcome::NotAuthenticated`.
    /// - Unless `force_full` is set, a fresh checkpoint is offered to the
    ///   configured [`crate::ResumePolicy`]; otherwise a usable cache narrows
    ///   the crawl to the current year and past years are copied verbatim.
    /// - `force_full` ignores both the cache and any checkpoint. The existing
    ///   cache row is kept until the new scan replaces it.
    /// - A stage failure ends the scan with `ScanOutcome::Failed`. The report
    ///   carries everything accumulated up to the failure, the last checkpoint
    ///   stays in place, and the cache is not touched.
    /// - Stages the site has no capability for are skipped and listed in
    ///   `ScanReport::skipped_stages`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "journey::scan", skip(self), fields(site = self.site.name()))
    )]
    pub async fn start_scan(&self, force_full: bool) -> ScanReport {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            #[cfg(feature = "tracing")]
            tracing::warn!("scan already in progress; ignoring request");
            return ScanReport::already_running();
        }
        let _guard = RunGuard(self);
        self.progress_floor.store(0, Ordering::Release);

        self.enter(ScanPhase::Preparing);
        self.report("Preparing...", "Resolving signed-in account", Some(0));
        let identity = match self.site.identity().await {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => {
                #[cfg(feature = "tracing")]
                tracing::info!("no signed-in identity; nothing to scan");
                self.report("Not signed in", "Log in to the site and try again", None);
                self.enter(ScanPhase::Idle);
                return ScanReport::not_authenticated();
            }
        };

        let mut stats = YearlyStats::new();
        let mut resume: Option<ResumePoint> = None;
        let mut cached_years = Vec::new();
        let mut target_year = None;

        if force_full {
            #[cfg(feature = "tracing")]
            tracing::info!(identity, "forced full scan; ignoring cache and checkpoint");
            self.store.clear_progress(&identity).await;
        } else {
            self.enter(ScanPhase::ResumeCheck);
            if let Some(progress) = self.store.load_progress(&identity).await {
                if self.resume.should_resume(&progress) {
                    self.report(
                        "Resuming scan...",
                        format!(
                            "Resuming from {} page {}...",
                            progress.stage, progress.last_page
                        ),
                        Some(10),
                    );
                    let (point, data, year) = ResumePoint::from_progress(progress);
                    stats = data;
                    target_year = year;
                    resume = Some(point);
                } else {
                    #[cfg(feature = "tracing")]
                    tracing::info!(identity, "checkpoint declined; starting fresh");
                    self.store.clear_progress(&identity).await;
                }
            }
        }

        let mode = if let Some(point) = &resume {
            #[cfg(feature = "tracing")]
            tracing::info!(identity, stage = %point.stage, from = point.start_page, "resuming scan");
            ScanMode::Resumed {
                stage: point.stage,
                from_page: point.start_page,
                target_year,
            }
        } else {
            let scope = if force_full {
                ScanScope::full()
            } else {
                self.store.determine_scan_scope(&identity).await
            };
            let target = match &scope.years_to_scan {
                YearsToScan::Only(years) => years.iter().max().copied(),
                YearsToScan::All => None,
            };
            if let (Some(current), Some(cached)) = (target, scope.cached) {
                self.report("Loading cached data...", "Loading cached data...", Some(5));
                stats = cached;
                stats.remove(current);
                cached_years = scope.cached_years;
                self.report(
                    &format!("Scanning {current} data..."),
                    format!(
                        "Scanning {current} data ({} years cached)",
                        cached_years.len()
                    ),
                    Some(10),
                );
                #[cfg(feature = "tracing")]
                tracing::info!(
                    identity,
                    target_year = current,
                    cached = cached_years.len(),
                    "incremental scan"
                );
                target_year = Some(current);
                ScanMode::Incremental {
                    target_year: current,
                }
            } else {
                self.report("Scanning all data...", "Scanning all data...", Some(5));
                #[cfg(feature = "tracing")]
                tracing::info!(identity, "full scan");
                ScanMode::Full
            }
        };

        let ctx = ScanContext {
            journey: self,
            identity: &identity,
            target_year,
        };
        let mut skipped_stages = Vec::new();

        for stage in Stage::ORDER {
            let start = match &resume {
                Some(point) if stage < point.stage => continue,
                Some(point) if stage == point.stage => StageStart {
                    page: point.start_page,
                    known_total: point.total_pages,
                },
                _ => StageStart::FIRST,
            };
            self.enter(stage.into());
            #[cfg(feature = "tracing")]
            tracing::debug!(identity, %stage, start_page = start.page, "stage started");
            let result = match stage {
                Stage::Works => match self.site.as_works_provider() {
                    Some(provider) => {
                        let saved = resume
                            .as_mut()
                            .filter(|p| p.stage == Stage::Works)
                            .and_then(|p| p.works.take());
                        works::run(&ctx, provider, &mut stats, saved).await
                    }
                    None => Err(JourneyError::unsupported("works")),
                },
                Stage::Inbox => match self.site.as_inbox_provider() {
                    Some(provider) => inbox::run(&ctx, provider, &mut stats, start).await,
                    None => Err(JourneyError::unsupported("inbox")),
                },
                Stage::History => match self.site.as_readings_provider() {
                    Some(provider) => history::run(&ctx, provider, &mut stats, start).await,
                    None => Err(JourneyError::unsupported("readings")),
                },
            };
            match result {
                Ok(()) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(identity, %stage, "stage finished");
                }
                Err(JourneyError::Unsupported { .. }) => {
                    #[cfg(feature = "tracing")]
                    tracing::info!(identity, %stage, "site lacks capability; stage skipped");
                    skipped_stages.push(stage);
                }
                Err(error) => {
                    #[cfg(feature = "tracing")]
                    tracing::error!(identity, %stage, %error, "stage failed");
                    self.report("Scan failed", error.to_string(), None);
                    self.enter(ScanPhase::Failed);
                    return ScanReport {
                        identity: Some(identity),
                        stats,
                        outcome: ScanOutcome::Failed {
                            stage: Some(stage),
                            error,
                        },
                        cached_years,
                        skipped_stages,
                    };
                }
            }
        }

        self.enter(ScanPhase::Finalizing);
        self.report("Finalizing...", "Almost done!", Some(98));
        let cache_written = self.store.save_cache(&identity, &stats).await;
        self.store.clear_progress(&identity).await;
        self.report("Done!", "Your journey is ready", Some(100));
        #[cfg(feature = "tracing")]
        tracing::info!(identity, years = stats.len(), cache_written, "scan completed");
        self.enter(ScanPhase::Idle);

        ScanReport {
            identity: Some(identity),
            stats,
            outcome: ScanOutcome::Completed {
                mode,
                cache_written,
            },
            cached_years,
            skipped_stages,
        }
    }

    /// Delete the signed-in identity's cache and progress rows.
    ///
    /// # Errors
    /// Returns `ScanInProgress` while a scan runs and `NotAuthenticated` when
    /// the site has no signed-in identity.
    pub async fn clear_saved_state(&self) -> Result<(), JourneyError> {
        if self.running.load(Ordering::Acquire) {
            return Err(JourneyError::ScanInProgress);
        }
        let identity = self
            .site
            .identity()
            .await
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(JourneyError::NotAuthenticated)?;
        self.store.clear_cache(&identity).await;
        self.store.clear_progress(&identity).await;
        #[cfg(feature = "tracing")]
        tracing::info!(identity, "saved state cleared");
        Ok(())
    }
}
