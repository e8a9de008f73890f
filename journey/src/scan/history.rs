use async_trait::async_trait;

use journey_core::{
    JourneyError, ReadingEntry, ReadingsPage, ReadingsProvider, Stage, YearlyStats,
    is_archive_warning, is_mature_rating,
};

use super::pager::{self, PagedResource};
use super::{ScanContext, StageStart, YearScope, span};

const UNKNOWN_TITLE: &str = "Unknown Work";
const NO_URL: &str = "#";

struct History<'a> {
    ctx: &'a ScanContext<'a>,
    provider: &'a dyn ReadingsProvider,
    stats: &'a mut YearlyStats,
    start_page: u32,
}

impl History<'_> {
    fn fold(&mut self, year: i32, entry: &ReadingEntry) {
        let r = &mut self.stats.entry(year).reader;
        let visits = u64::from(entry.visits.unwrap_or(1));
        let title = entry
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(UNKNOWN_TITLE);
        let url = entry
            .url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(NO_URL);

        if r.visit_work(title, url, visits) {
            r.fics += 1;
            r.words += entry.words;
        }
        if entry.rating.as_deref().is_some_and(is_mature_rating) {
            r.mature_clicks += visits;
        }
        if let Some(author) = entry.author.as_deref().map(str::trim)
            && !author.is_empty()
        {
            r.authors
                .entry(author.to_string())
                .or_default()
                .record(title, visits);
        }
        for fandom in &entry.fandoms {
            r.fandoms.bump(fandom);
        }
        for rel in &entry.relationships {
            r.relationships.bump(rel);
        }
        for tag in entry.tags.iter().filter(|t| !is_archive_warning(t)) {
            r.tags.bump(tag);
        }
    }
}

#[async_trait]
impl<'a> PagedResource for History<'a> {
    type Page = ReadingsPage;

    async fn fetch(&self, page: u32) -> Result<ReadingsPage, JourneyError> {
        self.provider.readings_page(self.ctx.identity, page).await
    }

    fn on_page(&mut self, page: u32, total: u32) {
        let label = self.ctx.year_label();
        if page == self.start_page {
            let resuming = if page > 1 {
                format!(" (resuming from page {page})")
            } else {
                String::new()
            };
            self.ctx.report(
                "Scanning reading history...",
                format!("Fetching page {page}{label}{resuming}"),
                45,
            );
        } else {
            self.ctx.report(
                "Scanning reading history...",
                format!("Fetching page {page} of {total}{label}"),
                span(45, 50, page as usize, total as usize),
            );
        }
    }

    fn process(&mut self, _page: u32, body: ReadingsPage) -> bool {
        let now = self.ctx.journey.clock.now();
        let mut older = false;
        for entry in &body.entries {
            let Some(year) = self
                .ctx
                .journey
                .resolver
                .resolve_year(&entry.last_visited, now)
            else {
                #[cfg(feature = "tracing")]
                tracing::trace!(visited = %entry.last_visited, "reading entry without a date; skipped");
                continue;
            };
            match self.ctx.scope_of(year) {
                YearScope::Counted => self.fold(year, entry),
                YearScope::Older => older = true,
                YearScope::Newer => {}
            }
        }
        older
    }

    async fn checkpoint(&mut self, page: u32, total: u32) {
        self.ctx
            .checkpoint(Stage::History, page, Some(total), self.stats, None)
            .await;
    }
}

/// Run the reading-history stage from `start`.
pub(crate) async fn run(
    ctx: &ScanContext<'_>,
    provider: &dyn ReadingsProvider,
    stats: &mut YearlyStats,
    start: StageStart,
) -> Result<(), JourneyError> {
    let plan = ctx.plan(start, ctx.journey.cfg.max_history_pages);
    let mut history = History {
        ctx,
        provider,
        stats,
        start_page: plan.start_page.max(1),
    };
    let walked = pager::walk(&mut history, &plan).await?;
    if walked.stopped_early {
        #[cfg(feature = "tracing")]
        tracing::info!(
            page = walked.last_page,
            target_year = ?ctx.target_year,
            "reading history reached entries older than the target year; stopping"
        );
        ctx.report(
            "Scanning reading history...",
            format!(
                "Done! Stopped at page {} (older entries skipped)",
                walked.last_page
            ),
            95,
        );
    }
    Ok(())
}
