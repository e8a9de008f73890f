//! Works stage: list the user's works, then visit each detail page and
//! attribute its lifetime metrics to the years it was active in.

use async_trait::async_trait;

use journey_core::{
    DedupGuard, JourneyError, Stage, TopWork, WorkActivityRecord, WorkBlurb, WorkMetrics,
    WorksListPage, WorksProvider, WorksResume, YearlyStats, attribute, extract_year,
    is_archive_warning, parse_calendar_date,
};

use super::pager::{self, PagedResource};
use super::{ScanContext, StageStart, span};

const UNKNOWN_TITLE: &str = "Unknown Work";

struct Listing<'a> {
    ctx: &'a ScanContext<'a>,
    provider: &'a dyn WorksProvider,
    urls: Vec<String>,
    listed: DedupGuard,
}

impl Listing<'_> {
    /// Coarse pre-filter: with a target year, keep only works whose displayed
    /// update year is the target year or later.
    fn keep(&self, blurb: &WorkBlurb) -> bool {
        match self.ctx.target_year {
            None => true,
            Some(target) => extract_year(&blurb.updated).is_some_and(|y| y >= target),
        }
    }
}

#[async_trait]
impl<'a> PagedResource for Listing<'a> {
    type Page = WorksListPage;

    async fn fetch(&self, page: u32) -> Result<WorksListPage, JourneyError> {
        self.provider.works_page(self.ctx.identity, page).await
    }

    fn on_page(&mut self, page: u32, total: u32) {
        let label = self.ctx.year_label();
        if page == 1 {
            self.ctx.report(
                "Finding your works...",
                format!("Fetching works list{label}"),
                2,
            );
        } else {
            self.ctx.report(
                "Finding your works...",
                format!("Scanning page {page} of {total}{label}"),
                span(2, 3, page as usize, total as usize),
            );
        }
    }

    fn process(&mut self, _page: u32, body: WorksListPage) -> bool {
        for blurb in body.works {
            if blurb.url.trim().is_empty() {
                continue;
            }
            if !self.keep(&blurb) {
                #[cfg(feature = "tracing")]
                tracing::trace!(url = %blurb.url, updated = %blurb.updated, "work predates target year");
            } else if self.listed.mark_if_new(&blurb.url) {
                self.urls.push(blurb.url);
            } else {
                #[cfg(feature = "tracing")]
                tracing::debug!(url = %blurb.url, "work listed twice; keeping the first listing");
            }
        }
        false
    }

    async fn checkpoint(&mut self, _page: u32, _total: u32) {}
}

/// Run the works stage.
///
/// With `saved` work urls the listing is not fetched again and detail
/// fetching continues after the last processed index.
pub(crate) async fn run(
    ctx: &ScanContext<'_>,
    provider: &dyn WorksProvider,
    stats: &mut YearlyStats,
    saved: Option<WorksResume>,
) -> Result<(), JourneyError> {
    let cfg = &ctx.journey.cfg;
    let label = ctx.year_label();

    let mut resume = match saved {
        Some(saved) => {
            ctx.report(
                "Resuming works scan...",
                format!(
                    "Starting from work {} of {}{label}",
                    saved.next_index() + 1,
                    saved.work_urls.len()
                ),
                5,
            );
            saved
        }
        None => {
            let mut listing = Listing {
                ctx,
                provider,
                urls: Vec::new(),
                listed: DedupGuard::new(),
            };
            let plan = ctx.plan(StageStart::FIRST, cfg.max_works_pages);
            pager::walk(&mut listing, &plan).await?;
            #[cfg(feature = "tracing")]
            tracing::debug!(count = listing.urls.len(), target_year = ?ctx.target_year, "works listed");
            let resume = WorksResume {
                work_urls: listing.urls,
                work_index: None,
            };
            if !resume.work_urls.is_empty() {
                ctx.checkpoint(Stage::Works, 0, None, stats, Some(&resume)).await;
            }
            resume
        }
    };

    let total = resume.work_urls.len();
    let interval = usize::try_from(cfg.save_interval.max(1)).unwrap_or(1);
    let mut seen = DedupGuard::new();
    for i in resume.next_index()..total {
        let url = resume.work_urls[i].clone();
        tokio::time::sleep(cfg.request_delay).await;
        ctx.report(
            "Scanning your works...",
            format!("Work {} of {total}{label}", i + 1),
            span(5, 15, i, total),
        );
        if seen.mark_if_new(&url) {
            let record = provider.work_detail(&url).await?;
            fold_work(stats, &url, &record, ctx.target_year);
        } else {
            #[cfg(feature = "tracing")]
            tracing::debug!(url, "work already processed in this run; skipped");
        }
        if (i + 1) % interval == 0 {
            resume.work_index = Some(i);
            let done = u32::try_from(i + 1).unwrap_or(u32::MAX);
            ctx.checkpoint(Stage::Works, done, None, stats, Some(&resume)).await;
        }
    }
    Ok(())
}

/// Fold one work's detail record into `stats`.
///
/// Lifetime metrics are attributed across the years between the publish and
/// last-update dates; with a target year every other year's share is dropped.
/// Returns the number of years the work contributed to.
pub(crate) fn fold_work(
    stats: &mut YearlyStats,
    url: &str,
    record: &WorkActivityRecord,
    target_year: Option<i32>,
) -> usize {
    let published = parse_calendar_date(&record.published);
    let updated = record.updated.as_deref().and_then(parse_calendar_date);
    if published.is_none() {
        #[cfg(feature = "tracing")]
        tracing::warn!(url, published = %record.published, "work has no readable publish date");
        return 0;
    }
    let metrics = WorkMetrics {
        words: record.words,
        kudos: record.kudos,
        comments: record.comments,
        hits: record.hits,
    };
    let title = match record.title.trim() {
        "" => UNKNOWN_TITLE,
        t => t,
    };

    let mut contributed = 0;
    for (year, share) in attribute(published, updated, metrics) {
        if target_year.is_some_and(|t| t != year) {
            continue;
        }
        let c = &mut stats.entry(year).creator;
        c.works += 1;
        c.words += share.words;
        c.kudos += share.kudos;
        c.comments += share.comments;
        c.hits += share.hits;
        c.record_top_work(TopWork::new(
            title,
            url,
            record.kudos,
            record.comments,
            record.hits,
        ));
        for fandom in &record.fandoms {
            c.fandoms.add(fandom, share.words);
        }
        for rel in &record.relationships {
            c.relationships.add(rel, share.words);
        }
        for tag in record.tags.iter().filter(|t| !is_archive_warning(t)) {
            c.tags.bump(tag);
        }
        for giver in &record.kudos_givers {
            c.kudos_givers.bump(giver);
        }
        contributed += 1;
    }
    contributed
}
