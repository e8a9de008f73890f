use async_trait::async_trait;

use journey_core::{InboxPage, InboxProvider, JourneyError, Stage, YearlyStats};

use super::pager::{self, PagedResource};
use super::{ScanContext, StageStart, YearScope, span};

struct Inbox<'a> {
    ctx: &'a ScanContext<'a>,
    provider: &'a dyn InboxProvider,
    stats: &'a mut YearlyStats,
    start_page: u32,
}

#[async_trait]
impl<'a> PagedResource for Inbox<'a> {
    type Page = InboxPage;

    async fn fetch(&self, page: u32) -> Result<InboxPage, JourneyError> {
        self.provider.inbox_page(self.ctx.identity, page).await
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
                "Scanning your inbox...",
                format!("Fetching page {page}{label}{resuming}"),
                25,
            );
        } else {
            self.ctx.report(
                "Scanning your inbox...",
                format!("Fetching page {page} of {total}{label}"),
                span(25, 15, page as usize, total as usize),
            );
        }
    }

    fn process(&mut self, _page: u32, body: InboxPage) -> bool {
        let journey = self.ctx.journey;
        let now = journey.clock.now();
        let current = journey.clock.current_year();
        let mut older = false;
        for entry in body.entries {
            let Some(name) = entry.commenter.as_deref().map(str::trim) else {
                continue;
            };
            if !journey.authors.is_author(name, self.ctx.identity) {
                continue;
            }
            let year = journey
                .resolver
                .resolve_year(&entry.timestamp, now)
                .unwrap_or(current);
            match self.ctx.scope_of(year) {
                YearScope::Counted => self.stats.entry(year).creator.commenters.bump(name),
                YearScope::Older => older = true,
                YearScope::Newer => {}
            }
        }
        older
    }

    async fn checkpoint(&mut self, page: u32, total: u32) {
        self.ctx
            .checkpoint(Stage::Inbox, page, Some(total), self.stats, None)
            .await;
    }
}

/// Run the inbox stage from `start`, counting commenters per year.
pub(crate) async fn run(
    ctx: &ScanContext<'_>,
    provider: &dyn InboxProvider,
    stats: &mut YearlyStats,
    start: StageStart,
) -> Result<(), JourneyError> {
    let plan = ctx.plan(start, Some(ctx.journey.cfg.max_inbox_pages));
    let mut inbox = Inbox {
        ctx,
        provider,
        stats,
        start_page: plan.start_page.max(1),
    };
    let walked = pager::walk(&mut inbox, &plan).await?;
    if walked.stopped_early {
        #[cfg(feature = "tracing")]
        tracing::info!(
            page = walked.last_page,
            target_year = ?ctx.target_year,
            "inbox reached entries older than the target year; stopping"
        );
    }
    Ok(())
}
