use std::time::Duration;

use async_trait::async_trait;

use journey_core::{JourneyError, Paginated};

/// How to walk one paginated resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PagePlan {
    /// First page to fetch (1-based; greater than 1 when resuming).
    pub(crate) start_page: u32,
    /// Hard cap applied to the reported page count.
    pub(crate) page_cap: Option<u32>,
    /// Page count recorded by the checkpoint a resumed walk starts from.
    pub(crate) known_total: Option<u32>,
    /// Whether a target-year filter is active; enables early termination.
    pub(crate) filtering: bool,
    /// Pause before every fetch after the first.
    pub(crate) delay: Duration,
    /// Checkpoint after every page whose number is a multiple of this.
    pub(crate) save_interval: u32,
}

/// Where a walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageWalk {
    /// Last page fetched and processed.
    pub(crate) last_page: u32,
    /// Page bound in effect (reported count, capped).
    pub(crate) total_pages: u32,
    /// True when the walk stopped on entries older than the target year.
    pub(crate) stopped_early: bool,
}

/// One stage's view of a paginated resource.
#[async_trait]
pub(crate) trait PagedResource: Send + Sync {
    type Page: Paginated + Send;

    /// Fetch page `page`.
    async fn fetch(&self, page: u32) -> Result<Self::Page, JourneyError>;

    /// Fold a fetched page into the accumulator. Returns `true` when the page
    /// held entries older than the target year.
    fn process(&mut self, page: u32, body: Self::Page) -> bool;

    /// Persist a checkpoint after `page` of `total` was processed.
    async fn checkpoint(&mut self, page: u32, total: u32);

    /// Called once per fetched page, before it is processed.
    fn on_page(&mut self, _page: u32, _total: u32) {}
}

/// Walk pages in ascending order starting at `plan.start_page`.
///
/// The page count comes from the resumed checkpoint when it recorded one,
/// otherwise from the first page fetched. A walk whose start page is already
/// past the bound fetches nothing. A checkpoint is taken after page 1 of a
/// walk that started there and after every page that is a multiple of the
/// save interval. A fetch failure aborts the walk; whatever earlier pages
/// folded into the accumulator is kept.
pub(crate) async fn walk<R: PagedResource>(
    res: &mut R,
    plan: &PagePlan,
) -> Result<PageWalk, JourneyError> {
    let start = plan.start_page.max(1);
    let interval = plan.save_interval.max(1);
    let capped = |reported: u32| plan.page_cap.map_or(reported, |cap| reported.min(cap.max(1)));
    if let Some(bound) = plan.known_total.map(capped).or(plan.page_cap.map(|cap| cap.max(1)))
        && start > bound
    {
        #[cfg(feature = "tracing")]
        tracing::debug!(start, bound, "resume point is past the last page; nothing to fetch");
        return Ok(PageWalk {
            last_page: start - 1,
            total_pages: bound,
            stopped_early: false,
        });
    }
    let mut total = plan.known_total;
    let mut page = start;
    loop {
        if page > start {
            tokio::time::sleep(plan.delay).await;
        }
        let body = res.fetch(page).await?;
        let bound = capped(*total.get_or_insert_with(|| body.total_pages()));
        res.on_page(page, bound);
        let older = res.process(page, body);
        if (start == 1 && page == 1) || page % interval == 0 {
            res.checkpoint(page, bound).await;
        }
        if older && plan.filtering {
            return Ok(PageWalk {
                last_page: page,
                total_pages: bound,
                stopped_early: true,
            });
        }
        if page >= bound {
            return Ok(PageWalk {
                last_page: page,
                total_pages: bound,
                stopped_early: false,
            });
        }
        page += 1;
    }
}
