use async_trait::async_trait;
use journey_core::{
    ActivitySite, InboxPage, InboxProvider, JourneyError, ReadingsPage, ReadingsProvider,
    WorkActivityRecord, WorksListPage, WorksProvider,
};

mod dynamic;
mod fixtures;

pub use dynamic::{FetchRecord, MockBehavior, ScriptedSite, ScriptedSiteController};
pub use fixtures::works::work_url;

/// Account name the fixture site is signed in as.
pub const MOCK_IDENTITY: &str = "mock_reader";

/// Mock site for CI-safe examples. Serves deterministic pages from static fixtures.
///
/// Fixture activity spans 2022 through 2024. Work urls ending in `FAIL`
/// produce a fetch error.
pub struct MockSite {
    identity: Option<String>,
}

impl Default for MockSite {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSite {
    /// A site signed in as [`MOCK_IDENTITY`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            identity: Some(MOCK_IDENTITY.to_string()),
        }
    }

    /// A site with no session.
    #[must_use]
    pub const fn signed_out() -> Self {
        Self { identity: None }
    }

    fn not_found(resource: &str) -> JourneyError {
        JourneyError::fetch(resource, "404 not found")
    }
}

#[async_trait]
impl ActivitySite for MockSite {
    fn name(&self) -> &'static str {
        "journey-mock"
    }

    async fn identity(&self) -> Option<String> {
        self.identity.clone()
    }

    fn as_works_provider(&self) -> Option<&dyn WorksProvider> {
        Some(self as &dyn WorksProvider)
    }
    fn as_inbox_provider(&self) -> Option<&dyn InboxProvider> {
        Some(self as &dyn InboxProvider)
    }
    fn as_readings_provider(&self) -> Option<&dyn ReadingsProvider> {
        Some(self as &dyn ReadingsProvider)
    }
}

#[async_trait]
impl WorksProvider for MockSite {
    async fn works_page(&self, _identity: &str, page: u32) -> Result<WorksListPage, JourneyError> {
        fixtures::works::listing(page).ok_or_else(|| Self::not_found(&format!("works page {page}")))
    }

    async fn work_detail(&self, url: &str) -> Result<WorkActivityRecord, JourneyError> {
        if url.ends_with("FAIL") {
            return Err(JourneyError::fetch(url, "forced failure"));
        }
        fixtures::works::by_url(url).ok_or_else(|| Self::not_found(url))
    }
}

#[async_trait]
impl InboxProvider for MockSite {
    async fn inbox_page(&self, identity: &str, page: u32) -> Result<InboxPage, JourneyError> {
        fixtures::inbox::page(page, identity)
            .ok_or_else(|| Self::not_found(&format!("inbox page {page}")))
    }
}

#[async_trait]
impl ReadingsProvider for MockSite {
    async fn readings_page(
        &self,
        _identity: &str,
        page: u32,
    ) -> Result<ReadingsPage, JourneyError> {
        fixtures::history::page(page)
            .ok_or_else(|| Self::not_found(&format!("history page {page}")))
    }
}
