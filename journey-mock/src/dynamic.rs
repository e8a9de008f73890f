use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use journey_core::{
    ActivitySite, InboxPage, InboxProvider, JourneyError, ReadingsPage, ReadingsProvider, Stage,
    WorkActivityRecord, WorksListPage, WorksProvider,
};

/// Instruction for how a fetch should behave for a given page or url.
#[derive(Clone)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Fail immediately with the provided error.
    Fail(JourneyError),
    /// Never complete (simulate a stalled request).
    Hang,
}

/// One fetch observed by a [`ScriptedSite`], in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRecord {
    /// Works listing page.
    WorksPage(u32),
    /// Work detail page.
    WorkDetail(String),
    /// Inbox page.
    InboxPage(u32),
    /// Reading-history page.
    ReadingsPage(u32),
}

#[derive(Default)]
struct InternalState {
    identity: Option<String>,
    works_pages: HashMap<u32, MockBehavior<WorksListPage>>,
    details: HashMap<String, MockBehavior<WorkActivityRecord>>,
    inbox_pages: HashMap<u32, MockBehavior<InboxPage>>,
    readings_pages: HashMap<u32, MockBehavior<ReadingsPage>>,
    log: Vec<FetchRecord>,
}

struct Capabilities {
    works: AtomicBool,
    inbox: AtomicBool,
    readings: AtomicBool,
}

impl Capabilities {
    const fn all() -> Self {
        Self {
            works: AtomicBool::new(true),
            inbox: AtomicBool::new(true),
            readings: AtomicBool::new(true),
        }
    }

    const fn flag(&self, stage: Stage) -> &AtomicBool {
        match stage {
            Stage::Works => &self.works,
            Stage::Inbox => &self.inbox,
            Stage::History => &self.readings,
        }
    }
}

/// Controller handle used by tests to drive the scripted site from the outside.
pub struct ScriptedSiteController {
    state: Arc<Mutex<InternalState>>,
    caps: Arc<Capabilities>,
}

impl ScriptedSiteController {
    /// Set (or clear) the signed-in identity.
    pub async fn set_identity(&self, identity: Option<&str>) {
        self.state.lock().await.identity = identity.map(str::to_string);
    }

    /// Set the behavior for one works listing page.
    pub async fn set_works_page(&self, page: u32, behavior: MockBehavior<WorksListPage>) {
        self.state.lock().await.works_pages.insert(page, behavior);
    }

    /// Script works listing pages `1..=pages.len()` to return `pages` in order.
    pub async fn set_works_pages(&self, pages: Vec<WorksListPage>) {
        let mut guard = self.state.lock().await;
        for (page, body) in (1u32..).zip(pages) {
            guard.works_pages.insert(page, MockBehavior::Return(body));
        }
    }

    /// Set the behavior for a work detail url.
    pub async fn set_work_detail(&self, url: &str, behavior: MockBehavior<WorkActivityRecord>) {
        self.state
            .lock()
            .await
            .details
            .insert(url.to_string(), behavior);
    }

    /// Script a detail page returning `record` under its own url.
    pub async fn add_work(&self, record: WorkActivityRecord) {
        let url = record.url.clone();
        self.set_work_detail(&url, MockBehavior::Return(record)).await;
    }

    /// Set the behavior for one inbox page.
    pub async fn set_inbox_page(&self, page: u32, behavior: MockBehavior<InboxPage>) {
        self.state.lock().await.inbox_pages.insert(page, behavior);
    }

    /// Script inbox pages `1..=pages.len()` to return `pages` in order.
    pub async fn set_inbox_pages(&self, pages: Vec<InboxPage>) {
        let mut guard = self.state.lock().await;
        for (page, body) in (1u32..).zip(pages) {
            guard.inbox_pages.insert(page, MockBehavior::Return(body));
        }
    }

    /// Set the behavior for one reading-history page.
    pub async fn set_readings_page(&self, page: u32, behavior: MockBehavior<ReadingsPage>) {
        self.state.lock().await.readings_pages.insert(page, behavior);
    }

    /// Script reading-history pages `1..=pages.len()` to return `pages` in order.
    pub async fn set_readings_pages(&self, pages: Vec<ReadingsPage>) {
        let mut guard = self.state.lock().await;
        for (page, body) in (1u32..).zip(pages) {
            guard.readings_pages.insert(page, MockBehavior::Return(body));
        }
    }

    /// Withdraw the capability backing `stage`.
    pub fn disable(&self, stage: Stage) {
        self.caps.flag(stage).store(false, Ordering::SeqCst);
    }

    /// Restore the capability backing `stage`.
    pub fn enable(&self, stage: Stage) {
        self.caps.flag(stage).store(true, Ordering::SeqCst);
    }

    /// Every fetch observed so far, in call order.
    pub async fn fetch_log(&self) -> Vec<FetchRecord> {
        self.state.lock().await.log.clone()
    }

    /// Page numbers fetched for `stage`'s paginated resource, in call order.
    pub async fn pages_fetched(&self, stage: Stage) -> Vec<u32> {
        let guard = self.state.lock().await;
        guard
            .log
            .iter()
            .filter_map(|r| match (stage, r) {
                (Stage::Works, FetchRecord::WorksPage(p))
                | (Stage::Inbox, FetchRecord::InboxPage(p))
                | (Stage::History, FetchRecord::ReadingsPage(p)) => Some(*p),
                _ => None,
            })
            .collect()
    }

    /// Work detail urls fetched, in call order.
    pub async fn details_fetched(&self) -> Vec<String> {
        let guard = self.state.lock().await;
        guard
            .log
            .iter()
            .filter_map(|r| match r {
                FetchRecord::WorkDetail(u) => Some(u.clone()),
                _ => None,
            })
            .collect()
    }

    /// Forget the fetch log, keeping every scripted behavior.
    pub async fn clear_log(&self) {
        self.state.lock().await.log.clear();
    }
}

/// A site that defers all behavior to an external controller.
///
/// Unscripted pages fail with a `Fetch` error; every call is logged.
pub struct ScriptedSite {
    state: Arc<Mutex<InternalState>>,
    caps: Arc<Capabilities>,
}

impl ScriptedSite {
    /// Create a scripted site signed in as `identity`, and its controller.
    #[must_use]
    pub fn new_with_controller(identity: &str) -> (Arc<Self>, ScriptedSiteController) {
        let state = Arc::new(Mutex::new(InternalState {
            identity: Some(identity.to_string()),
            ..InternalState::default()
        }));
        let caps = Arc::new(Capabilities::all());
        let controller = ScriptedSiteController {
            state: Arc::clone(&state),
            caps: Arc::clone(&caps),
        };
        (Arc::new(Self { state, caps }), controller)
    }

    async fn play<T: Clone>(
        &self,
        record: FetchRecord,
        pick: impl FnOnce(&InternalState) -> Option<MockBehavior<T>>,
        resource: String,
    ) -> Result<T, JourneyError> {
        // Snapshot the behavior without holding the lock across await points
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.log.push(record);
            pick(&guard)
        };
        match behavior {
            Some(MockBehavior::Return(v)) => Ok(v),
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => std::future::pending().await,
            None => Err(JourneyError::fetch(resource, "not scripted")),
        }
    }

    fn enabled(&self, stage: Stage) -> bool {
        self.caps.flag(stage).load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ActivitySite for ScriptedSite {
    fn name(&self) -> &'static str {
        "journey-scripted"
    }

    async fn identity(&self) -> Option<String> {
        self.state.lock().await.identity.clone()
    }

    fn as_works_provider(&self) -> Option<&dyn WorksProvider> {
        self.enabled(Stage::Works)
            .then_some(self as &dyn WorksProvider)
    }

    fn as_inbox_provider(&self) -> Option<&dyn InboxProvider> {
        self.enabled(Stage::Inbox)
            .then_some(self as &dyn InboxProvider)
    }

    fn as_readings_provider(&self) -> Option<&dyn ReadingsProvider> {
        self.enabled(Stage::History)
            .then_some(self as &dyn ReadingsProvider)
    }
}

#[async_trait]
impl WorksProvider for ScriptedSite {
    async fn works_page(&self, _identity: &str, page: u32) -> Result<WorksListPage, JourneyError> {
        self.play(
            FetchRecord::WorksPage(page),
            |s| s.works_pages.get(&page).cloned(),
            format!("works page {page}"),
        )
        .await
    }

    async fn work_detail(&self, url: &str) -> Result<WorkActivityRecord, JourneyError> {
        self.play(
            FetchRecord::WorkDetail(url.to_string()),
            |s| s.details.get(url).cloned(),
            url.to_string(),
        )
        .await
    }
}

#[async_trait]
impl InboxProvider for ScriptedSite {
    async fn inbox_page(&self, _identity: &str, page: u32) -> Result<InboxPage, JourneyError> {
        self.play(
            FetchRecord::InboxPage(page),
            |s| s.inbox_pages.get(&page).cloned(),
            format!("inbox page {page}"),
        )
        .await
    }
}

#[async_trait]
impl ReadingsProvider for ScriptedSite {
    async fn readings_page(
        &self,
        _identity: &str,
        page: u32,
    ) -> Result<ReadingsPage, JourneyError> {
        self.play(
            FetchRecord::ReadingsPage(page),
            |s| s.readings_pages.get(&page).cloned(),
            format!("history page {page}"),
        )
        .await
    }
}
