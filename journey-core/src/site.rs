//! The remote site seam.
//!
//! Fetching and parsing are supplied by the caller: an implementation turns
//! "page N of resource R" into one of the parsed page types below. The crawl
//! engine never sees markup.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::JourneyError;

/// A fetched page that knows how many pages its resource has.
pub trait Paginated {
    /// Total page count reported by the page's pagination block (at least 1).
    fn total_pages(&self) -> u32;
}

/// One entry of the user's works listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkBlurb {
    /// Canonical work url.
    pub url: String,
    /// Displayed title.
    pub title: String,
    /// Displayed "last updated" text, e.g. `"14 Mar 2024"`.
    pub updated: String,
}

/// A page of the user's works listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorksListPage {
    /// Total listing pages.
    pub total_pages: u32,
    /// Works on this page in display order.
    pub works: Vec<WorkBlurb>,
}

impl Paginated for WorksListPage {
    fn total_pages(&self) -> u32 {
        self.total_pages.max(1)
    }
}

/// Everything extracted from a single work's detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkActivityRecord {
    /// Canonical work url; identity of the record.
    pub url: String,
    /// Work title.
    pub title: String,
    /// Published date text.
    pub published: String,
    /// Last status (update/completion) date text, when the work has one.
    pub updated: Option<String>,
    /// Lifetime word count.
    pub words: u64,
    /// Lifetime kudos.
    pub kudos: u64,
    /// Lifetime comments.
    pub comments: u64,
    /// Lifetime hits.
    pub hits: u64,
    /// Fandom labels.
    pub fandoms: Vec<String>,
    /// Relationship labels.
    pub relationships: Vec<String>,
    /// Freeform tag labels.
    pub tags: Vec<String>,
    /// Names of users who left kudos.
    pub kudos_givers: Vec<String>,
}

/// One received-comment notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxEntry {
    /// Linked commenter name from the entry heading, if any.
    pub commenter: Option<String>,
    /// Display timestamp text: relative ("3 days ago") or absolute.
    pub timestamp: String,
}

/// A page of the inbox, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxPage {
    /// Total inbox pages.
    pub total_pages: u32,
    /// Entries on this page.
    pub entries: Vec<InboxEntry>,
}

impl Paginated for InboxPage {
    fn total_pages(&self) -> u32 {
        self.total_pages.max(1)
    }
}

/// One reading-history entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingEntry {
    /// Work title.
    pub title: Option<String>,
    /// Work url.
    pub url: Option<String>,
    /// Work author.
    pub author: Option<String>,
    /// "Last visited" heading text, e.g. `"Last visited: 25 Dec 2024"`.
    pub last_visited: String,
    /// Visit count shown with the entry.
    pub visits: Option<u32>,
    /// Work word count.
    pub words: u64,
    /// Content rating label.
    pub rating: Option<String>,
    /// Fandom labels.
    pub fandoms: Vec<String>,
    /// Relationship labels.
    pub relationships: Vec<String>,
    /// Freeform tag labels.
    pub tags: Vec<String>,
}

/// A page of reading history, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingsPage {
    /// Total history pages.
    pub total_pages: u32,
    /// Entries on this page.
    pub entries: Vec<ReadingEntry>,
}

impl Paginated for ReadingsPage {
    fn total_pages(&self) -> u32 {
        self.total_pages.max(1)
    }
}

/// Focused role trait for sites that expose the user's works.
#[async_trait]
pub trait WorksProvider: Send + Sync {
    /// Fetch page `page` (1-based) of `identity`'s works listing.
    async fn works_page(&self, identity: &str, page: u32) -> Result<WorksListPage, JourneyError>;

    /// Fetch and parse a single work's detail page.
    async fn work_detail(&self, url: &str) -> Result<WorkActivityRecord, JourneyError>;
}

/// Focused role trait for sites that expose received-comment notifications.
#[async_trait]
pub trait InboxProvider: Send + Sync {
    /// Fetch page `page` (1-based) of `identity`'s inbox.
    async fn inbox_page(&self, identity: &str, page: u32) -> Result<InboxPage, JourneyError>;
}

/// Focused role trait for sites that expose reading history.
#[async_trait]
pub trait ReadingsProvider: Send + Sync {
    /// Fetch page `page` (1-based) of `identity`'s reading history.
    async fn readings_page(&self, identity: &str, page: u32)
    -> Result<ReadingsPage, JourneyError>;
}

/// The site a scan crawls.
///
/// Implementors resolve the session identity and advertise which resources
/// they can serve through the `as_*_provider` accessors. A resource left at
/// the default `None` is skipped by the orchestrator.
#[async_trait]
pub trait ActivitySite: Send + Sync {
    /// Stable site name used in logs.
    fn name(&self) -> &'static str;

    /// Resolve the logged-in account name, or `None` when there is no session.
    async fn identity(&self) -> Option<String>;

    /// Works listing and detail pages.
    fn as_works_provider(&self) -> Option<&dyn WorksProvider> {
        None
    }

    /// Inbox pages.
    fn as_inbox_provider(&self) -> Option<&dyn InboxProvider> {
        None
    }

    /// Reading-history pages.
    fn as_readings_provider(&self) -> Option<&dyn ReadingsProvider> {
        None
    }
}
