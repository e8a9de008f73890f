#![allow(dead_code)]
// Shared builders and fixtures for the journey integration tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use journey::{
    FixedClock, InboxEntry, InboxPage, Journey, JourneyBuilder, JourneyError, MemoryBackend,
    ProgressSink, ProgressUpdate, ReadingEntry, ReadingsPage, StateBackend, WorkActivityRecord,
    WorkBlurb, WorksListPage,
};
use journey_mock::{ScriptedSite, ScriptedSiteController, work_url};

/// Identity every scripted site is signed in as.
pub const ME: &str = "reader";

/// Construct a UTC `DateTime` at noon for readability in tests.
pub fn dt(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .expect("valid date")
        .and_utc()
}

pub fn clock_at(y: i32, m: u32, d: u32) -> Arc<FixedClock> {
    Arc::new(FixedClock::new(dt(y, m, d)))
}

/// Builder with a clock fixed at 1 July 2024 and no request delay.
pub fn builder() -> JourneyBuilder {
    Journey::builder()
        .clock(clock_at(2024, 7, 1))
        .request_delay(Duration::ZERO)
}

/// Scripted site whose three resources are each a single empty page.
pub async fn empty_site() -> (Arc<ScriptedSite>, ScriptedSiteController) {
    let (site, ctl) = ScriptedSite::new_with_controller(ME);
    ctl.set_works_pages(vec![WorksListPage {
        total_pages: 1,
        works: vec![],
    }])
    .await;
    ctl.set_inbox_pages(vec![inbox_page(1, &[])]).await;
    ctl.set_readings_pages(vec![readings_page(1, &[])]).await;
    (site, ctl)
}

/// Inbox page from `(commenter, timestamp)` pairs.
pub fn inbox_page(total_pages: u32, entries: &[(&str, &str)]) -> InboxPage {
    InboxPage {
        total_pages,
        entries: entries
            .iter()
            .map(|(who, when)| InboxEntry {
                commenter: Some((*who).to_string()),
                timestamp: (*when).to_string(),
            })
            .collect(),
    }
}

/// Reading-history page from `(title, visited date)` pairs.
pub fn readings_page(total_pages: u32, entries: &[(&str, &str)]) -> ReadingsPage {
    ReadingsPage {
        total_pages,
        entries: entries
            .iter()
            .map(|(title, visited)| reading(title, visited))
            .collect(),
    }
}

pub fn reading(title: &str, visited: &str) -> ReadingEntry {
    ReadingEntry {
        title: Some(title.to_string()),
        url: Some(format!("https://archive.mock/read/{}", title.len())),
        author: Some("someone".to_string()),
        last_visited: format!("Last visited: {visited}"),
        visits: Some(1),
        words: 1000,
        ..ReadingEntry::default()
    }
}

pub fn blurb(id: u32, updated: &str) -> WorkBlurb {
    WorkBlurb {
        url: work_url(id),
        title: format!("Work {id}"),
        updated: updated.to_string(),
    }
}

pub fn work(id: u32, published: &str, updated: Option<&str>, words: u64) -> WorkActivityRecord {
    WorkActivityRecord {
        url: work_url(id),
        title: format!("Work {id}"),
        published: published.to_string(),
        updated: updated.map(str::to_string),
        words,
        kudos: 10,
        comments: 2,
        hits: 100,
        fandoms: vec!["Fandom".to_string()],
        ..WorkActivityRecord::default()
    }
}

/// Collects every progress update.
#[derive(Default, Clone)]
pub struct ProgressLog(Arc<Mutex<Vec<ProgressUpdate>>>);

impl ProgressLog {
    pub fn updates(&self) -> Vec<ProgressUpdate> {
        self.0.lock().unwrap().clone()
    }

    pub fn percents(&self) -> Vec<u8> {
        self.updates().iter().filter_map(|u| u.percent).collect()
    }
}

impl ProgressSink for ProgressLog {
    fn on_progress(&self, update: &ProgressUpdate) {
        self.0.lock().unwrap().push(update.clone());
    }
}

/// Memory backend that records every successful write.
#[derive(Default)]
pub struct RecordingBackend {
    inner: MemoryBackend,
    writes: Mutex<Vec<(String, String)>>,
}

impl RecordingBackend {
    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.lock().unwrap().clone()
    }

    /// `lastPage` of every progress row written, in order.
    pub fn checkpoint_pages(&self) -> Vec<(String, u64)> {
        self.writes()
            .iter()
            .filter(|(key, _)| key.starts_with("journey.progress."))
            .map(|(_, body)| {
                let row: serde_json::Value = serde_json::from_str(body).unwrap();
                (
                    row["stage"].as_str().unwrap().to_string(),
                    row["lastPage"].as_u64().unwrap(),
                )
            })
            .collect()
    }
}

#[async_trait]
impl StateBackend for RecordingBackend {
    async fn load(&self, key: &str) -> Result<Option<String>, JourneyError> {
        self.inner.load(key).await
    }

    async fn store(&self, key: &str, value: &str) -> Result<(), JourneyError> {
        self.inner.store(key, value).await?;
        self.writes
            .lock()
            .unwrap()
            .push((key.to_string(), value.to_string()));
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), JourneyError> {
        self.inner.remove(key).await
    }
}
