//! Per-year statistics accumulated by a scan.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::tally::Tally;

/// One of a creator's works as listed in a year's top-works table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopWork {
    /// Work title.
    pub title: String,
    /// Canonical work url; identity of the entry.
    pub url: String,
    /// Lifetime kudos.
    pub kudos: u64,
    /// Lifetime comments.
    pub comments: u64,
    /// Lifetime hits.
    pub hits: u64,
    /// Ranking score: `kudos + 2 * comments`.
    pub score: u64,
}

impl TopWork {
    /// Build an entry, deriving `score` from kudos and comments.
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        kudos: u64,
        comments: u64,
        hits: u64,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            kudos,
            comments,
            hits,
            score: kudos.saturating_add(comments.saturating_mul(2)),
        }
    }
}

/// Creator-side counters for a single year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreatorStats {
    /// Distinct works that contributed to this year.
    pub works: u64,
    /// Allocated words.
    pub words: u64,
    /// Allocated kudos.
    pub kudos: u64,
    /// Allocated comments.
    pub comments: u64,
    /// Allocated hits.
    pub hits: u64,
    /// Fandom → allocated words.
    pub fandoms: Tally,
    /// Relationship → allocated words.
    pub relationships: Tally,
    /// Freeform tag → number of works.
    pub tags: Tally,
    /// Works contributing to this year, one entry per url.
    pub top_works: Vec<TopWork>,
    /// Commenter name → comments received this year.
    pub commenters: Tally,
    /// Kudos giver name → works they left kudos on.
    pub kudos_givers: Tally,
}

impl CreatorStats {
    /// Append `work` unless an entry with the same url already exists.
    ///
    /// Returns `true` when the entry was added.
    pub fn record_top_work(&mut self, work: TopWork) -> bool {
        if self.top_works.iter().any(|w| w.url == work.url) {
            return false;
        }
        self.top_works.push(work);
        true
    }

    /// Highest-scoring works, one per title, descending by score.
    #[must_use]
    pub fn top_works(&self, n: usize) -> Vec<&TopWork> {
        let mut by_title: BTreeMap<&str, &TopWork> = BTreeMap::new();
        for w in &self.top_works {
            match by_title.get(w.title.as_str()) {
                Some(existing) if existing.score >= w.score => {}
                _ => {
                    by_title.insert(w.title.as_str(), w);
                }
            }
        }
        let mut out: Vec<&TopWork> = by_title.into_values().collect();
        out.sort_by(|a, b| b.score.cmp(&a.score));
        out.truncate(n);
        out
    }
}

/// Visit bookkeeping for one work in a reader's year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkVisit {
    /// Accumulated visits.
    pub visits: u64,
    /// Work url as first seen.
    pub url: String,
}

/// Reader-side view of one author within a year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthorStats {
    /// Distinct titles read from this author.
    pub works_seen: BTreeSet<String>,
    /// Accumulated visits across all of the author's works.
    pub visits: u64,
    /// The author's most-visited work seen so far.
    pub top_work: Option<String>,
    /// Visits recorded for `top_work`.
    pub top_work_visits: u64,
}

impl AuthorStats {
    /// Record `visits` to `title`.
    pub fn record(&mut self, title: &str, visits: u64) {
        self.works_seen.insert(title.to_string());
        self.visits += visits;
        if visits > self.top_work_visits {
            self.top_work = Some(title.to_string());
            self.top_work_visits = visits;
        }
    }
}

/// Reader-side counters for a single year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReaderStats {
    /// Distinct works read this year.
    pub fics: u64,
    /// Words of distinct works read this year.
    pub words: u64,
    /// Visits to mature or explicit works.
    pub mature_clicks: u64,
    /// Fandom → entries.
    pub fandoms: Tally,
    /// Relationship → entries.
    pub relationships: Tally,
    /// Freeform tag → entries.
    pub tags: Tally,
    /// Title → visit bookkeeping.
    pub work_visits: BTreeMap<String, WorkVisit>,
    /// Author name → reading summary.
    pub authors: BTreeMap<String, AuthorStats>,
}

impl ReaderStats {
    /// Add `visits` to `title`, creating the entry on first sight.
    ///
    /// Returns `true` when this is the first time the title is seen this year.
    pub fn visit_work(&mut self, title: &str, url: &str, visits: u64) -> bool {
        let mut is_new = false;
        let entry = self
            .work_visits
            .entry(title.to_string())
            .or_insert_with(|| {
                is_new = true;
                WorkVisit {
                    visits: 0,
                    url: url.to_string(),
                }
            });
        entry.visits += visits;
        is_new
    }

    /// Most revisited works, descending by visits.
    #[must_use]
    pub fn most_revisited(&self, n: usize) -> Vec<(&str, &WorkVisit)> {
        let mut out: Vec<(&str, &WorkVisit)> = self
            .work_visits
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect();
        out.sort_by(|a, b| b.1.visits.cmp(&a.1.visits));
        out.truncate(n);
        out
    }

    /// Author with the most distinct works read, ties broken by visits.
    #[must_use]
    pub fn favorite_author(&self) -> Option<(&str, &AuthorStats)> {
        self.authors
            .iter()
            .max_by(|a, b| {
                a.1.works_seen
                    .len()
                    .cmp(&b.1.works_seen.len())
                    .then(a.1.visits.cmp(&b.1.visits))
                    .then(b.0.cmp(a.0))
            })
            .map(|(k, v)| (k.as_str(), v))
    }
}

/// Everything recorded for one calendar year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct YearRecord {
    /// Statistics about the user's own works.
    pub creator: CreatorStats,
    /// Statistics about the user's reading.
    pub reader: ReaderStats,
}

/// Year → record accumulator owned by a single scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct YearlyStats(BTreeMap<i32, YearRecord>);

impl YearlyStats {
    /// Create an empty accumulator.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Record for `year`, created empty on first access.
    pub fn entry(&mut self, year: i32) -> &mut YearRecord {
        self.0.entry(year).or_default()
    }

    /// Record for `year`, if any.
    #[must_use]
    pub fn get(&self, year: i32) -> Option<&YearRecord> {
        self.0.get(&year)
    }

    /// Insert or replace the record for `year`.
    pub fn insert(&mut self, year: i32, record: YearRecord) -> Option<YearRecord> {
        self.0.insert(year, record)
    }

    /// Remove and return the record for `year`.
    pub fn remove(&mut self, year: i32) -> Option<YearRecord> {
        self.0.remove(&year)
    }

    /// Whether a record exists for `year`.
    #[must_use]
    pub fn contains(&self, year: i32) -> bool {
        self.0.contains_key(&year)
    }

    /// Years with a record, ascending.
    #[must_use]
    pub fn years(&self) -> Vec<i32> {
        self.0.keys().copied().collect()
    }

    /// Years with a record, newest first.
    #[must_use]
    pub fn years_desc(&self) -> Vec<i32> {
        self.0.keys().rev().copied().collect()
    }

    /// Number of years recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no year has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(year, record)` ascending by year.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &YearRecord)> {
        self.0.iter().map(|(y, r)| (*y, r))
    }

    /// Copy of the records for years strictly before `year`.
    #[must_use]
    pub fn before(&self, year: i32) -> Self {
        Self(self.0.range(..year).map(|(y, r)| (*y, r.clone())).collect())
    }
}

/// Strip the trailing " - Relationship" marker some tag pages append.
#[must_use]
pub fn clean_relationship_tag(tag: &str) -> &str {
    let trimmed = tag.trim_end();
    let lower = trimmed.to_ascii_lowercase();
    if let Some(idx) = lower.rfind("relationship")
        && idx + "relationship".len() == lower.len()
    {
        let head = trimmed[..idx].trim_end();
        if let Some(stripped) = head.strip_suffix('-') {
            return stripped.trim();
        }
    }
    trimmed.trim()
}
