//! A work that was published in one year and last updated in another earns
//! its kudos, comments, hits and words over that whole span. The functions
//! here split lifetime totals across calendar years in proportion to the
//! number of days of the span that fall in each year.
//!
//! Each metric is rounded per year, half away from zero, and the per-year
//! shares are not renormalized: the sum over all years may differ from the
//! lifetime total by at most half a unit per year spanned.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

/// Lifetime totals of one work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkMetrics {
    /// Word count.
    pub words: u64,
    /// Kudos.
    pub kudos: u64,
    /// Comments.
    pub comments: u64,
    /// Hits.
    pub hits: u64,
}

impl WorkMetrics {
    fn scaled(self, days: u64, total: u64) -> Self {
        Self {
            words: share(self.words, days, total),
            kudos: share(self.kudos, days, total),
            comments: share(self.comments, days, total),
            hits: share(self.hits, days, total),
        }
    }
}

/// Year → metrics allocated to that year.
pub type Allocation = BTreeMap<i32, WorkMetrics>;

/// Number of days of the inclusive interval `[start, end]` in each calendar year.
///
/// Runs in one step per year spanned. Returns an empty map when `start > end`.
#[must_use]
pub fn days_per_year(start: NaiveDate, end: NaiveDate) -> BTreeMap<i32, u64> {
    let mut out = BTreeMap::new();
    if start > end {
        return out;
    }
    for year in start.year()..=end.year() {
        let (Some(first), Some(last)) = (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        ) else {
            continue;
        };
        let lo = start.max(first);
        let hi = end.min(last);
        let days = (hi - lo).num_days() + 1;
        if let Ok(days) = u64::try_from(days)
            && days > 0
        {
            out.insert(year, days);
        }
    }
    out
}

/// Distribute `metrics` over the years between `published` and `updated`.
///
/// * No publish date: nothing can be attributed, the result is empty.
/// * No update date, or an update date before the publish date: everything
///   goes to the publish year.
#[must_use]
pub fn attribute(
    published: Option<NaiveDate>,
    updated: Option<NaiveDate>,
    metrics: WorkMetrics,
) -> Allocation {
    let Some(published) = published else {
        return Allocation::new();
    };
    let single = || Allocation::from([(published.year(), metrics)]);
    let Some(updated) = updated else {
        return single();
    };

    let days = days_per_year(published, updated);
    let total: u64 = days.values().sum();
    if total == 0 {
        return single();
    }
    days.into_iter()
        .map(|(year, d)| (year, metrics.scaled(d, total)))
        .collect()
}

/// `round(value * days / total)` with halves rounded up, in integer arithmetic.
fn share(value: u64, days: u64, total: u64) -> u64 {
    let num = 2 * u128::from(value) * u128::from(days) + u128::from(total);
    let den = 2 * u128::from(total);
    u64::try_from(num / den).unwrap_or(u64::MAX)
}
