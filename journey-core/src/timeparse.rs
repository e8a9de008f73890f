use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Months, NaiveDate, TimeDelta, Utc};
use regex::Regex;

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b((?:19|20)\d{2})\b").expect("year regex should compile"));

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").expect("iso date regex should compile")
});

static DAY_MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})\s+([A-Za-z]{3,9})\.?,?\s+(\d{4})\b")
        .expect("day-month-year regex should compile")
});

static MONTH_DAY_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z]{3,9})\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b")
        .expect("month-day-year regex should compile")
});

static AGO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+)\s+(second|minute|hour|day|week|month|year)s?\s+ago\b")
        .expect("relative time regex should compile")
});

static BARE_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:second|minute|hour)s?\b").expect("time unit regex should compile")
});

/// First standalone 19xx/20xx year in `text`.
#[must_use]
pub fn extract_year(text: &str) -> Option<i32> {
    YEAR.captures(text)?.get(1)?.as_str().parse().ok()
}

/// Parse a displayed calendar date.
///
/// Accepts `"25 Dec 2024"`, `"December 25, 2024"`, `"Dec 25 2024"` and
/// `"2024-12-25"`. Text carrying only a year resolves to 1 January of it.
#[must_use]
pub fn parse_calendar_date(text: &str) -> Option<NaiveDate> {
    if let Some(c) = ISO_DATE.captures(text) {
        let date = NaiveDate::from_ymd_opt(
            c[1].parse().ok()?,
            c[2].parse().ok()?,
            c[3].parse().ok()?,
        );
        if date.is_some() {
            return date;
        }
    }
    if let Some(c) = DAY_MONTH_YEAR.captures(text)
        && let Some(month) = month_number(&c[2])
        && let Some(date) =
            NaiveDate::from_ymd_opt(c[3].parse().ok()?, month, c[1].parse().ok()?)
    {
        return Some(date);
    }
    if let Some(c) = MONTH_DAY_YEAR.captures(text)
        && let Some(month) = month_number(&c[1])
        && let Some(date) =
            NaiveDate::from_ymd_opt(c[3].parse().ok()?, month, c[2].parse().ok()?)
    {
        return Some(date);
    }
    NaiveDate::from_ymd_opt(extract_year(text)?, 1, 1)
}

fn month_number(name: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    let lower = name.to_ascii_lowercase();
    let prefix = lower.get(..3)?;
    let idx = MONTHS.iter().position(|m| *m == prefix)?;
    u32::try_from(idx + 1).ok()
}

/// Strategy that maps a displayed timestamp to the calendar year it refers to.
pub trait TimeResolver: Send + Sync {
    /// Year referred to by `text`, judged at instant `now`; `None` when unknown.
    fn resolve_year(&self, text: &str, now: DateTime<Utc>) -> Option<i32>;
}

/// English relative-time phrases with an absolute-year fallback.
///
/// * `"<n> <unit>s ago"` for seconds through years;
/// * `"yesterday"`, `"a day ago"`, `"a week ago"`, `"a month ago"`, `"a year ago"`;
/// * `"today"`, `"less than a minute"` and bare hour/minute/second phrases
///   mean the current year;
/// * otherwise the first 19xx/20xx token in the text.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelativeTimeResolver;

impl RelativeTimeResolver {
    fn shift(now: DateTime<Utc>, n: u32, unit: &str) -> Option<DateTime<Utc>> {
        let n64 = i64::from(n);
        match unit {
            "second" => now.checked_sub_signed(TimeDelta::try_seconds(n64)?),
            "minute" => now.checked_sub_signed(TimeDelta::try_minutes(n64)?),
            "hour" => now.checked_sub_signed(TimeDelta::try_hours(n64)?),
            "day" => now.checked_sub_signed(TimeDelta::try_days(n64)?),
            "week" => now.checked_sub_signed(TimeDelta::try_weeks(n64)?),
            "month" => now.checked_sub_months(Months::new(n)),
            "year" => now.checked_sub_months(Months::new(n.checked_mul(12)?)),
            _ => None,
        }
    }
}

impl TimeResolver for RelativeTimeResolver {
    fn resolve_year(&self, text: &str, now: DateTime<Utc>) -> Option<i32> {
        if let Some(c) = AGO.captures(text)
            && let Ok(n) = c[1].parse::<u32>()
            && let Some(at) = Self::shift(now, n, &c[2].to_ascii_lowercase())
        {
            return Some(at.year());
        }

        let lower = text.to_ascii_lowercase();
        let special = [
            ("yesterday", 1, "day"),
            ("a day ago", 1, "day"),
            ("a week ago", 1, "week"),
            ("a month ago", 1, "month"),
            ("a year ago", 1, "year"),
        ];
        for (phrase, n, unit) in special {
            if lower.contains(phrase) {
                return Self::shift(now, n, unit).map(|at| at.year());
            }
        }
        if lower.contains("today") || lower.contains("less than") || BARE_UNIT.is_match(&lower) {
            return Some(now.year());
        }
        extract_year(text)
    }
}
