//! Token fields -> validated instant
//!
//! A token that matches the grammar can still name a day that does not exist
//! (`2023-13-45`) or a second count no clock can hold. Those resolve to
//! `None` and the raw text stays as it is.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::scanner::token::TokenFields;

/// A point in time that passed validation
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResolvedTimestamp {
    instant: DateTime<Utc>,
}

impl ResolvedTimestamp {
    pub fn from_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(|instant| Self { instant })
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    pub fn millis(&self) -> i64 {
        self.instant.timestamp_millis()
    }

    /// Machine-readable form: UTC, millisecond precision, `Z` suffix.
    ///
    /// Years outside 0..=9999 use the signed six-digit expanded form so
    /// `Date.parse` on the host still accepts the value.
    pub fn iso(&self) -> String {
        let year = self.instant.year();
        let rest = self.instant.format("%m-%dT%H:%M:%S%.3fZ");
        if (0..=9999).contains(&year) {
            format!("{:04}-{}", year, rest)
        } else {
            let sign = if year < 0 { '-' } else { '+' };
            format!("{}{:06}-{}", sign, year.unsigned_abs(), rest)
        }
    }
}

/// Resolve extracted fields to an instant, or `None` when they do not name one.
pub fn resolve(fields: &TokenFields) -> Option<ResolvedTimestamp> {
    match fields {
        TokenFields::Rfc3339 { date, time: None } => resolve_date(date),
        TokenFields::Rfc3339 { date, time: Some(time) } => resolve_date_time(date, time),
        TokenFields::EpochTag { seconds, .. } => resolve_epoch_seconds(seconds),
    }
}

/// `YYYY-MM-DD` at midnight UTC
fn resolve_date(date: &str) -> Option<ResolvedTimestamp> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let instant = day.and_hms_opt(0, 0, 0)?.and_utc();
    Some(ResolvedTimestamp { instant })
}

/// `time` starts at the `T`; seconds may be missing.
fn resolve_date_time(date: &str, time: &str) -> Option<ResolvedTimestamp> {
    // "THH:MM" is 6 bytes; a ':' right after it means seconds are present
    let clock_end = 6;
    let has_seconds = time.as_bytes().get(clock_end) == Some(&b':');

    let normalized = if has_seconds {
        format!("{}{}", date, time)
    } else {
        format!("{}{}:00{}", date, time.get(..clock_end)?, time.get(clock_end..)?)
    };

    let instant = DateTime::parse_from_rfc3339(&normalized).ok()?.with_timezone(&Utc);
    Some(ResolvedTimestamp { instant })
}

fn resolve_epoch_seconds(seconds: &str) -> Option<ResolvedTimestamp> {
    let seconds: i64 = seconds.parse().ok()?;
    let millis = seconds.checked_mul(1000)?;
    ResolvedTimestamp::from_millis(millis)
}

// =============================================================================
// Tests
// =============================================================================
