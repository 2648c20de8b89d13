//! Relative time phrases ("3 years ago", "in 2 days")
//!
//! The host's relative-time element replaces this text and keeps it current;
//! the phrase only covers the first paint and hosts without the element.

use chrono::{DateTime, TimeDelta, Utc};

const UNITS: &[(&str, i64)] = &[
    ("year", 365 * 24 * 3600),
    ("month", 30 * 24 * 3600),
    ("day", 24 * 3600),
    ("hour", 3600),
    ("minute", 60),
    ("second", 1),
];

/// Anything closer than this reads as "now".
const NOW_WINDOW_SECS: i64 = 10;

/// English phrase for `ts` as seen from `now`.
pub fn relative_phrase(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(ts).num_seconds();
    let abs = delta.saturating_abs();

    if abs < NOW_WINDOW_SECS {
        return "now".to_string();
    }

    let (unit, size) = UNITS
        .iter()
        .copied()
        .find(|(_, size)| abs >= *size)
        .unwrap_or(("second", 1));
    let count = abs / size;
    let plural = if count == 1 { "" } else { "s" };

    if delta > 0 {
        format!("{} {}{} ago", count, unit, plural)
    } else {
        format!("in {} {}{}", count, unit, plural)
    }
}

/// True when `ts` is further than `years` from `now` in either direction.
pub fn exceeds_threshold(ts: DateTime<Utc>, now: DateTime<Utc>, years: u32) -> bool {
    let days = i64::from(years) * 365 + i64::from(years / 4);
    match TimeDelta::try_days(days) {
        Some(limit) => now.signed_duration_since(ts).abs() > limit,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_now_window() {
        let now = at(2024, 1, 1, 0);
        assert_eq!(relative_phrase(now, now), "now");
        assert_eq!(relative_phrase(now - TimeDelta::seconds(5), now), "now");
    }

    #[test]
    fn test_past_phrases() {
        let now = at(2026, 1, 10, 12);
        assert_eq!(relative_phrase(at(2023, 1, 1, 0), now), "3 years ago");
        assert_eq!(relative_phrase(at(2026, 1, 9, 12), now), "1 day ago");
        assert_eq!(relative_phrase(at(2026, 1, 10, 10), now), "2 hours ago");
        assert_eq!(relative_phrase(now - TimeDelta::seconds(45), now), "45 seconds ago");
    }

    #[test]
    fn test_future_phrases() {
        let now = at(2026, 1, 10, 12);
        assert_eq!(relative_phrase(at(2026, 1, 12, 12), now), "in 2 days");
        assert_eq!(relative_phrase(now + TimeDelta::minutes(1), now), "in 1 minute");
    }

    #[test]
    fn test_threshold() {
        let now = at(2026, 1, 1, 0);
        assert!(!exceeds_threshold(at(1970, 1, 1, 0), now, 100));
        assert!(exceeds_threshold(at(1900, 1, 1, 0), now, 100));
        assert!(exceeds_threshold(at(2200, 1, 1, 0), now, 100));
    }
}
