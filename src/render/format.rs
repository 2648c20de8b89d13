//! Locale formatting
//!
//! Widgets never format dates themselves. They ask a [`LocaleFormatter`]:
//! - `ChronoFormatter`: native, strftime patterns, fixed viewer offset
//! - `IntlFormatter`: WASM, the host's `Date.prototype.toLocaleString`
//!
//! A failed format never escapes: `format` falls back to the ISO instant.

use chrono::{FixedOffset, Local, Offset, Utc};
use std::fmt::Write;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::config::{ChronotagConfig, FormatPatterns};
use crate::error::ChronotagError;
use crate::scanner::resolve::ResolvedTimestamp;

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    /// Calendar date only
    Date,
    /// Date and clock time
    DateTime,
    /// Long date with weekday, no time
    FullDate,
    /// Long date with weekday, time and zone
    FullDateTime,
}

impl DateStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateStyle::Date => "date",
            DateStyle::DateTime => "date_time",
            DateStyle::FullDate => "full_date",
            DateStyle::FullDateTime => "full_date_time",
        }
    }
}

/// Zone a formatted string is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Utc,
    /// Whatever zone the person reading the document is in
    Viewer,
}

pub trait LocaleFormatter {
    fn try_format(
        &self,
        ts: &ResolvedTimestamp,
        style: DateStyle,
        zone: Zone,
    ) -> Result<String, ChronotagError>;

    fn format(&self, ts: &ResolvedTimestamp, style: DateStyle, zone: Zone) -> String {
        self.try_format(ts, style, zone)
            .unwrap_or_else(|_| ts.iso())
    }
}

// =============================================================================
// Native formatter
// =============================================================================

#[derive(Debug, Clone)]
pub struct ChronoFormatter {
    viewer: FixedOffset,
    patterns: FormatPatterns,
}

impl ChronoFormatter {
    pub fn utc() -> Self {
        Self::with_offset(Utc.fix())
    }

    /// Viewer zone taken from the process local offset at construction time.
    pub fn local() -> Self {
        Self::with_offset(Local::now().offset().fix())
    }

    pub fn with_offset(viewer: FixedOffset) -> Self {
        Self {
            viewer,
            patterns: FormatPatterns::default(),
        }
    }

    pub fn with_offset_minutes(minutes: i32) -> Result<Self, ChronotagError> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(Self::with_offset)
            .ok_or(ChronotagError::InvalidOffset { minutes })
    }

    /// Viewer zone and patterns from `config`; the local zone when no offset is set.
    pub fn from_config(config: &ChronotagConfig) -> Result<Self, ChronotagError> {
        let formatter = match config.viewer_offset_minutes {
            Some(minutes) => Self::with_offset_minutes(minutes)?,
            None => Self::local(),
        };
        Ok(formatter.patterns(config.patterns.clone()))
    }

    pub fn patterns(mut self, patterns: FormatPatterns) -> Self {
        self.patterns = patterns;
        self
    }

    fn pattern(&self, style: DateStyle) -> &str {
        match style {
            DateStyle::Date => &self.patterns.date,
            DateStyle::DateTime => &self.patterns.date_time,
            DateStyle::FullDate => &self.patterns.full_date,
            DateStyle::FullDateTime => &self.patterns.full_date_time,
        }
    }
}

impl LocaleFormatter for ChronoFormatter {
    fn try_format(
        &self,
        ts: &ResolvedTimestamp,
        style: DateStyle,
        zone: Zone,
    ) -> Result<String, ChronotagError> {
        let offset = match zone {
            Zone::Utc => Utc.fix(),
            Zone::Viewer => self.viewer,
        };
        let pattern = self.pattern(style);
        let local = ts.instant().with_timezone(&offset);

        // DelayedFormat reports bad specifiers as fmt::Error
        let mut out = String::new();
        write!(out, "{}", local.format(pattern)).map_err(|_| ChronotagError::Format {
            style: style.as_str(),
            reason: format!("invalid pattern '{}'", pattern),
        })?;

        if style == DateStyle::FullDateTime {
            out.push(' ');
            out.push_str(&zone_label(offset));
        }
        Ok(out)
    }
}

/// "UTC", "GMT+1", "GMT-5:30"
fn zone_label(offset: FixedOffset) -> String {
    let secs = offset.local_minus_utc();
    if secs == 0 {
        return "UTC".to_string();
    }
    let sign = if secs < 0 { '-' } else { '+' };
    let hours = secs.abs() / 3600;
    let minutes = (secs.abs() % 3600) / 60;
    if minutes == 0 {
        format!("GMT{}{}", sign, hours)
    } else {
        format!("GMT{}{}:{:02}", sign, hours, minutes)
    }
}

// =============================================================================
// Host formatter (WASM)
// =============================================================================

/// Formats through `Intl` on the host. Only usable inside a JS runtime.
#[derive(Debug, Clone, Default)]
pub struct IntlFormatter {
    locale: Option<String>,
}

impl IntlFormatter {
    pub fn new(locale: Option<String>) -> Self {
        Self { locale }
    }

    fn options(style: DateStyle, zone: Zone) -> Result<js_sys::Object, JsValue> {
        let options = js_sys::Object::new();
        let (date_style, time_style) = match style {
            DateStyle::Date => ("medium", None),
            DateStyle::DateTime => ("medium", Some("short")),
            DateStyle::FullDate => ("full", None),
            // "long" includes the zone abbreviation
            DateStyle::FullDateTime => ("full", Some("long")),
        };
        js_sys::Reflect::set(&options, &"dateStyle".into(), &date_style.into())?;
        if let Some(time_style) = time_style {
            js_sys::Reflect::set(&options, &"timeStyle".into(), &time_style.into())?;
        }
        if zone == Zone::Utc {
            js_sys::Reflect::set(&options, &"timeZone".into(), &"UTC".into())?;
        }
        Ok(options)
    }
}

/// `date.toLocaleString(locales, options)`, looked up on the object so a
/// RangeError from a bad locale or option combination comes back as Err.
fn to_locale_string(date: &js_sys::Date, locales: &JsValue, options: &JsValue) -> Result<String, JsValue> {
    let method = js_sys::Reflect::get(date, &"toLocaleString".into())?
        .dyn_into::<js_sys::Function>()?;
    method
        .call2(date, locales, options)?
        .as_string()
        .ok_or_else(|| JsValue::from_str("toLocaleString returned a non-string"))
}

impl LocaleFormatter for IntlFormatter {
    fn try_format(
        &self,
        ts: &ResolvedTimestamp,
        style: DateStyle,
        zone: Zone,
    ) -> Result<String, ChronotagError> {
        let to_error = |e: JsValue| ChronotagError::Format {
            style: style.as_str(),
            reason: format!("{:?}", e),
        };

        let date = js_sys::Date::new(&JsValue::from_f64(ts.millis() as f64));
        let locales = match &self.locale {
            Some(tag) => JsValue::from_str(tag),
            None => JsValue::UNDEFINED,
        };
        let options = Self::options(style, zone).map_err(to_error)?;
        to_locale_string(&date, &locales, &options).map_err(to_error)
    }

    fn format(&self, ts: &ResolvedTimestamp, style: DateStyle, zone: Zone) -> String {
        match self.try_format(ts, style, zone) {
            Ok(s) => s,
            Err(e) => {
                web_sys::console::warn_1(&format!("[IntlFormatter] {}; using ISO form", e).into());
                ts.iso()
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(millis: i64) -> ResolvedTimestamp {
        ResolvedTimestamp::from_millis(millis).unwrap()
    }

    // 2023-01-01T10:00:00Z
    const NEW_YEAR_10AM: i64 = 1_672_567_200_000;

    #[test]
    fn test_date_style_has_no_time_of_day() {
        let f = ChronoFormatter::utc();
        let out = f.format(&ts(1_672_531_200_000), DateStyle::Date, Zone::Utc);
        assert_eq!(out, "Jan 1, 2023");
    }

    #[test]
    fn test_date_time_in_viewer_zone() {
        let f = ChronoFormatter::with_offset_minutes(60).unwrap();
        let out = f.format(&ts(NEW_YEAR_10AM), DateStyle::DateTime, Zone::Viewer);
        assert_eq!(out, "Jan 1, 2023, 11:00 AM");
    }

    #[test]
    fn test_full_date_time_appends_zone_label() {
        let f = ChronoFormatter::with_offset_minutes(-330).unwrap();
        let out = f.format(&ts(NEW_YEAR_10AM), DateStyle::FullDateTime, Zone::Viewer);
        assert_eq!(out, "Sunday, January 1, 2023 at 4:30:00 AM GMT-5:30");

        let out = ChronoFormatter::utc().format(&ts(NEW_YEAR_10AM), DateStyle::FullDateTime, Zone::Viewer);
        assert!(out.ends_with(" UTC"));
    }

    #[test]
    fn test_utc_zone_ignores_viewer_offset() {
        // Midnight UTC would be the previous evening for a viewer at -8h
        let f = ChronoFormatter::with_offset_minutes(-480).unwrap();
        let midnight = ts(1_672_531_200_000);
        assert_eq!(f.format(&midnight, DateStyle::FullDate, Zone::Utc), "Sunday, January 1, 2023");
        assert_eq!(f.format(&midnight, DateStyle::FullDate, Zone::Viewer), "Saturday, December 31, 2022");
    }

    #[test]
    fn test_bad_pattern_falls_back_to_iso() {
        let patterns = FormatPatterns {
            date: "%Q".to_string(),
            ..FormatPatterns::default()
        };
        let f = ChronoFormatter::utc().patterns(patterns);
        let midnight = ts(1_672_531_200_000);

        assert!(matches!(
            f.try_format(&midnight, DateStyle::Date, Zone::Utc),
            Err(ChronotagError::Format { style: "date", .. })
        ));
        assert_eq!(f.format(&midnight, DateStyle::Date, Zone::Utc), "2023-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_from_config() {
        let config = ChronotagConfig {
            viewer_offset_minutes: Some(60),
            ..ChronotagConfig::utc()
        };
        let f = ChronoFormatter::from_config(&config).unwrap();
        assert_eq!(
            f.format(&ts(NEW_YEAR_10AM), DateStyle::DateTime, Zone::Viewer),
            "Jan 1, 2023, 11:00 AM"
        );

        let utc = ChronoFormatter::from_config(&ChronotagConfig::utc()).unwrap();
        assert_eq!(utc.format(&ts(NEW_YEAR_10AM), DateStyle::DateTime, Zone::Viewer), "Jan 1, 2023, 10:00 AM");

        let bad = ChronotagConfig {
            viewer_offset_minutes: Some(5000),
            ..ChronotagConfig::default()
        };
        assert!(matches!(
            ChronoFormatter::from_config(&bad),
            Err(ChronotagError::InvalidOffset { minutes: 5000 })
        ));
    }

    #[test]
    fn test_offset_out_of_range() {
        assert!(ChronoFormatter::with_offset_minutes(24 * 60).is_err());
    }

    #[test]
    fn test_zone_label() {
        assert_eq!(zone_label(FixedOffset::east_opt(0).unwrap()), "UTC");
        assert_eq!(zone_label(FixedOffset::east_opt(3600).unwrap()), "GMT+1");
        assert_eq!(zone_label(FixedOffset::west_opt(9000).unwrap()), "GMT-2:30");
    }
}
