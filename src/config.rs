//! Configuration types and defaults
//!
//! Every field has a default, so the host can send `{}` or only the keys it
//! cares about.

use serde::{Deserialize, Serialize};

use crate::error::ChronotagError;
use crate::scanner::token::Syntax;

// =============================================================================
// Class Names
// =============================================================================

/// CSS classes placed on the rendered fragment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassNames {
    /// Outer wrapper. The syntax name is appended as `{widget}-{syntax}`.
    pub widget: String,
    pub absolute: String,
    pub relative: String,
}

impl Default for ClassNames {
    fn default() -> Self {
        Self {
            widget: "timestamp".to_string(),
            absolute: "timestamp-absolute".to_string(),
            relative: "timestamp-relative".to_string(),
        }
    }
}

// =============================================================================
// Format Patterns
// =============================================================================

/// strftime patterns used by the native formatter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FormatPatterns {
    /// Absolute label for date-only tokens. Default: "Jan 1, 2023"
    pub date: String,
    /// Absolute label for date-time tokens. Default: "Jan 1, 2023, 10:00 AM"
    pub date_time: String,
    /// Tooltip for date-only tokens. Default: "Sunday, January 1, 2023"
    pub full_date: String,
    /// Tooltip for date-time tokens; the zone label is appended.
    pub full_date_time: String,
}

impl Default for FormatPatterns {
    fn default() -> Self {
        Self {
            date: "%b %-d, %Y".to_string(),
            date_time: "%b %-d, %Y, %-I:%M %p".to_string(),
            full_date: "%A, %B %-d, %Y".to_string(),
            full_date_time: "%A, %B %-d, %Y at %-I:%M:%S %p".to_string(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChronotagConfig {
    /// Enabled pipelines. Default: both
    pub syntaxes: Vec<Syntax>,
    /// BCP 47 tag handed to the host formatter. None uses the host default.
    pub locale: Option<String>,
    pub classes: ClassNames,
    /// Age in years past which RFC 3339 widgets show an absolute date. Default: 100
    pub relative_threshold_years: u32,
    /// Viewer zone for native rendering, minutes east of UTC. None uses the
    /// process local zone.
    pub viewer_offset_minutes: Option<i32>,
    pub patterns: FormatPatterns,
}

impl Default for ChronotagConfig {
    fn default() -> Self {
        Self {
            syntaxes: Syntax::ALL.to_vec(),
            locale: None,
            classes: ClassNames::default(),
            relative_threshold_years: 100,
            viewer_offset_minutes: None,
            patterns: FormatPatterns::default(),
        }
    }
}

impl ChronotagConfig {
    pub fn rfc3339_only() -> Self {
        Self {
            syntaxes: vec![Syntax::Rfc3339],
            ..Self::default()
        }
    }

    pub fn epoch_tag_only() -> Self {
        Self {
            syntaxes: vec![Syntax::EpochTag],
            ..Self::default()
        }
    }

    /// Deterministic preset: UTC viewer, default patterns.
    pub fn utc() -> Self {
        Self {
            viewer_offset_minutes: Some(0),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ChronotagError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ChronotagError::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no formatter could use. Duplicate syntaxes are allowed
    /// and collapse to one pipeline.
    pub fn validate(&self) -> Result<(), ChronotagError> {
        if let Some(minutes) = self.viewer_offset_minutes {
            if minutes.abs() >= 24 * 60 {
                return Err(ChronotagError::InvalidOffset { minutes });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_enables_both_pipelines() {
        let config = ChronotagConfig::default();
        assert_eq!(config.syntaxes, vec![Syntax::Rfc3339, Syntax::EpochTag]);
        assert_eq!(config.relative_threshold_years, 100);
        assert_eq!(ChronotagConfig::rfc3339_only().syntaxes, vec![Syntax::Rfc3339]);
    }

    #[test]
    fn test_from_json_partial() {
        let config = ChronotagConfig::from_json(r#"{ "syntaxes": ["epoch_tag"], "locale": "de-DE" }"#).unwrap();
        assert_eq!(config.syntaxes, vec![Syntax::EpochTag]);
        assert_eq!(config.locale.as_deref(), Some("de-DE"));
        assert_eq!(config.classes, ClassNames::default());
        assert_eq!(config.relative_threshold_years, 100);
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(matches!(
            ChronotagConfig::from_json(r#"{ "syntaxes": ["iso"] }"#),
            Err(ChronotagError::InvalidConfig { .. })
        ));
        assert!(matches!(
            ChronotagConfig::from_json(r#"{ "viewer_offset_minutes": 1440 }"#),
            Err(ChronotagError::InvalidOffset { minutes: 1440 })
        ));
    }
}
