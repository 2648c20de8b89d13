//! Error types for the few fallible surfaces of the crate.
//!
//! None of these reach the decoration path: a token that cannot be rendered
//! is left as plain text instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChronotagError {
    /// Host-supplied configuration could not be read.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// A viewer zone offset outside +/-24h.
    #[error("invalid viewer offset: {minutes} minutes")]
    InvalidOffset { minutes: i32 },

    /// Locale formatting failed for one style.
    #[error("failed to format {style} timestamp: {reason}")]
    Format { style: &'static str, reason: String },

    /// A value could not cross the host boundary.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_display() {
        let err = ChronotagError::Format {
            style: "date",
            reason: "unsupported locale".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to format date timestamp: unsupported locale"
        );
    }

    #[test]
    fn test_invalid_offset_display() {
        let err = ChronotagError::InvalidOffset { minutes: 9999 };
        assert_eq!(err.to_string(), "invalid viewer offset: 9999 minutes");
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ChronotagError>();
    }
}
