//! Stored log entries.
//!
//! An entry keeps the context already rendered to text, never the raw
//! structured context, so retained entries stay small and immutable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::level::Level;

/// Placeholder shown for an entry whose message is empty.
pub const MESSAGE_NOT_SUPPLIED: &str = "(MESSAGE NOT SUPPLIED)";

/// Timestamp layout used by [`LogEntry::format_line`].
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// One retained log call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// UTC wall clock at the time of the call
    pub timestamp: DateTime<Utc>,

    pub level: Level,

    /// Extracted message, possibly empty
    pub message: String,

    /// Formatted context block, empty when there was no context
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub context: String,
}

impl LogEntry {
    /// Create an entry stamped with the current time.
    pub fn new(level: Level, message: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            context: context.into(),
        }
    }

    /// Message text with the empty message replaced by a placeholder.
    pub fn display_message(&self) -> &str {
        if self.message.is_empty() {
            MESSAGE_NOT_SUPPLIED
        } else {
            &self.message
        }
    }

    /// `[timestamp][LEVEL]message<context>` without a trailing newline.
    pub fn format_line(&self) -> String {
        format!(
            "[{}][{}]{}{}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.level.label(),
            self.display_message(),
            self.context
        )
    }

    /// Serialize to a single JSON line (no trailing newline).
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from a JSON line.
    pub fn from_json_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_entry(message: &str, context: &str) -> LogEntry {
        LogEntry {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 45).unwrap(),
            level: Level::Warning,
            message: message.to_string(),
            context: context.to_string(),
        }
    }

    #[test]
    fn test_format_line() {
        let entry = fixed_entry("disk almost full", "");
        assert_eq!(
            entry.format_line(),
            "[2024-03-09 14:30:45.000000][WARNING]disk almost full"
        );
    }

    #[test]
    fn test_format_line_with_context_and_empty_message() {
        let entry = fixed_entry("", "\nCONTEXT:\n  main()");
        assert_eq!(
            entry.format_line(),
            "[2024-03-09 14:30:45.000000][WARNING](MESSAGE NOT SUPPLIED)\nCONTEXT:\n  main()"
        );
    }

    #[test]
    fn test_json_line_roundtrip() {
        let entry = fixed_entry("hello", "\nCONTEXT:\n  main()");
        let line = entry.to_json_line().unwrap();
        assert!(!line.contains('\n'));
        assert!(line.contains("\"level\":\"warning\""));

        let parsed = LogEntry::from_json_line(&line).unwrap();
        assert_eq!(parsed, entry);
    }

    #[test]
    fn test_empty_context_is_omitted_from_json() {
        let line = fixed_entry("hello", "").to_json_line().unwrap();
        assert!(!line.contains("context"));
        assert_eq!(LogEntry::from_json_line(&line).unwrap().context, "");
    }
}
