//! Severity levels and level normalization.
//!
//! The eight levels mirror the syslog severities. Any token that does not
//! match one of them exactly (case-sensitive) normalizes to [`Level::Error`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LogTargetError;

/// Log severity, declared from most to least severe.
///
/// `Ord` follows declaration order, so `Level::Emergency < Level::Debug`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Emergency,
    Alert,
    Critical,
    #[default]
    Error,
    Warning,
    Notice,
    Info,
    Debug,
}

impl Level {
    /// Every level, most severe first.
    pub const ALL: [Level; 8] = [
        Level::Emergency,
        Level::Alert,
        Level::Critical,
        Level::Error,
        Level::Warning,
        Level::Notice,
        Level::Info,
        Level::Debug,
    ];

    /// Canonical lowercase token (`"error"`, `"debug"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Emergency => "emergency",
            Level::Alert => "alert",
            Level::Critical => "critical",
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Notice => "notice",
            Level::Info => "info",
            Level::Debug => "debug",
        }
    }

    /// Upper-cased label used in formatted output (`"ERROR"`).
    pub fn label(&self) -> &'static str {
        match self {
            Level::Emergency => "EMERGENCY",
            Level::Alert => "ALERT",
            Level::Critical => "CRITICAL",
            Level::Error => "ERROR",
            Level::Warning => "WARNING",
            Level::Notice => "NOTICE",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
        }
    }

    /// Normalize an arbitrary token. Never fails; unknown tokens become `Error`.
    pub fn normalize(token: &str) -> Level {
        token.parse().unwrap_or(Level::Error)
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LogTargetError;

    /// Strict parse: exact lowercase tokens only.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .iter()
            .copied()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| LogTargetError::UnknownLevel(s.to_string()))
    }
}

/// Anything that can be handed to `log_at_level` as a level.
///
/// Conversions are total: a value that does not name a level yields
/// [`Level::Error`].
pub trait IntoLevel {
    fn into_level(self) -> Level;
}

impl IntoLevel for Level {
    fn into_level(self) -> Level {
        self
    }
}

impl IntoLevel for &Level {
    fn into_level(self) -> Level {
        *self
    }
}

impl IntoLevel for &str {
    fn into_level(self) -> Level {
        Level::normalize(self)
    }
}

impl IntoLevel for String {
    fn into_level(self) -> Level {
        Level::normalize(&self)
    }
}

impl IntoLevel for &String {
    fn into_level(self) -> Level {
        Level::normalize(self)
    }
}

impl IntoLevel for &serde_json::Value {
    fn into_level(self) -> Level {
        match self {
            serde_json::Value::String(s) => Level::normalize(s),
            _ => Level::Error,
        }
    }
}

impl IntoLevel for serde_json::Value {
    fn into_level(self) -> Level {
        (&self).into_level()
    }
}

macro_rules! non_string_level {
    ($($t:ty),*) => {
        $(
            impl IntoLevel for $t {
                fn into_level(self) -> Level {
                    Level::Error
                }
            }
        )*
    };
}

// Levels are string tokens; numeric and boolean tokens are never recognized.
non_string_level!(i32, i64, u8, u32, u64, usize, f64, bool);
