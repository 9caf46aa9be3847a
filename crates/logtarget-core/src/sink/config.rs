//! Sink policy configuration.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LogTargetResult;
use crate::level::Level;

/// Policy knobs of a [`LogSink`](super::LogSink).
///
/// Loadable from JSON; missing fields take their defaults:
///
/// ```json
/// { "store_in_memory": true, "automatic_context_levels": ["error"], "ignore_levels": [] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Retain every entry in the in-memory buffer
    pub store_in_memory: bool,

    /// Levels that get a captured stack when the caller passes no context
    pub automatic_context_levels: BTreeSet<Level>,

    /// Levels never written to the system log fallback
    pub ignore_levels: BTreeSet<Level>,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            store_in_memory: true,
            automatic_context_levels: [Level::Emergency, Level::Alert, Level::Critical, Level::Error]
                .into_iter()
                .collect(),
            ignore_levels: [Level::Debug].into_iter().collect(),
        }
    }
}

impl SinkConfig {
    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> LogTargetResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn wants_context(&self, level: Level) -> bool {
        self.automatic_context_levels.contains(&level)
    }

    pub fn ignores(&self, level: Level) -> bool {
        self.ignore_levels.contains(&level)
    }
}
