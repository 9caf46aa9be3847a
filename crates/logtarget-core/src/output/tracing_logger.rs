//! External logger forwarding to `tracing`.

use super::Logger;
use crate::context::Context;
use crate::level::Level;

/// [`Logger`] that re-emits every call as a `tracing` event.
///
/// The eight severities fold onto tracing's five levels; the original
/// severity is kept in the `severity` field and the raw context is attached
/// as JSON in the `context` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn new() -> Self {
        Self
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: Level, message: &str, context: &Context) {
        let severity = level.as_str();
        let context = context.to_value().to_string();

        match level {
            Level::Emergency | Level::Alert | Level::Critical | Level::Error => {
                tracing::error!(target: "logtarget", severity, context = %context, "{}", message)
            }
            Level::Warning => {
                tracing::warn!(target: "logtarget", severity, context = %context, "{}", message)
            }
            Level::Notice | Level::Info => {
                tracing::info!(target: "logtarget", severity, context = %context, "{}", message)
            }
            Level::Debug => {
                tracing::debug!(target: "logtarget", severity, context = %context, "{}", message)
            }
        }
    }
}
