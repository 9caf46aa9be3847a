//! Outbound collaborators of a [`LogSink`](crate::LogSink).
//!
//! - [`Logger`]: an external leveled logger. When one is configured it
//!   receives every call and the system log is bypassed.
//! - [`SystemLog`]: the fallback sink taking one preformatted line per call.

mod file;
mod tracing_logger;

use std::io::Write;

use crate::context::Context;
use crate::level::Level;

pub use file::FileLog;
pub use tracing_logger::TracingLogger;

/// External leveled logger.
///
/// Receives the raw structured context, not the formatted text.
pub trait Logger: Send + Sync {
    fn log(&self, level: Level, message: &str, context: &Context);
}

/// Fallback sink for preformatted lines.
///
/// Writes are best-effort: implementations swallow their own failures.
pub trait SystemLog: Send + Sync {
    fn write(&self, line: &str);
}

/// [`SystemLog`] writing to the process's standard error stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrLog;

impl SystemLog for StderrLog {
    fn write(&self, line: &str) {
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{}", line);
    }
}
