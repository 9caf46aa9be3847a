//! The log sink: normalization, retention and dispatch.
//!
//! Every call runs the same pipeline:
//!
//! ```text
//! level ──► normalize
//! item  ──► extract message
//! context ─► (empty + automatic level) ? capture stack : as given
//!        ──► format ──► store ──► external logger | system log
//! ```
//!
//! Configuration is snapshotted once per call. The external logger and the
//! system log run outside every lock, so a logger may itself log through
//! the same sink.

mod config;
mod entry;

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::context::{
    extract_context, format_context, BacktraceCapture, Context, StackCapture, INTERNAL_FRAMES,
    WRAPPED_INTERNAL_FRAMES,
};
use crate::error::LogTargetResult;
use crate::item::LogItem;
use crate::level::{IntoLevel, Level};
use crate::message::extract_message;
use crate::output::{Logger, StderrLog, SystemLog};

pub use config::SinkConfig;
pub use entry::{LogEntry, MESSAGE_NOT_SUPPLIED, TIMESTAMP_FORMAT};

struct SinkState {
    config: SinkConfig,
    logger: Option<Arc<dyn Logger>>,
}

/// Per-call view of the configuration.
struct CallPolicy {
    store: bool,
    ignored: bool,
    logger: Option<Arc<dyn Logger>>,
}

/// Logging service owning the in-memory buffer and the dispatch policy.
///
/// `LogSink` is neither `Clone` nor `Deserialize`. Share one by reference or
/// through an `Arc`; the process-wide instance lives in [`crate::facade`].
pub struct LogSink {
    state: RwLock<SinkState>,
    entries: Mutex<Vec<LogEntry>>,
    system_log: Box<dyn SystemLog>,
    capture: Box<dyn StackCapture>,
}

impl LogSink {
    /// Sink with default configuration, writing its fallback lines to stderr.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> LogSinkBuilder {
        LogSinkBuilder::new()
    }

    /// Log `item` at `level`.
    ///
    /// When `context` is empty and `level` is an automatic-context level, the
    /// captured stack starts at the caller of this method.
    #[inline(never)]
    pub fn log_at_level(
        &self,
        level: impl IntoLevel,
        item: impl Into<LogItem>,
        context: impl Into<Context>,
    ) {
        let level = level.into_level();
        let item = item.into();
        let message = extract_message(&item);
        let (policy, auto_context) = self.policy(level);

        let mut context = context.into();
        if context.is_empty() && auto_context {
            context = extract_context(&item, self.capture.as_ref(), INTERNAL_FRAMES);
        }

        self.emit(level, message, context, policy);
    }

    /// Same as [`log_at_level`](Self::log_at_level), for use inside a
    /// convenience function: the captured stack starts at the caller of that
    /// function.
    ///
    /// The wrapper must be `#[inline(never)]` for its frame to exist.
    #[inline(never)]
    pub fn log_from_wrapper(
        &self,
        level: impl IntoLevel,
        item: impl Into<LogItem>,
        context: impl Into<Context>,
    ) {
        let level = level.into_level();
        let item = item.into();
        let message = extract_message(&item);
        let (policy, auto_context) = self.policy(level);

        let mut context = context.into();
        if context.is_empty() && auto_context {
            context = extract_context(&item, self.capture.as_ref(), WRAPPED_INTERNAL_FRAMES);
        }

        self.emit(level, message, context, policy);
    }

    fn policy(&self, level: Level) -> (CallPolicy, bool) {
        let state = self.state.read();
        let policy = CallPolicy {
            store: state.config.store_in_memory,
            ignored: state.config.ignores(level),
            logger: state.logger.clone(),
        };
        (policy, state.config.wants_context(level))
    }

    fn emit(&self, level: Level, message: String, context: Context, policy: CallPolicy) {
        let formatted = if policy.store || policy.logger.is_none() {
            format_context(&context)
        } else {
            String::new()
        };

        if policy.store {
            let entry = LogEntry::new(level, message.clone(), formatted.clone());
            self.entries.lock().push(entry);
        }

        match policy.logger {
            Some(logger) => logger.log(level, &message, &context),
            None if policy.ignored => {}
            None => {
                let shown = if message.is_empty() {
                    MESSAGE_NOT_SUPPLIED
                } else {
                    message.as_str()
                };
                self.system_log
                    .write(&format!("[{}] {}{}", level.label(), shown, formatted));
            }
        }
    }

    /// Snapshot of every retained entry, oldest first.
    pub fn get_log_raw(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    /// All retained entries, one `[timestamp][LEVEL]message<context>` line each.
    pub fn get_log_formatted(&self) -> String {
        self.entries
            .lock()
            .iter()
            .map(|entry| format!("{}\n", entry.format_line()))
            .collect()
    }

    /// Retained entries grouped by level, each group oldest first.
    pub fn log_by_level(&self) -> BTreeMap<Level, Vec<LogEntry>> {
        let mut grouped: BTreeMap<Level, Vec<LogEntry>> = BTreeMap::new();
        for entry in self.entries.lock().iter() {
            grouped.entry(entry.level).or_default().push(entry.clone());
        }
        grouped
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop every retained entry.
    pub fn clear_log(&self) {
        let dropped = {
            let mut entries = self.entries.lock();
            let dropped = entries.len();
            entries.clear();
            dropped
        };
        tracing::debug!(dropped, "cleared in-memory log");
    }

    /// Write the retained entries to `path` as JSON lines, replacing the file.
    ///
    /// Returns the number of entries written.
    pub fn export_jsonl(&self, path: impl AsRef<Path>) -> LogTargetResult<usize> {
        let entries = self.get_log_raw();
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        for entry in &entries {
            writeln!(writer, "{}", entry.to_json_line()?)?;
        }
        writer.flush()?;

        tracing::debug!(path = %path.as_ref().display(), count = entries.len(), "exported log");
        Ok(entries.len())
    }

    /// Route every later call to `logger` instead of the system log.
    pub fn set_logger(&self, logger: Arc<dyn Logger>) {
        self.state.write().logger = Some(logger);
        tracing::debug!("external logger installed");
    }

    /// Go back to the system log fallback.
    pub fn clear_logger(&self) {
        self.state.write().logger = None;
        tracing::debug!("external logger removed");
    }

    pub fn has_logger(&self) -> bool {
        self.state.read().logger.is_some()
    }

    pub fn set_store_in_memory(&self, store: bool) {
        self.state.write().config.store_in_memory = store;
        tracing::debug!(store, "in-memory storage updated");
    }

    pub fn set_automatic_context_generation_levels<L, I>(&self, levels: I)
    where
        L: IntoLevel,
        I: IntoIterator<Item = L>,
    {
        let levels: BTreeSet<Level> = levels.into_iter().map(IntoLevel::into_level).collect();
        self.state.write().config.automatic_context_levels = levels;
        tracing::debug!("automatic context levels updated");
    }

    pub fn set_ignore_log_levels<L, I>(&self, levels: I)
    where
        L: IntoLevel,
        I: IntoIterator<Item = L>,
    {
        let levels: BTreeSet<Level> = levels.into_iter().map(IntoLevel::into_level).collect();
        self.state.write().config.ignore_levels = levels;
        tracing::debug!("ignored levels updated");
    }

    /// Current configuration.
    pub fn config(&self) -> SinkConfig {
        self.state.read().config.clone()
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a [`LogSink`].
///
/// ```ignore
/// let sink = LogSink::builder()
///     .config(SinkConfig::from_json_file("sink.json")?)
///     .system_log(FileLog::open("logs/system.log")?)
///     .build();
/// ```
pub struct LogSinkBuilder {
    config: SinkConfig,
    logger: Option<Arc<dyn Logger>>,
    system_log: Option<Box<dyn SystemLog>>,
    capture: Option<Box<dyn StackCapture>>,
}

impl LogSinkBuilder {
    pub fn new() -> Self {
        Self {
            config: SinkConfig::default(),
            logger: None,
            system_log: None,
            capture: None,
        }
    }

    pub fn config(mut self, config: SinkConfig) -> Self {
        self.config = config;
        self
    }

    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Fallback sink; defaults to [`StderrLog`].
    pub fn system_log(mut self, system_log: impl SystemLog + 'static) -> Self {
        self.system_log = Some(Box::new(system_log));
        self
    }

    /// Stack capture; defaults to [`BacktraceCapture`].
    pub fn capture(mut self, capture: impl StackCapture + 'static) -> Self {
        self.capture = Some(Box::new(capture));
        self
    }

    pub fn build(self) -> LogSink {
        LogSink {
            state: RwLock::new(SinkState {
                config: self.config,
                logger: self.logger,
            }),
            entries: Mutex::new(Vec::new()),
            system_log: self.system_log.unwrap_or_else(|| Box::new(StderrLog)),
            capture: self
                .capture
                .unwrap_or_else(|| Box::new(BacktraceCapture::new())),
        }
    }
}

impl Default for LogSinkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
