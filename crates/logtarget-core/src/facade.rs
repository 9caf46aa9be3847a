//! Process-wide logging facade.
//!
//! One [`LogSink`] per process, created lazily with the default
//! configuration on first use. Call [`install`] before any logging to
//! replace it with a custom sink.
//!
//! ```ignore
//! use logtarget_core::facade;
//!
//! facade::log_error("Testing LogError", ());
//! logtarget_core::log_warning!("disk almost full");
//!
//! print!("{}", facade::global().get_log_formatted());
//! ```
//!
//! The level functions are `#[inline(never)]` and never end in a tail call:
//! each one is exactly one frame between the caller and the sink in every
//! build profile, and the automatic context drops it along with the sink's
//! own frames.

use std::sync::OnceLock;

use crate::context::Context;
use crate::error::{LogTargetError, LogTargetResult};
use crate::item::LogItem;
use crate::level::{IntoLevel, Level};
use crate::sink::LogSink;

static GLOBAL: OnceLock<LogSink> = OnceLock::new();

/// The process-wide sink, created on first access.
pub fn global() -> &'static LogSink {
    GLOBAL.get_or_init(LogSink::new)
}

/// Make `sink` the process-wide sink.
///
/// Fails with [`LogTargetError::AlreadyInitialized`] once the global sink
/// exists, whether it was installed or created by an earlier log call.
pub fn install(sink: LogSink) -> LogTargetResult<&'static LogSink> {
    GLOBAL
        .set(sink)
        .map_err(|_| LogTargetError::AlreadyInitialized)?;
    Ok(global())
}

/// Whether the process-wide sink exists yet.
pub fn is_initialized() -> bool {
    GLOBAL.get().is_some()
}

/// Log at an arbitrary level; unknown level tokens log as `error`.
#[inline(never)]
pub fn log_at_level(level: impl IntoLevel, item: impl Into<LogItem>, context: impl Into<Context>) {
    global().log_from_wrapper(level, item, context);
    // Keeps this frame on the stack while the sink captures.
    std::hint::black_box(());
}

macro_rules! level_fn {
    ($(#[$doc:meta])* $name:ident => $level:expr) => {
        $(#[$doc])*
        #[inline(never)]
        pub fn $name(item: impl Into<LogItem>, context: impl Into<Context>) {
            global().log_from_wrapper($level, item, context);
            std::hint::black_box(());
        }
    };
}

level_fn!(
    /// System is unusable.
    log_emergency => Level::Emergency
);
level_fn!(
    /// Action must be taken immediately.
    log_alert => Level::Alert
);
level_fn!(log_critical => Level::Critical);
level_fn!(log_error => Level::Error);
level_fn!(log_warning => Level::Warning);
level_fn!(
    /// Normal but significant condition.
    log_notice => Level::Notice
);
level_fn!(log_info => Level::Info);
level_fn!(log_debug => Level::Debug);

/// `log_emergency!(item)` or `log_emergency!(item, context)`.
#[macro_export]
macro_rules! log_emergency {
    ($item:expr $(,)?) => {
        $crate::facade::log_emergency($item, ())
    };
    ($item:expr, $context:expr $(,)?) => {
        $crate::facade::log_emergency($item, $context)
    };
}

#[macro_export]
macro_rules! log_alert {
    ($item:expr $(,)?) => {
        $crate::facade::log_alert($item, ())
    };
    ($item:expr, $context:expr $(,)?) => {
        $crate::facade::log_alert($item, $context)
    };
}

#[macro_export]
macro_rules! log_critical {
    ($item:expr $(,)?) => {
        $crate::facade::log_critical($item, ())
    };
    ($item:expr, $context:expr $(,)?) => {
        $crate::facade::log_critical($item, $context)
    };
}

#[macro_export]
macro_rules! log_error {
    ($item:expr $(,)?) => {
        $crate::facade::log_error($item, ())
    };
    ($item:expr, $context:expr $(,)?) => {
        $crate::facade::log_error($item, $context)
    };
}

#[macro_export]
macro_rules! log_warning {
    ($item:expr $(,)?) => {
        $crate::facade::log_warning($item, ())
    };
    ($item:expr, $context:expr $(,)?) => {
        $crate::facade::log_warning($item, $context)
    };
}

#[macro_export]
macro_rules! log_notice {
    ($item:expr $(,)?) => {
        $crate::facade::log_notice($item, ())
    };
    ($item:expr, $context:expr $(,)?) => {
        $crate::facade::log_notice($item, $context)
    };
}

#[macro_export]
macro_rules! log_info {
    ($item:expr $(,)?) => {
        $crate::facade::log_info($item, ())
    };
    ($item:expr, $context:expr $(,)?) => {
        $crate::facade::log_info($item, $context)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($item:expr $(,)?) => {
        $crate::facade::log_debug($item, ())
    };
    ($item:expr, $context:expr $(,)?) => {
        $crate::facade::log_debug($item, $context)
    };
}

/// `log_at_level!(level, item)` or `log_at_level!(level, item, context)`.
#[macro_export]
macro_rules! log_at_level {
    ($level:expr, $item:expr $(,)?) => {
        $crate::facade::log_at_level($level, $item, ())
    };
    ($level:expr, $item:expr, $context:expr $(,)?) => {
        $crate::facade::log_at_level($level, $item, $context)
    };
}
