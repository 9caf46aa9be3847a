//! LogTarget Core Library
//!
//! A logging facade that accepts heterogeneous inputs and turns each call
//! into one structured entry.
//!
//! ## Overview
//!
//! Every log call carries a severity level, an item (text, an error value,
//! a collection, an XML parse error, ...) and an optional context. The
//! [`LogSink`] normalizes the level, derives a message from the item,
//! captures a stack trace when the level asks for one, keeps the entry in
//! memory and hands it to an external [`Logger`] or, failing that, writes
//! one line to the [`SystemLog`].
//!
//! ## Core Principles
//!
//! - **Logging never fails**: odd inputs become placeholder text, never errors
//! - **Bounded output**: collections, arguments and contexts are truncated
//! - **Stable context**: automatic stack traces start at the caller
//!
//! ## Quick Start
//!
//! ```ignore
//! use logtarget_core::{facade, log_error};
//! use serde_json::json;
//!
//! fn main() {
//!     log_error!("Testing LogError");
//!     facade::log_at_level("warning", json!([1, 2, 3]), ());
//!
//!     for entry in facade::global().get_log_raw() {
//!         println!("{} {}", entry.level, entry.message);
//!     }
//! }
//! ```

pub mod context;
pub mod error;
pub mod facade;
pub mod item;
pub mod level;
pub mod message;
pub mod output;
pub mod render;
pub mod sink;

// Re-exports
pub use context::{
    extract_context, format_context, BacktraceCapture, Context, ContextEntry, StackCapture,
    StackFrame, INTERNAL_FRAMES, WRAPPED_INTERNAL_FRAMES,
};
pub use error::{LogTargetError, LogTargetResult};
pub use item::{ErrorValue, Failure, LogItem, Throwable, XmlError, XmlErrorLevel};
pub use level::{IntoLevel, Level};
pub use message::extract_message;
pub use output::{FileLog, Logger, StderrLog, SystemLog, TracingLogger};
pub use sink::{LogEntry, LogSink, LogSinkBuilder, SinkConfig};
