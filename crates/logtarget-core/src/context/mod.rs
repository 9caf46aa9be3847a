//! Diagnostic context attached to a log call.
//!
//! A [`Context`] is an ordered list of [`ContextEntry`] values. Well-formed
//! entries are stack frames; anything else is kept as an explicit opaque
//! variant so the formatter can render it defensively.
//!
//! ## Pieces
//!
//! - [`capture`]: the [`StackCapture`] capability and its std-backed implementation
//! - [`extract`]: automatic context generation for a log item
//! - [`format`]: bounded human-readable rendering

pub mod capture;
pub mod extract;
pub mod format;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use capture::{BacktraceCapture, StackCapture};
pub use extract::{extract_context, INTERNAL_FRAMES, WRAPPED_INTERNAL_FRAMES};
pub use format::format_context;

/// One call-site record of a stack trace.
///
/// Every field is optional. A frame with neither `file` nor `function` has an
/// unknown shape and is rendered as unexpected context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StackFrame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,

    /// Receiver type for methods
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
}

impl StackFrame {
    /// Frame for a free function.
    pub fn function(name: impl Into<String>) -> Self {
        Self {
            function: Some(name.into()),
            ..Self::default()
        }
    }

    /// Frame for a method on `class`.
    pub fn method(class: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            class: Some(class.into()),
            function: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the source location.
    pub fn at(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    /// Set the call arguments.
    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    /// True when the frame has neither a file nor a function.
    pub fn is_unknown_shape(&self) -> bool {
        self.file.is_none() && self.function.is_none()
    }
}

/// One element of a [`Context`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ContextEntry {
    /// A stack frame
    Frame(StackFrame),

    /// A live object the caller could only describe by its type
    Object { type_name: String },

    /// Any value that is not a stack frame
    Value(Value),
}

impl ContextEntry {
    /// Describe a live object by its runtime type.
    pub fn object_of<T: ?Sized>(value: &T) -> Self {
        ContextEntry::Object {
            type_name: std::any::type_name_of_val(value).to_string(),
        }
    }

    /// Classify a JSON value: maps carrying a `file` or `function` key become frames.
    pub fn from_value(value: Value) -> Self {
        let looks_like_frame = value
            .as_object()
            .map(|map| map.contains_key("file") || map.contains_key("function"))
            .unwrap_or(false);

        if looks_like_frame {
            match serde_json::from_value::<StackFrame>(value.clone()) {
                Ok(frame) => ContextEntry::Frame(frame),
                Err(_) => ContextEntry::Value(value),
            }
        } else {
            ContextEntry::Value(value)
        }
    }
}

impl From<StackFrame> for ContextEntry {
    fn from(frame: StackFrame) -> Self {
        ContextEntry::Frame(frame)
    }
}

/// Ordered diagnostic context for one log call.
///
/// Serializes as a JSON array, which is what external loggers see.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Context {
    entries: Vec<ContextEntry>,
}

impl Context {
    pub fn new(entries: Vec<ContextEntry>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[ContextEntry] {
        &self.entries
    }

    pub fn push(&mut self, entry: impl Into<ContextEntry>) {
        self.entries.push(entry.into());
    }

    /// Iterate the well-formed stack frames, skipping opaque entries.
    pub fn frames(&self) -> impl Iterator<Item = &StackFrame> {
        self.entries.iter().filter_map(|entry| match entry {
            ContextEntry::Frame(frame) => Some(frame),
            _ => None,
        })
    }

    /// JSON view of the raw context.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl From<()> for Context {
    fn from(_: ()) -> Self {
        Context::default()
    }
}

impl From<Vec<StackFrame>> for Context {
    fn from(frames: Vec<StackFrame>) -> Self {
        Context::new(frames.into_iter().map(ContextEntry::Frame).collect())
    }
}

impl From<Vec<ContextEntry>> for Context {
    fn from(entries: Vec<ContextEntry>) -> Self {
        Context::new(entries)
    }
}

impl From<ContextEntry> for Context {
    fn from(entry: ContextEntry) -> Self {
        Context::new(vec![entry])
    }
}

/// Arrays become one entry per element; any other value is a single entry.
impl From<Value> for Context {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => {
                Context::new(items.into_iter().map(ContextEntry::from_value).collect())
            }
            other => Context::new(vec![ContextEntry::from_value(other)]),
        }
    }
}

impl FromIterator<ContextEntry> for Context {
    fn from_iter<I: IntoIterator<Item = ContextEntry>>(iter: I) -> Self {
        Context::new(iter.into_iter().collect())
    }
}

impl FromIterator<StackFrame> for Context {
    fn from_iter<I: IntoIterator<Item = StackFrame>>(iter: I) -> Self {
        iter.into_iter().map(ContextEntry::Frame).collect()
    }
}
