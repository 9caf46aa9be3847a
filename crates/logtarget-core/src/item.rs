//! Loggable items.
//!
//! [`LogItem`] is the closed set of shapes a log call accepts. Each variant
//! maps to one message-extraction rule, so dispatch is a plain `match`.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::context::{BacktraceCapture, StackCapture, StackFrame};

/// Error-like values: anything that can report a message and, optionally,
/// the stack trace captured where it was raised.
pub trait Throwable: Send + Sync {
    fn message(&self) -> String;

    /// Runtime type name shown in fallback messages.
    fn type_name(&self) -> &str;

    fn trace(&self) -> Option<Vec<StackFrame>> {
        None
    }
}

/// Adapter exposing any `std::error::Error` as a [`Throwable`].
#[derive(Debug)]
pub struct ErrorValue<E> {
    error: E,
}

impl<E> ErrorValue<E> {
    pub fn new(error: E) -> Self {
        Self { error }
    }

    pub fn into_inner(self) -> E {
        self.error
    }
}

impl<E> Throwable for ErrorValue<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn message(&self) -> String {
        self.error.to_string()
    }

    fn type_name(&self) -> &str {
        std::any::type_name::<E>()
    }
}

struct BoxedError(Box<dyn std::error::Error + Send + Sync>);

impl Throwable for BoxedError {
    fn message(&self) -> String {
        self.0.to_string()
    }

    fn type_name(&self) -> &str {
        "dyn std::error::Error"
    }
}

/// An error that records the stack at the point it was created.
///
/// This is the value to log when the interesting location is where a
/// problem was detected rather than where it gets logged.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct Failure {
    kind: String,
    message: String,
    trace: Vec<StackFrame>,
}

impl Failure {
    /// Create a failure, capturing the caller's stack.
    #[inline(never)]
    pub fn new(message: impl Into<String>) -> Self {
        // First captured frame is this constructor
        let trace = BacktraceCapture::new().capture().into_iter().skip(1).collect();
        Self {
            kind: "Failure".to_string(),
            message: message.into(),
            trace,
        }
    }

    /// Create a failure with an already known trace.
    pub fn with_trace(message: impl Into<String>, trace: Vec<StackFrame>) -> Self {
        Self {
            kind: "Failure".to_string(),
            message: message.into(),
            trace,
        }
    }

    /// Name the failure class (`"DivisionByZero"`, `"ParseError"`, ...).
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn trace(&self) -> &[StackFrame] {
        &self.trace
    }
}

impl Throwable for Failure {
    fn message(&self) -> String {
        self.message.clone()
    }

    fn type_name(&self) -> &str {
        &self.kind
    }

    /// An empty trace means capture was unavailable; the caller captures instead.
    fn trace(&self) -> Option<Vec<StackFrame>> {
        if self.trace.is_empty() {
            None
        } else {
            Some(self.trace.clone())
        }
    }
}

/// Severity of an XML parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XmlErrorLevel {
    Warning,
    Error,
    Fatal,
}

/// Record describing an XML parse problem.
///
/// Not an error type: parsers hand these out as plain data, and the message
/// usually carries a trailing newline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlError {
    pub level: XmlErrorLevel,
    pub code: i32,
    pub column: u32,
    pub message: String,
    pub file: Option<String>,
    pub line: u32,
}

impl XmlError {
    pub fn new(level: XmlErrorLevel, code: i32, message: impl Into<String>) -> Self {
        Self {
            level,
            code,
            column: 0,
            message: message.into(),
            file: None,
            line: 0,
        }
    }

    pub fn at(mut self, file: impl Into<String>, line: u32, column: u32) -> Self {
        self.file = Some(file.into());
        self.line = line;
        self.column = column;
        self
    }
}

/// Anything that can be logged.
#[derive(Clone)]
pub enum LogItem {
    /// Error-like value
    Error(Arc<dyn Throwable>),

    /// XML parse error record
    XmlError(XmlError),

    /// Structured value described only by its type
    Object { type_name: String },

    /// Plain message text
    Text(String),

    /// JSON array or map
    Collection(Value),

    /// Number, bool or null
    Scalar(Value),
}

impl LogItem {
    /// Wrap a `std::error::Error`.
    pub fn error<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        LogItem::Error(Arc::new(ErrorValue::new(error)))
    }

    /// Wrap a custom [`Throwable`].
    pub fn throwable(value: impl Throwable + 'static) -> Self {
        LogItem::Error(Arc::new(value))
    }

    /// Describe a live object by its runtime type.
    pub fn object_of<T: ?Sized>(value: &T) -> Self {
        LogItem::Object {
            type_name: std::any::type_name_of_val(value).to_string(),
        }
    }

    /// Kind name used when extraction itself fails.
    pub fn kind(&self) -> &'static str {
        match self {
            LogItem::Error(_) => "error",
            LogItem::XmlError(_) => "xml error",
            LogItem::Object { .. } => "object",
            LogItem::Text(_) => "string",
            LogItem::Collection(_) => "array",
            LogItem::Scalar(_) => "scalar",
        }
    }
}

impl fmt::Debug for LogItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogItem::Error(error) => f.debug_tuple("Error").field(&error.type_name()).finish(),
            LogItem::XmlError(xml) => f.debug_tuple("XmlError").field(xml).finish(),
            LogItem::Object { type_name } => {
                f.debug_struct("Object").field("type_name", type_name).finish()
            }
            LogItem::Text(text) => f.debug_tuple("Text").field(text).finish(),
            LogItem::Collection(value) => f.debug_tuple("Collection").field(value).finish(),
            LogItem::Scalar(value) => f.debug_tuple("Scalar").field(value).finish(),
        }
    }
}

impl From<&str> for LogItem {
    fn from(text: &str) -> Self {
        LogItem::Text(text.to_string())
    }
}

impl From<String> for LogItem {
    fn from(text: String) -> Self {
        LogItem::Text(text)
    }
}

impl From<&String> for LogItem {
    fn from(text: &String) -> Self {
        LogItem::Text(text.clone())
    }
}

impl From<Value> for LogItem {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => LogItem::Text(text),
            Value::Array(_) | Value::Object(_) => LogItem::Collection(value),
            scalar => LogItem::Scalar(scalar),
        }
    }
}

impl From<Vec<Value>> for LogItem {
    fn from(items: Vec<Value>) -> Self {
        LogItem::Collection(Value::Array(items))
    }
}

impl From<serde_json::Map<String, Value>> for LogItem {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        LogItem::Collection(Value::Object(map))
    }
}

impl From<Failure> for LogItem {
    fn from(failure: Failure) -> Self {
        LogItem::Error(Arc::new(failure))
    }
}

impl From<XmlError> for LogItem {
    fn from(xml: XmlError) -> Self {
        LogItem::XmlError(xml)
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for LogItem {
    fn from(error: Box<dyn std::error::Error + Send + Sync>) -> Self {
        LogItem::Error(Arc::new(BoxedError(error)))
    }
}

impl From<Arc<dyn Throwable>> for LogItem {
    fn from(error: Arc<dyn Throwable>) -> Self {
        LogItem::Error(error)
    }
}

macro_rules! scalar_item {
    ($($t:ty),*) => {
        $(
            impl From<$t> for LogItem {
                fn from(value: $t) -> Self {
                    LogItem::from(Value::from(value))
                }
            }
        )*
    };
}

scalar_item!(i32, i64, u32, u64, usize, f64, bool);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_conversion_picks_variant() {
        assert!(matches!(LogItem::from(json!("hi")), LogItem::Text(ref t) if t == "hi"));
        assert!(matches!(LogItem::from(json!([1, 2])), LogItem::Collection(_)));
        assert!(matches!(LogItem::from(json!({"a": 1})), LogItem::Collection(_)));
        assert!(matches!(LogItem::from(json!(3)), LogItem::Scalar(_)));
        assert!(matches!(LogItem::from(json!(null)), LogItem::Scalar(_)));
    }

    #[test]
    fn test_scalar_conversions() {
        assert!(matches!(LogItem::from(42i64), LogItem::Scalar(Value::Number(_))));
        assert!(matches!(LogItem::from(true), LogItem::Scalar(Value::Bool(true))));
        // Non-finite floats have no JSON form and become null
        assert!(matches!(LogItem::from(f64::NAN), LogItem::Scalar(Value::Null)));
    }

    #[test]
    fn test_error_value_reports_type() {
        let item = LogItem::error(std::io::Error::other("boom"));
        match item {
            LogItem::Error(error) => {
                assert_eq!(error.message(), "boom");
                assert!(error.type_name().starts_with("std::io::"));
                assert!(error.trace().is_none());
            }
            other => panic!("unexpected item: {:?}", other),
        }
    }

    #[test]
    fn test_failure_captures_its_creation_site() {
        let failure = Failure::new("division by zero").with_kind("DivisionByZero");
        assert_eq!(failure.kind(), "DivisionByZero");
        assert_eq!(failure.to_string(), "division by zero");
        assert!(!failure.trace().is_empty());
        assert!(failure
            .trace()
            .iter()
            .all(|frame| frame.class.as_deref() != Some("BacktraceCapture")));
    }

    #[test]
    fn test_failure_with_empty_trace_reports_none() {
        let failure = Failure::with_trace("no stack", Vec::new());
        assert!(Throwable::trace(&failure).is_none());
    }

    #[test]
    fn test_object_of_uses_runtime_type() {
        struct Connection;
        match LogItem::object_of(&Connection) {
            LogItem::Object { type_name } => assert!(type_name.ends_with("Connection")),
            other => panic!("unexpected item: {:?}", other),
        }
    }

    #[test]
    fn test_xml_error_builder() {
        let xml = XmlError::new(XmlErrorLevel::Warning, 1549, "failed to load external entity\n")
            .at("Non-Existent-File.bad", 0, 0);
        assert_eq!(xml.file.as_deref(), Some("Non-Existent-File.bad"));
        assert_eq!(xml.code, 1549);
    }
}
