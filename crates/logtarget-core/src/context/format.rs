//! Human-readable rendering of a [`Context`].
//!
//! Output shape:
//!
//! ```text
//!
//! CONTEXT:
//!   src/main.rs:42: Worker::run(string, Array('a', int))
//!   src/main.rs:10: main()
//!   UNEXPECTED CONTEXT ITEM: int = 42
//! ```
//!
//! The formatter is the last line of defense against malformed context, so
//! it is total and every piece of output is bounded.

use std::fmt::Write;

use serde_json::Value;

use super::{Context, ContextEntry, StackFrame};
use crate::render::{
    dump_value, render_args, truncate, value_type_name, MAX_ELEMENTS, MAX_STRING_LEN,
    MAX_SYMBOL_LEN,
};

/// Header line that introduces a rendered context.
pub const CONTEXT_HEADER: &str = "CONTEXT:";

/// Render `context`; an empty context renders as the empty string.
pub fn format_context(context: &Context) -> String {
    if context.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    out.push('\n');
    out.push_str(CONTEXT_HEADER);

    for entry in context.entries().iter().take(MAX_ELEMENTS) {
        out.push_str("\n  ");
        out.push_str(&format_entry(entry));
    }

    if context.len() > MAX_ELEMENTS {
        let _ = write!(
            out,
            "\n  ... {} more context items",
            context.len() - MAX_ELEMENTS
        );
    }

    out
}

/// Render a single context entry as one line.
pub fn format_entry(entry: &ContextEntry) -> String {
    match entry {
        ContextEntry::Frame(frame) if frame.is_unknown_shape() => {
            let dump = serde_json::to_value(frame).unwrap_or(Value::Null);
            format!(
                "UNEXPECTED CONTEXT ITEM: frame = {}",
                dump_value(&dump, MAX_STRING_LEN)
            )
        }
        ContextEntry::Frame(frame) => format_frame(frame),
        ContextEntry::Object { type_name } => format!(
            "UNEXPECTED CONTEXT OBJECT: {}",
            truncate(type_name, MAX_STRING_LEN)
        ),
        ContextEntry::Value(value) => format!(
            "UNEXPECTED CONTEXT ITEM: {} = {}",
            value_type_name(value),
            dump_value(value, MAX_STRING_LEN)
        ),
    }
}

/// `file:line: Class::function(args)`, each part optional.
pub fn format_frame(frame: &StackFrame) -> String {
    let mut line = String::new();

    if let Some(file) = &frame.file {
        line.push_str(&truncate(file, MAX_SYMBOL_LEN));
        if let Some(number) = frame.line {
            let _ = write!(line, ":{}", number);
        }
        line.push_str(": ");
    }

    if let Some(class) = &frame.class {
        line.push_str(&truncate(class, MAX_STRING_LEN));
        line.push_str("::");
    }

    if let Some(function) = &frame.function {
        line.push_str(&truncate(function, MAX_SYMBOL_LEN));
        line.push('(');
        line.push_str(&render_args(&frame.args));
        line.push(')');
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_context_renders_nothing() {
        assert_eq!(format_context(&Context::default()), "");
    }

    #[test]
    fn test_full_frame_line() {
        let frame = StackFrame::method("Worker", "run")
            .at("src/worker.rs", 42)
            .with_args(vec![json!("secret"), json!(["a", 1])]);
        assert_eq!(
            format_frame(&frame),
            "src/worker.rs:42: Worker::run(string, Array('a', int))"
        );
    }

    #[test]
    fn test_partial_frames() {
        assert_eq!(format_frame(&StackFrame::function("main")), "main()");

        let mut file_only = StackFrame::default();
        file_only.file = Some("build.rs".to_string());
        assert_eq!(format_frame(&file_only), "build.rs: ");
    }

    #[test]
    fn test_context_block() {
        let context: Context = vec![
            StackFrame::function("run").at("src/lib.rs", 7),
            StackFrame::function("main").at("src/main.rs", 3),
        ]
        .into();

        assert_eq!(
            format_context(&context),
            "\nCONTEXT:\n  src/lib.rs:7: run()\n  src/main.rs:3: main()"
        );
    }

    #[test]
    fn test_raw_integer_context() {
        let rendered = format_context(&Context::from(json!(42)));
        assert_eq!(rendered, "\nCONTEXT:\n  UNEXPECTED CONTEXT ITEM: int = 42");
    }

    #[test]
    fn test_unknown_shape_frame() {
        let mut frame = StackFrame::default();
        frame.line = Some(9);
        let rendered = format_entry(&ContextEntry::Frame(frame));
        assert_eq!(rendered, "UNEXPECTED CONTEXT ITEM: frame = {line: 9}");
    }

    #[test]
    fn test_object_entry() {
        let entry = ContextEntry::Object {
            type_name: "db::Pool".to_string(),
        };
        assert_eq!(format_entry(&entry), "UNEXPECTED CONTEXT OBJECT: db::Pool");
    }

    #[test]
    fn test_huge_value_entry_is_bounded() {
        let huge = "z".repeat(100_000);
        let rendered = format_entry(&ContextEntry::Value(json!(huge)));
        assert!(rendered.starts_with("UNEXPECTED CONTEXT ITEM: string = \"zzz"));
        assert!(rendered.len() < 200);
    }

    #[test]
    fn test_huge_frame_is_bounded() {
        let frame = StackFrame::method("C".repeat(10_000), "f".repeat(100_000))
            .at("x".repeat(50_000), 1);
        let rendered = format_context(&Context::from(vec![frame]));

        assert!(rendered.len() < 1000, "rendered len = {}", rendered.len());
        let line = rendered.lines().nth(2).unwrap();
        assert!(line.starts_with(&format!("{}...:1: ", "x".repeat(MAX_SYMBOL_LEN))));
        assert!(line.ends_with(&format!("{}...()", "f".repeat(MAX_SYMBOL_LEN))));
    }

    #[test]
    fn test_entry_count_is_bounded() {
        let frames: Vec<StackFrame> = (0..100)
            .map(|i| StackFrame::function(format!("f{}", i)))
            .collect();
        let rendered = format_context(&frames.into());

        assert_eq!(rendered.lines().count(), 2 + MAX_ELEMENTS + 1);
        assert!(rendered.ends_with("... 36 more context items"));
    }
}
