//! Bounded, total text conversions for arbitrary values.
//!
//! Everything here renders untrusted input, so every conversion has an
//! explicit size bound and none of them can fail.

use serde_json::Value;

/// Maximum characters kept from any single string.
pub const MAX_STRING_LEN: usize = 64;

/// Maximum elements rendered from any single collection.
pub const MAX_ELEMENTS: usize = 64;

/// Nested collections deeper than this render as `Array(...)`.
pub const MAX_DEPTH: usize = 3;

/// Character budget for the full argument list of one frame.
pub const MAX_ARGS_LEN: usize = MAX_STRING_LEN * 4;

/// Maximum characters kept from a frame's file path or function symbol.
/// Monomorphized symbols routinely run past [`MAX_STRING_LEN`].
pub const MAX_SYMBOL_LEN: usize = MAX_STRING_LEN * 4;

/// Marker appended whenever output was cut short.
pub const ELLIPSIS: &str = "...";

/// Truncate `s` to at most `max` characters, appending [`ELLIPSIS`] when cut.
pub fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}{}", &s[..idx], ELLIPSIS),
        None => s.to_string(),
    }
}

/// Type name of a JSON value as shown in messages and frame arguments.
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "map",
    }
}

/// String conversion of a scalar (`true`, `42`, `null`, raw string text).
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => dump_value(other, MAX_STRING_LEN),
    }
}

/// Text sink that stops accepting input once `max` characters were written.
pub(crate) struct Bounded {
    out: String,
    len: usize,
    max: usize,
    full: bool,
}

impl Bounded {
    pub(crate) fn new(max: usize) -> Self {
        Self {
            out: String::new(),
            len: 0,
            max,
            full: false,
        }
    }

    pub(crate) fn is_full(&self) -> bool {
        self.full
    }

    /// Append `s`; returns `false` once the budget is exhausted.
    pub(crate) fn push(&mut self, s: &str) -> bool {
        if self.full {
            return false;
        }
        for ch in s.chars() {
            if self.len >= self.max {
                self.full = true;
                return false;
            }
            self.out.push(ch);
            self.len += 1;
        }
        true
    }

    pub(crate) fn finish(mut self) -> String {
        if self.full {
            self.out.push_str(ELLIPSIS);
        }
        self.out
    }
}

/// Best-effort JSON-like dump of `value`, capped at `max` characters.
///
/// Work is bounded too: traversal stops as soon as the budget is spent.
pub fn dump_value(value: &Value, max: usize) -> String {
    let mut out = Bounded::new(max);
    dump_into(value, &mut out);
    out.finish()
}

fn dump_into(value: &Value, out: &mut Bounded) {
    match value {
        Value::Null => {
            out.push("null");
        }
        Value::Bool(b) => {
            out.push(if *b { "true" } else { "false" });
        }
        Value::Number(n) => {
            out.push(&n.to_string());
        }
        Value::String(s) => {
            out.push("\"");
            out.push(s);
            out.push("\"");
        }
        Value::Array(items) => {
            out.push("[");
            for (i, item) in items.iter().enumerate() {
                if out.is_full() {
                    return;
                }
                if i > 0 {
                    out.push(", ");
                }
                dump_into(item, out);
            }
            out.push("]");
        }
        Value::Object(map) => {
            out.push("{");
            for (i, (key, item)) in map.iter().enumerate() {
                if out.is_full() {
                    return;
                }
                if i > 0 {
                    out.push(", ");
                }
                out.push(key);
                out.push(": ");
                dump_into(item, out);
            }
            out.push("}");
        }
    }
}

/// First-level `key => type` summary of a collection, capped at `max` characters.
pub fn summarize_collection(value: &Value, max: usize) -> String {
    let mut out = Bounded::new(max);
    match value {
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                if out.is_full() {
                    break;
                }
                if i > 0 {
                    out.push(", ");
                }
                out.push(&format!("{} => {}", i, value_type_name(item)));
            }
        }
        Value::Object(map) => {
            for (i, (key, item)) in map.iter().enumerate() {
                if out.is_full() {
                    break;
                }
                if i > 0 {
                    out.push(", ");
                }
                out.push(&format!("{} => {}", key, value_type_name(item)));
            }
        }
        other => {
            out.push(value_type_name(other));
        }
    }
    out.finish()
}

/// Render a frame's argument list.
///
/// Top-level scalars render as their type name only, so argument values do
/// not leak into logs. Collections render recursively, showing quoted and
/// truncated strings.
pub fn render_args(args: &[Value]) -> String {
    let mut out = Bounded::new(MAX_ARGS_LEN);
    for (i, arg) in args.iter().enumerate() {
        if out.is_full() {
            break;
        }
        if i >= MAX_ELEMENTS {
            out.push(", ");
            out.push(ELLIPSIS);
            break;
        }
        if i > 0 {
            out.push(", ");
        }
        match arg {
            Value::Array(_) | Value::Object(_) => render_nested(arg, 1, &mut out),
            other => {
                out.push(value_type_name(other));
            }
        }
    }
    out.finish()
}

fn render_nested(value: &Value, depth: usize, out: &mut Bounded) {
    if depth > MAX_DEPTH {
        out.push("Array(...)");
        return;
    }
    out.push("Array(");
    match value {
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                if !separate(i, out) {
                    break;
                }
                render_nested_value(item, depth, out);
            }
        }
        Value::Object(map) => {
            for (i, (key, item)) in map.iter().enumerate() {
                if !separate(i, out) {
                    break;
                }
                out.push(&truncate(key, MAX_STRING_LEN));
                out.push(" => ");
                render_nested_value(item, depth, out);
            }
        }
        _ => {}
    }
    out.push(")");
}

/// Writes the separator before element `i`; returns `false` when rendering should stop.
fn separate(i: usize, out: &mut Bounded) -> bool {
    if out.is_full() {
        return false;
    }
    if i >= MAX_ELEMENTS {
        out.push(", ");
        out.push(ELLIPSIS);
        return false;
    }
    if i > 0 {
        out.push(", ");
    }
    true
}

fn render_nested_value(value: &Value, depth: usize, out: &mut Bounded) {
    match value {
        Value::String(s) => {
            out.push("'");
            out.push(&truncate(s, MAX_STRING_LEN));
            out.push("'");
        }
        Value::Array(_) | Value::Object(_) => render_nested(value, depth + 1, out),
        other => {
            out.push(value_type_name(other));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 64), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
        // Multi-byte characters are cut on char boundaries
        assert_eq!(truncate("héllo", 2), "hé...");
    }

    #[test]
    fn test_value_type_names() {
        assert_eq!(value_type_name(&json!(1)), "int");
        assert_eq!(value_type_name(&json!(1.5)), "float");
        assert_eq!(value_type_name(&json!(false)), "bool");
        assert_eq!(value_type_name(&json!(null)), "null");
        assert_eq!(value_type_name(&json!("x")), "string");
        assert_eq!(value_type_name(&json!([])), "array");
        assert_eq!(value_type_name(&json!({})), "map");
    }

    #[test]
    fn test_dump_is_bounded() {
        let big: Vec<u32> = (0..10_000).collect();
        let dump = dump_value(&json!(big), 64);
        assert_eq!(dump.chars().count(), 64 + ELLIPSIS.len());
        assert!(dump.starts_with("[0, 1, 2"));
        assert!(dump.ends_with(ELLIPSIS));
    }

    #[test]
    fn test_dump_small_values() {
        assert_eq!(dump_value(&json!(42), 64), "42");
        assert_eq!(dump_value(&json!({"a": [1, "b"]}), 64), "{a: [1, \"b\"]}");
    }

    #[test]
    fn test_summarize_collection() {
        let summary = summarize_collection(&json!(["Some Text", 42, ["child array"]]), 64);
        assert_eq!(summary, "0 => string, 1 => int, 2 => array");

        let summary = summarize_collection(&json!({"user": "bob"}), 64);
        assert_eq!(summary, "user => string");
    }

    #[test]
    fn test_render_args_hides_scalar_values() {
        let rendered = render_args(&[json!("secret"), json!(1234), json!(null)]);
        assert_eq!(rendered, "string, int, null");
    }

    #[test]
    fn test_render_args_nested() {
        let rendered = render_args(&[json!(["a", 1, {"k": "v"}])]);
        assert_eq!(rendered, "Array('a', int, Array(k => 'v'))");
    }

    #[test]
    fn test_render_args_depth_limit() {
        let rendered = render_args(&[json!([[[["deep"]]]])]);
        assert_eq!(rendered, "Array(Array(Array(Array(...))))");
    }

    #[test]
    fn test_render_args_long_strings_truncated() {
        let long = "x".repeat(200);
        let rendered = render_args(&[json!([long])]);
        assert_eq!(rendered, format!("Array('{}...')", "x".repeat(64)));
    }

    #[test]
    fn test_render_args_is_bounded() {
        let many: Vec<String> = (0..1000).map(|i| format!("value-{}", i)).collect();
        let rendered = render_args(&[json!(many)]);
        assert!(rendered.chars().count() <= MAX_ARGS_LEN + ELLIPSIS.len());
        assert!(rendered.ends_with(ELLIPSIS));
    }
}
