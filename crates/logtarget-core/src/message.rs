//! Message extraction from log items.

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::item::LogItem;
use crate::render::{scalar_text, summarize_collection, value_type_name, MAX_STRING_LEN};

/// Derive the message text for `item`.
///
/// Never fails. If a [`Throwable`](crate::Throwable) panics while being
/// asked for its message, a placeholder naming the item's type is returned
/// instead.
///
/// The panic is still reported by the process panic hook, which by default
/// prints it to stderr. Applications that want silent recovery should
/// install their own hook with [`std::panic::set_hook`].
pub fn extract_message(item: &LogItem) -> String {
    match catch_unwind(AssertUnwindSafe(|| message_for(item))) {
        Ok(message) => message,
        Err(_) => {
            let described = describe(item);
            tracing::warn!(item = %described, "message extraction panicked");
            format!("Error thrown by {} while logging message", described)
        }
    }
}

fn message_for(item: &LogItem) -> String {
    match item {
        LogItem::Error(error) => error.message(),
        LogItem::XmlError(xml) => xml.message.trim().to_string(),
        LogItem::Object { type_name } => format!("object class:{}", type_name),
        LogItem::Text(text) => text.clone(),
        LogItem::Collection(value) => {
            format!("Array: {}", summarize_collection(value, MAX_STRING_LEN))
        }
        LogItem::Scalar(value) => format!("{}: {}", value_type_name(value), scalar_text(value)),
    }
}

fn describe(item: &LogItem) -> String {
    match item {
        LogItem::Error(error) => {
            // The type name accessor belongs to the same misbehaving value
            match catch_unwind(AssertUnwindSafe(|| error.type_name().to_string())) {
                Ok(type_name) => format!("object class:{}", type_name),
                Err(_) => item.kind().to_string(),
            }
        }
        LogItem::Object { type_name } => format!("object class:{}", type_name),
        other => other.kind().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::StackFrame;
    use crate::item::{Failure, Throwable, XmlError, XmlErrorLevel};
    use crate::render::ELLIPSIS;
    use serde_json::json;

    struct ExplodingError;

    impl Throwable for ExplodingError {
        fn message(&self) -> String {
            panic!("getter failed");
        }

        fn type_name(&self) -> &str {
            "ExplodingError"
        }
    }

    #[test]
    fn test_text_is_verbatim() {
        assert_eq!(extract_message(&LogItem::from("Testing LogError")), "Testing LogError");
        assert_eq!(extract_message(&LogItem::from("")), "");
    }

    #[test]
    fn test_error_message() {
        let item = LogItem::error(std::io::Error::other("boom"));
        assert_eq!(extract_message(&item), "boom");

        let failure = Failure::with_trace("boom", vec![StackFrame::function("f")]);
        assert_eq!(extract_message(&LogItem::from(failure)), "boom");
    }

    #[test]
    fn test_xml_message_is_trimmed() {
        let xml = XmlError::new(XmlErrorLevel::Warning, 1549, "  failed to load entity\n");
        assert_eq!(extract_message(&LogItem::from(xml)), "failed to load entity");
    }

    #[test]
    fn test_object_message() {
        let item = LogItem::Object {
            type_name: "app::Session".to_string(),
        };
        assert_eq!(extract_message(&item), "object class:app::Session");
    }

    #[test]
    fn test_collection_summary() {
        let item = LogItem::from(json!(["Some Text", 42, ["child array"]]));
        assert_eq!(
            extract_message(&item),
            "Array: 0 => string, 1 => int, 2 => array"
        );
    }

    #[test]
    fn test_large_collection_is_bounded() {
        let big: Vec<u32> = (0..10_000).collect();
        let message = extract_message(&LogItem::from(json!(big)));
        assert!(message.starts_with("Array: "));
        assert!(message.ends_with(ELLIPSIS));
        assert!(message.chars().count() <= "Array: ".len() + MAX_STRING_LEN + ELLIPSIS.len());
    }

    #[test]
    fn test_scalar_messages() {
        assert_eq!(extract_message(&LogItem::from(42i64)), "int: 42");
        assert_eq!(extract_message(&LogItem::from(2.5)), "float: 2.5");
        assert_eq!(extract_message(&LogItem::from(false)), "bool: false");
        assert_eq!(extract_message(&LogItem::from(json!(null))), "null: null");
    }

    #[test]
    fn test_panicking_error_yields_placeholder() {
        let item = LogItem::throwable(ExplodingError);
        assert_eq!(
            extract_message(&item),
            "Error thrown by object class:ExplodingError while logging message"
        );
    }
}
