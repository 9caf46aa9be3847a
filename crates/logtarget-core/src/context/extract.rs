//! Automatic context generation.

use std::panic::{catch_unwind, AssertUnwindSafe};

use super::{Context, StackCapture};
use crate::item::LogItem;

/// Leading frames dropped from a fresh capture when logging through
/// [`LogSink::log_at_level`](crate::LogSink::log_at_level): the extractor
/// itself and the sink's dispatch frame.
pub const INTERNAL_FRAMES: usize = 2;

/// Leading frames dropped when logging through a convenience wrapper such as
/// the global `log_error`: the two internal frames plus the wrapper.
pub const WRAPPED_INTERNAL_FRAMES: usize = 3;

/// Derive a context for `item`.
///
/// Error values that carry their own trace return it unchanged, since it
/// reflects where the error was raised. Anything else gets a fresh capture
/// with exactly `internal_frames` leading frames removed. A panic during
/// capture yields an empty context.
///
/// The capture runs inside `catch_unwind`; [`StackCapture`] implementations
/// leave those guard frames out, so they never count towards the trim.
/// A recovered panic still passes through the process panic hook, so the
/// default hook prints it to stderr.
#[inline(never)]
pub fn extract_context(
    item: &LogItem,
    capture: &dyn StackCapture,
    internal_frames: usize,
) -> Context {
    if let LogItem::Error(error) = item {
        match catch_unwind(AssertUnwindSafe(|| error.trace())) {
            Ok(Some(trace)) => return Context::from(trace),
            Ok(None) => {}
            Err(_) => {
                tracing::warn!(
                    error_type = error.type_name(),
                    "error trace accessor panicked; logging without context"
                );
                return Context::default();
            }
        }
    }

    match catch_unwind(AssertUnwindSafe(|| capture.capture())) {
        Ok(frames) => frames.into_iter().skip(internal_frames).collect(),
        Err(_) => {
            tracing::warn!("stack capture panicked; logging without context");
            Context::default()
        }
    }
}
