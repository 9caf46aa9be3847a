//! Stack-trace capture.
//!
//! [`StackCapture`] is the platform capability the context extractor relies
//! on. [`BacktraceCapture`] implements it on top of `std::backtrace`, parsing
//! the rendered trace into [`StackFrame`] records.

use std::backtrace::{Backtrace, BacktraceStatus};

use super::StackFrame;

/// Captures the current call stack.
///
/// Implementations return frames innermost first, starting with the frame
/// that called `capture`. Their own frames must not appear in the result,
/// and neither may unwind-guard frames (`catch_unwind` and its closure)
/// sitting directly above them.
pub trait StackCapture: Send + Sync {
    fn capture(&self) -> Vec<StackFrame>;
}

/// [`StackCapture`] backed by `std::backtrace::Backtrace::force_capture`.
///
/// Capture works regardless of `RUST_BACKTRACE`. File and line information
/// depends on debug info being present in the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktraceCapture;

impl BacktraceCapture {
    pub fn new() -> Self {
        Self
    }
}

impl StackCapture for BacktraceCapture {
    #[inline(never)]
    fn capture(&self) -> Vec<StackFrame> {
        let backtrace = Backtrace::force_capture();
        if backtrace.status() != BacktraceStatus::Captured {
            return Vec::new();
        }
        let frames = parse_backtrace(&backtrace.to_string());
        skip_capture_frames(frames)
    }
}

/// Drop the std machinery frames and this module's own `capture` frame.
fn skip_capture_frames(frames: Vec<StackFrame>) -> Vec<StackFrame> {
    let own_frame = frames.iter().position(|frame| {
        frame.function.as_deref() == Some("capture")
            && frame
                .class
                .as_deref()
                .map(|class| class.ends_with("BacktraceCapture"))
                .unwrap_or(false)
    });

    match own_frame {
        Some(idx) => frames
            .into_iter()
            .skip(idx + 1)
            .skip_while(is_unwind_guard)
            .collect(),
        None => frames
            .into_iter()
            .skip_while(|frame| {
                frame
                    .function
                    .as_deref()
                    .map(is_backtrace_machinery)
                    .unwrap_or(true)
                    || frame
                        .class
                        .as_deref()
                        .map(is_backtrace_machinery)
                        .unwrap_or(false)
            })
            .collect(),
    }
}

/// `catch_unwind` plumbing between the caller and the capture.
fn is_unwind_guard(frame: &StackFrame) -> bool {
    let function = frame.function.as_deref().unwrap_or("");
    let class = frame.class.as_deref().unwrap_or("");
    function.contains("{{closure}}")
        || function == "call_once"
        || function.starts_with("std::panicking")
        || function.starts_with("std::panic::")
        || function.starts_with("__rust_try")
        || class.starts_with("AssertUnwindSafe")
        || class.starts_with("FnOnce")
}

fn is_backtrace_machinery(name: &str) -> bool {
    name.starts_with("std::backtrace")
        || name.starts_with("backtrace::")
        || name == "Backtrace"
        || name == "force_capture"
        || name == "create"
        || name == "trace"
        || name == "trace_unsynchronized"
}

/// Parse the text rendering of a `std::backtrace::Backtrace`.
///
/// Handles both the short and the full format:
///
/// ```text
///    4: logtarget_core::sink::LogSink::dispatch
///              at ./crates/logtarget-core/src/sink/mod.rs:210:21
///    5: 0x55d0c3 - my_app::main::h0123456789abcdef
/// ```
pub(crate) fn parse_backtrace(text: &str) -> Vec<StackFrame> {
    let mut frames: Vec<StackFrame> = Vec::new();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('[') {
            continue;
        }

        if let Some(location) = line.strip_prefix("at ") {
            if let Some(frame) = frames.last_mut() {
                let (file, line_no) = parse_location(location);
                frame.file = Some(file);
                frame.line = line_no;
            }
            continue;
        }

        let symbol = match strip_frame_index(line) {
            Some(symbol) => symbol,
            // Inlined symbols are printed without an index under their frame
            None if raw.starts_with(' ') && !frames.is_empty() => line,
            None => continue,
        };

        frames.push(frame_from_symbol(symbol));
    }

    frames
}

/// `"12: name"` -> `"name"`, also dropping a full-format `"0x... - "` address.
fn strip_frame_index(line: &str) -> Option<&str> {
    let (index, rest) = line.split_once(": ")?;
    if index.is_empty() || !index.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let rest = rest.trim_start();
    match rest.split_once(" - ") {
        Some((addr, symbol)) if addr.starts_with("0x") => Some(symbol),
        _ => Some(rest),
    }
}

/// `"path/to/file.rs:12:5"` -> (`"path/to/file.rs"`, `Some(12)`).
fn parse_location(location: &str) -> (String, Option<u32>) {
    let mut parts = location.rsplitn(3, ':');
    let last = parts.next();
    let middle = parts.next();
    let head = parts.next();

    match (head, middle, last) {
        (Some(file), Some(line), Some(_col)) if line.parse::<u32>().is_ok() => {
            (file.to_string(), line.parse().ok())
        }
        (_, Some(_), Some(line)) if line.parse::<u32>().is_ok() => {
            let file = location.rsplit_once(':').map(|(f, _)| f).unwrap_or(location);
            (file.to_string(), line.parse().ok())
        }
        _ => (location.to_string(), None),
    }
}

fn frame_from_symbol(symbol: &str) -> StackFrame {
    let symbol = strip_hash(symbol);
    if symbol == "<unknown>" {
        return StackFrame::default();
    }

    // `<Type as Trait>::method`
    if let Some(rest) = symbol.strip_prefix('<') {
        if let Some(close) = find_matching_close(rest) {
            let qualified = &rest[..close];
            let receiver = qualified
                .split_once(" as ")
                .map(|(ty, _)| ty)
                .unwrap_or(qualified);
            let function = rest[close + 1..].trim_start_matches("::");
            return StackFrame::method(last_segment(receiver), function);
        }
    }

    let segments: Vec<&str> = symbol.split("::").collect();
    match segments.as_slice() {
        [.., owner, function] if is_type_name(owner) => StackFrame::method(*owner, *function),
        _ => StackFrame::function(symbol),
    }
}

/// Remove the `::h0123456789abcdef` suffix of legacy-mangled names.
fn strip_hash(symbol: &str) -> &str {
    match symbol.rsplit_once("::h") {
        Some((head, hash)) if hash.len() == 16 && hash.chars().all(|c| c.is_ascii_hexdigit()) => {
            head
        }
        _ => symbol,
    }
}

fn find_matching_close(s: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (idx, ch) in s.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

fn is_type_name(segment: &str) -> bool {
    segment
        .chars()
        .next()
        .map(|c| c.is_ascii_uppercase())
        .unwrap_or(false)
}
