//! Integration tests for LogSink with real collaborators
//!
//! Uses the std-backed stack capture, the file system log and
//! configuration files on disk.

use std::fs;
use std::sync::{Arc, Mutex};

use logtarget_core::{
    Context, Failure, FileLog, Level, LogEntry, LogSink, Logger, SinkConfig, XmlError,
    XmlErrorLevel,
};
use serde_json::json;
use tempfile::TempDir;

#[derive(Default)]
struct RecordingLogger(Mutex<Vec<(Level, String, Context)>>);

impl Logger for RecordingLogger {
    fn log(&self, level: Level, message: &str, context: &Context) {
        self.0
            .lock()
            .unwrap()
            .push((level, message.to_string(), context.clone()));
    }
}

#[inline(never)]
fn failing_parser() -> Failure {
    Failure::new("unexpected token").with_kind("ParseError")
}

/// Direct calls capture a context starting at the caller
#[test]
fn test_live_capture_starts_at_caller() {
    let temp = TempDir::new().unwrap();
    let sink = LogSink::builder()
        .system_log(FileLog::open(temp.path().join("system.log")).unwrap())
        .build();

    sink.log_at_level(Level::Critical, "live capture", ());

    let entry = &sink.get_log_raw()[0];
    let first_line = entry.context.lines().nth(2).unwrap();
    assert!(first_line.contains("test_live_capture_starts_at_caller"));
    assert!(!entry.context.contains("log_at_level"));
}

/// A failure keeps the trace from where it was created
#[test]
fn test_failure_trace_points_at_creation_site() {
    let temp = TempDir::new().unwrap();
    let sink = LogSink::builder()
        .system_log(FileLog::open(temp.path().join("system.log")).unwrap())
        .build();

    let failure = failing_parser();
    sink.log_at_level(Level::Error, failure, ());

    let entry = &sink.get_log_raw()[0];
    assert_eq!(entry.message, "unexpected token");
    let first_line = entry.context.lines().nth(2).unwrap();
    assert!(first_line.contains("failing_parser"));
}

/// The file system log receives exactly the fallback lines
#[test]
fn test_file_system_log() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("logs").join("system.log");
    let sink = LogSink::builder()
        .system_log(FileLog::open(&path).unwrap())
        .build();

    sink.log_at_level(Level::Warning, "first", ());
    sink.log_at_level(Level::Debug, "ignored by default", ());
    sink.log_at_level(Level::Notice, json!({"user": "bob", "id": 7}), ());
    let xml = XmlError::new(XmlErrorLevel::Warning, 1549, "failed to load external entity\n")
        .at("Non-Existent-File.bad", 0, 0);
    sink.log_at_level(Level::Info, xml, ());

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "[WARNING] first",
            "[NOTICE] Array: id => int, user => string",
            "[INFO] failed to load external entity",
        ]
    );
    assert_eq!(sink.len(), 4);
}

/// A sink built from a configuration file follows its policy
#[test]
fn test_sink_from_config_file() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("sink.json");
    fs::write(
        &config_path,
        r#"{"store_in_memory": true, "automatic_context_levels": ["warning"], "ignore_levels": ["warning"]}"#,
    )
    .unwrap();
    let log_path = temp.path().join("system.log");

    let sink = LogSink::builder()
        .config(SinkConfig::from_json_file(&config_path).unwrap())
        .system_log(FileLog::open(&log_path).unwrap())
        .build();

    sink.log_at_level(Level::Warning, "captured but not written", ());
    sink.log_at_level(Level::Error, "written without context", ());

    let entries = sink.get_log_raw();
    assert!(!entries[0].context.is_empty());
    assert!(entries[1].context.is_empty());

    let content = fs::read_to_string(&log_path).unwrap();
    assert_eq!(content, "[ERROR] written without context\n");
}

/// External loggers get the raw context, including captured frames
#[test]
fn test_external_logger_receives_raw_context() {
    let logger = Arc::new(RecordingLogger::default());
    let sink = LogSink::builder().logger(logger.clone()).build();

    sink.log_at_level(Level::Alert, "paging", ());
    sink.log_at_level(Level::Info, "plain", json!(["not a frame"]));

    let calls = logger.0.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].2.frames().count() > 0);
    assert_eq!(calls[1].2.frames().count(), 0);
    assert_eq!(calls[1].2.len(), 1);
}

/// The JSONL export can be read back entry by entry
#[test]
fn test_export_and_reload() {
    let temp = TempDir::new().unwrap();
    let sink = LogSink::builder()
        .system_log(FileLog::open(temp.path().join("system.log")).unwrap())
        .build();
    sink.log_at_level(Level::Error, "with context", ());
    sink.log_at_level(Level::Info, "", ());

    let export = temp.path().join("export.jsonl");
    assert_eq!(sink.export_jsonl(&export).unwrap(), 2);

    let reloaded: Vec<LogEntry> = fs::read_to_string(&export)
        .unwrap()
        .lines()
        .map(|line| LogEntry::from_json_line(line).unwrap())
        .collect();
    assert_eq!(reloaded, sink.get_log_raw());
    assert_eq!(reloaded[1].display_message(), "(MESSAGE NOT SUPPLIED)");
}
