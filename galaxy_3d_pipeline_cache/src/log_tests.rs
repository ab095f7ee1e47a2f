//! Unit tests for log.rs
//!
//! Tests Logger trait, LogEntry, LogSeverity, DefaultLogger and the logging macros.

use crate::error::{Error, Result};
use crate::log::{DefaultLogger, Log, LogEntry, LogSeverity, Logger};
use serial_test::serial;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

/// Captures entries from one source only (other tests may log concurrently)
struct CaptureLogger {
    source: &'static str,
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl CaptureLogger {
    fn new(source: &'static str) -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { source, entries: entries.clone() }, entries)
    }
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.source == self.source {
            self.entries.lock().unwrap().push(entry.clone());
        }
    }
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_debug() {
    assert_eq!(format!("{:?}", LogSeverity::Trace), "Trace");
    assert_eq!(format!("{:?}", LogSeverity::Error), "Error");
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_default_logger_all_severities() {
    let logger = DefaultLogger;
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        logger.log(&LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: "galaxy3d::test".to_string(),
            message: format!("{:?} message", severity),
            file: None,
            line: None,
        });
    }
}

#[test]
fn test_default_logger_error_with_file_line() {
    DefaultLogger.log(&LogEntry {
        severity: LogSeverity::Error,
        timestamp: SystemTime::now(),
        source: "galaxy3d::test".to_string(),
        message: "descriptor allocation failed".to_string(),
        file: Some("descriptor_set_cache.rs"),
        line: Some(120),
    });
}

#[test]
fn test_logger_trait_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DefaultLogger>();
}

// ============================================================================
// REGISTRY + MACRO TESTS
// ============================================================================

#[test]
#[serial]
fn test_custom_logger_receives_macro_output() {
    let (logger, entries) = CaptureLogger::new("galaxy3d::test::macros");
    Log::set_logger(logger);

    crate::engine_trace!("galaxy3d::test::macros", "trace {}", 1);
    crate::engine_info!("galaxy3d::test::macros", "info {}", 2);
    crate::engine_error!("galaxy3d::test::macros", "error {}", 3);

    Log::reset_logger();

    let entries = entries.lock().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].severity, LogSeverity::Trace);
    assert_eq!(entries[0].message, "trace 1");
    assert!(entries[0].file.is_none());
    assert_eq!(entries[1].severity, LogSeverity::Info);
    assert_eq!(entries[2].severity, LogSeverity::Error);
    assert!(entries[2].file.is_some());
    assert!(entries[2].line.is_some());
}

#[test]
#[serial]
fn test_engine_err_logs_and_builds_backend_error() {
    let (logger, entries) = CaptureLogger::new("galaxy3d::test::err");
    Log::set_logger(logger);

    let err = crate::engine_err!("galaxy3d::test::err", "vkAllocateDescriptorSets: {}", "OUT_OF_POOL_MEMORY");

    Log::reset_logger();

    assert_eq!(err, Error::BackendError("vkAllocateDescriptorSets: OUT_OF_POOL_MEMORY".to_string()));
    let entries = entries.lock().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].severity, LogSeverity::Error);
}

#[test]
#[serial]
fn test_engine_bail_returns_early() {
    fn create(fail: bool) -> Result<u32> {
        if fail {
            crate::engine_bail!("galaxy3d::test::bail", "creation failed");
        }
        Ok(7)
    }

    let (logger, entries) = CaptureLogger::new("galaxy3d::test::bail");
    Log::set_logger(logger);

    assert_eq!(create(false), Ok(7));
    assert!(matches!(create(true), Err(Error::BackendError(_))));

    Log::reset_logger();
    assert_eq!(entries.lock().unwrap().len(), 1);
}
