//! Logging collaborator used by the worker loop.
//!
//! Provides a `tracing`-backed default and an in-memory recorder.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::util::clock::now_ms;

/// Severity of a recorded log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Informational notice (e.g. a task exceeded its timeout).
    Info,
    /// Recoverable failure (e.g. a task returned an error).
    Error,
}

/// Logger abstraction consumed by the worker.
pub trait Logger: Send + Sync {
    /// Log an informational message.
    fn info(&self, message: &str);
    /// Log an error message.
    fn error(&self, message: &str);
}

/// Default logger forwarding to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(target: "prometheus_task_queue", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "prometheus_task_queue", "{message}");
    }
}

/// Recorded log line.
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// Severity.
    pub level: LogLevel,
    /// Message text.
    pub message: String,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
}

/// In-memory logger keeping the most recent `max_records` lines.
///
/// Cloning shares the underlying buffer, so a clone can be handed to the
/// worker while the original is kept for inspection.
#[derive(Debug, Clone)]
pub struct InMemoryLogger {
    records: Arc<Mutex<VecDeque<LogRecord>>>,
    max_records: usize,
}

impl InMemoryLogger {
    /// Create a new logger with a bounded buffer.
    #[must_use]
    pub fn new(max_records: usize) -> Self {
        Self {
            records: Arc::new(Mutex::new(VecDeque::with_capacity(max_records.min(1024)))),
            max_records,
        }
    }

    /// Snapshot of stored records, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().iter().cloned().collect()
    }

    /// Messages recorded at `level`, oldest first.
    #[must_use]
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.level == level)
            .map(|r| r.message.clone())
            .collect()
    }

    fn record(&self, level: LogLevel, message: &str) {
        let mut records = self.records.lock();
        if records.len() >= self.max_records {
            records.pop_front();
        }
        records.push_back(LogRecord {
            level,
            message: message.to_owned(),
            created_at_ms: now_ms(),
        });
    }
}

impl Default for InMemoryLogger {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl Logger for InMemoryLogger {
    fn info(&self, message: &str) {
        self.record(LogLevel::Info, message);
    }

    fn error(&self, message: &str) {
        self.record(LogLevel::Error, message);
    }
}
