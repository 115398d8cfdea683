//! Worker configuration.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default mailbox capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 4096;

/// Environment variable overriding [`WorkerConfig::capacity`].
pub const ENV_CAPACITY: &str = "QUEUE_CAPACITY";
/// Environment variable overriding [`WorkerConfig::task_threads`].
pub const ENV_TASK_THREADS: &str = "QUEUE_TASK_THREADS";
/// Environment variable overriding [`WorkerConfig::abandon_after_ms`].
pub const ENV_ABANDON_AFTER_MS: &str = "QUEUE_ABANDON_AFTER_MS";

fn default_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_task_threads() -> usize {
    num_cpus::get().clamp(1, 4)
}

/// Configuration for a [`SimpleWorker`](crate::core::SimpleWorker).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Maximum buffered envelopes before `queue` rejects.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Worker threads of the runtime that executes task units.
    #[serde(default = "default_task_threads")]
    pub task_threads: usize,
    /// Once a task has timed out or been cancelled, how long to keep waiting
    /// for it before detaching it. `None` waits until the task returns.
    #[serde(default)]
    pub abandon_after_ms: Option<u64>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            task_threads: default_task_threads(),
            abandon_after_ms: None,
        }
    }
}

impl WorkerConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mailbox capacity.
    #[must_use]
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the task runtime thread count.
    #[must_use]
    pub const fn with_task_threads(mut self, task_threads: usize) -> Self {
        self.task_threads = task_threads;
        self
    }

    /// Set the abandon grace period.
    #[must_use]
    pub fn with_abandon_after(mut self, grace: Option<Duration>) -> Self {
        self.abandon_after_ms = grace.map(|g| u64::try_from(g.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Abandon grace period as a duration.
    #[must_use]
    pub fn abandon_after(&self) -> Option<Duration> {
        self.abandon_after_ms.map(Duration::from_millis)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.capacity == 0 {
            return Err("capacity must be greater than 0".into());
        }
        if self.task_threads == 0 {
            return Err("task_threads must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a description of the parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from the environment, loading `.env` first if present.
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns a description of an unparsable variable or a validation failure.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        let mut cfg = Self::default();
        if let Some(capacity) = read_var(ENV_CAPACITY)? {
            cfg.capacity = capacity;
        }
        if let Some(threads) = read_var(ENV_TASK_THREADS)? {
            cfg.task_threads = threads;
        }
        if let Some(ms) = read_var(ENV_ABANDON_AFTER_MS)? {
            cfg.abandon_after_ms = Some(ms);
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn read_var<T>(name: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| format!("{name}: {e}")),
        Err(_) => Ok(None),
    }
}
