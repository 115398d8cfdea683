//! Error types for queue operations.

use thiserror::Error;

/// Errors produced by the queue and its worker loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Operation attempted after shutdown was initiated.
    #[error("queue has been closed and released")]
    QueueShutdown,
    /// `run` was called on a worker whose loop is running or has finished.
    #[error("worker loop already started")]
    AlreadyStarted,
    /// Mailbox is full; the caller should back off or drop the message.
    #[error("max capacity reached")]
    CapacityExceeded,
    /// A task panicked inside its execution unit. Fatal to the worker loop.
    #[error("task panicked: {0}")]
    TaskPanicked(String),
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The task runtime could not be started.
    #[error("runtime error: {0}")]
    Runtime(String),
}

/// Errors produced when encoding or decoding an envelope.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The encoded form was written by an unknown codec version.
    #[error("unsupported envelope version: {0}")]
    UnsupportedVersion(u8),
    /// The bytes are not a valid encoded envelope.
    #[error("malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Application-facing result using anyhow; tasks and handlers return this.
pub type AppResult<T> = Result<T, anyhow::Error>;
