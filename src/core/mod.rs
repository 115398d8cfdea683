//! Core queue abstractions: envelope, execution guard, and worker loop.

pub mod codec;
pub mod context;
pub mod envelope;
pub mod error;
pub mod executor;
pub mod guard;
pub mod logger;
pub mod simple;
pub mod worker;

pub use context::{CancelHandle, ContextError, TaskContext};
pub use envelope::{
    Envelope, EnvelopeOptions, QueuedMessage, TaskFn, DEFAULT_RETRY_DELAY, DEFAULT_TIMEOUT,
};
pub use error::{AppResult, CodecError, QueueError};
pub use executor::{FnHandler, NoopHandler, TaskHandler};
pub use guard::GuardOutcome;
pub use logger::{InMemoryLogger, LogLevel, LogRecord, Logger, TracingLogger};
pub use simple::SimpleWorker;
pub use worker::{Worker, WorkerState, WorkerStats};
