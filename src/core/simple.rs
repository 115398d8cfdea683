//! Channel-backed worker: one bounded mailbox drained by one loop.
//!
//! The loop runs on the calling thread (or a dedicated thread via
//! [`SimpleWorker::start`]) and blocks on the mailbox between envelopes.
//! Each envelope is handed to the execution guard, which runs the task on a
//! multi-threaded task runtime owned by the loop.
//!
//! # Design Principles
//!
//! - **No polling**: the loop blocks on channel recv; closing the mailbox
//!   ends the sequence once it is drained
//! - **Backpressure**: `queue` never blocks, a full mailbox rejects
//! - **One-shot shutdown**: a `parking_lot::Once` guards the close transition
//! - **Fatal vs recoverable**: application errors are logged, panics stop the loop

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Once;
use tokio::runtime::{Handle, Runtime};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::builders::WorkerBuilder;
use crate::config::WorkerConfig;
use crate::infra::BoundedMailbox;
use crate::runtime::build_task_runtime;

use super::guard::{outcome_label, ExecutionGuard, GuardOutcome};
use super::worker::{AtomicWorkerState, WorkerCounters};
use super::{Envelope, Logger, QueueError, TaskHandler, Worker, WorkerState, WorkerStats};

/// Name of the thread spawned by [`SimpleWorker::start`].
pub const WORKER_THREAD_NAME: &str = "pq-worker";

/// Bounded, single-consumer in-memory worker.
pub struct SimpleWorker {
    mailbox: BoundedMailbox,
    handler: Arc<dyn TaskHandler>,
    logger: Arc<dyn Logger>,
    /// Raised exactly once by `shutdown`.
    stop: watch::Sender<bool>,
    stop_once: Once,
    state: AtomicWorkerState,
    counters: WorkerCounters,
    task_threads: usize,
    abandon_after: Option<Duration>,
}

impl SimpleWorker {
    /// Start configuring a worker.
    #[must_use]
    pub fn builder() -> WorkerBuilder {
        WorkerBuilder::new()
    }

    /// Create a worker from validated configuration and its collaborators.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::InvalidConfig` if the configuration is invalid.
    pub fn new(
        config: &WorkerConfig,
        handler: Arc<dyn TaskHandler>,
        logger: Arc<dyn Logger>,
    ) -> Result<Self, QueueError> {
        config.validate().map_err(QueueError::InvalidConfig)?;
        let (stop, _) = watch::channel(false);

        debug!(
            capacity = config.capacity,
            task_threads = config.task_threads,
            abandon_after_ms = config.abandon_after_ms,
            "SimpleWorker created"
        );

        Ok(Self {
            mailbox: BoundedMailbox::new(config.capacity),
            handler,
            logger,
            stop,
            stop_once: Once::new(),
            state: AtomicWorkerState::new(WorkerState::Idle),
            counters: WorkerCounters::default(),
            task_threads: config.task_threads,
            abandon_after: config.abandon_after(),
        })
    }

    /// Run the loop on a dedicated named thread.
    ///
    /// The returned handle yields the result of [`Worker::run`].
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Runtime` if the thread cannot be spawned.
    pub fn start(self: &Arc<Self>) -> Result<JoinHandle<Result<(), QueueError>>, QueueError> {
        let worker = Arc::clone(self);
        thread::Builder::new()
            .name(WORKER_THREAD_NAME.into())
            .spawn(move || worker.run())
            .map_err(|e| QueueError::Runtime(e.to_string()))
    }

    /// Whether shutdown has been initiated.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        *self.stop.borrow()
    }

    /// Current lifecycle state of the loop.
    #[must_use]
    pub fn state(&self) -> WorkerState {
        self.state.load()
    }

    /// Get current worker statistics.
    #[must_use]
    pub fn stats(&self) -> WorkerStats {
        self.counters
            .snapshot(self.mailbox.capacity(), self.mailbox.size())
    }

    fn drain(&self, runtime: &Runtime) -> Result<(), QueueError> {
        let guard = ExecutionGuard::new(
            Arc::clone(&self.handler),
            self.logger.as_ref(),
            self.stop.subscribe(),
            self.abandon_after,
            &self.counters,
        );

        for envelope in self.mailbox.dequeue() {
            let id = envelope.id();
            debug!(%id, has_task = envelope.has_task(), "Worker executing envelope");

            let outcome = runtime.block_on(guard.run(envelope));
            debug!(%id, outcome = outcome_label(&outcome), "Worker finished envelope");

            match outcome {
                GuardOutcome::Completed => WorkerCounters::incr(&self.counters.completed),
                GuardOutcome::Failed(err) => {
                    WorkerCounters::incr(&self.counters.failed);
                    self.logger.error(&format!("{err:#}"));
                }
                GuardOutcome::Abandoned => {}
                GuardOutcome::Fatal(panic) => {
                    error!(%id, panic = %panic, "Task panicked, stopping worker loop");
                    // Later envelopes must neither run nor be accepted.
                    self.shutdown()?;
                    return Err(QueueError::TaskPanicked(panic));
                }
            }
        }
        Ok(())
    }
}

impl Worker for SimpleWorker {
    fn before_run(&self) -> Result<(), QueueError> {
        Ok(())
    }

    fn after_run(&self) -> Result<(), QueueError> {
        Ok(())
    }

    fn run(&self) -> Result<(), QueueError> {
        if self.is_shutdown() {
            return Err(QueueError::QueueShutdown);
        }
        if Handle::try_current().is_ok() {
            return Err(QueueError::Runtime(
                "run must not be called from within a tokio runtime".into(),
            ));
        }
        if !self.state.transition(WorkerState::Idle, WorkerState::Running) {
            return Err(QueueError::AlreadyStarted);
        }

        let runtime = match build_task_runtime(self.task_threads) {
            Ok(runtime) => runtime,
            Err(e) => {
                self.state.store(WorkerState::Stopped);
                return Err(QueueError::Runtime(e.to_string()));
            }
        };

        info!(
            capacity = self.mailbox.capacity(),
            task_threads = self.task_threads,
            "Worker loop started"
        );

        let result = self.drain(&runtime);

        self.state.store(WorkerState::Stopped);
        // Abandoned units may still hold runtime threads; never wait on them.
        runtime.shutdown_background();
        info!(ok = result.is_ok(), "Worker loop stopped");
        result
    }

    fn shutdown(&self) -> Result<(), QueueError> {
        self.stop_once.call_once(|| {
            self.stop.send_replace(true);
            self.mailbox.close();
            info!(pending = self.mailbox.size(), "Shutting down worker");
        });
        Ok(())
    }

    fn queue(&self, envelope: Envelope) -> Result<(), QueueError> {
        if self.is_shutdown() {
            return Err(QueueError::QueueShutdown);
        }

        let id = envelope.id();
        match self.mailbox.enqueue(envelope) {
            Ok(()) => {
                WorkerCounters::incr(&self.counters.submitted);
                debug!(%id, "Envelope queued");
                Ok(())
            }
            Err(QueueError::CapacityExceeded) => {
                WorkerCounters::incr(&self.counters.rejected);
                warn!(%id, capacity = self.mailbox.capacity(), "Worker mailbox is full");
                Err(QueueError::CapacityExceeded)
            }
            Err(err) => Err(err),
        }
    }

    fn capacity(&self) -> usize {
        self.mailbox.capacity()
    }

    fn usage(&self) -> usize {
        self.mailbox.size()
    }
}

impl std::fmt::Debug for SimpleWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimpleWorker")
            .field("mailbox", &self.mailbox)
            .field("state", &self.state())
            .field("shutdown", &self.is_shutdown())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EnvelopeOptions, InMemoryLogger, LogLevel};

    fn worker(capacity: usize, logger: &InMemoryLogger) -> Arc<SimpleWorker> {
        Arc::new(
            SimpleWorker::builder()
                .with_capacity(capacity)
                .with_task_threads(2)
                .with_logger(logger.clone())
                .build()
                .unwrap(),
        )
    }

    fn wait_until_running(w: &SimpleWorker) {
        for _ in 0..500 {
            if w.state() == WorkerState::Running {
                return;
            }
            thread::sleep(Duration::from_millis(2));
        }
        panic!("worker never reached Running");
    }

    #[test]
    fn test_second_run_rejected_after_stop() {
        let logger = InMemoryLogger::default();
        let w = worker(4, &logger);
        let handle = w.start().unwrap();
        wait_until_running(&w);
        assert_eq!(w.run(), Err(QueueError::AlreadyStarted));

        w.shutdown().unwrap();
        assert_eq!(handle.join().unwrap(), Ok(()));
        assert_eq!(w.run(), Err(QueueError::QueueShutdown));
        assert_eq!(w.state(), WorkerState::Stopped);
    }

    #[tokio::test]
    async fn test_run_inside_runtime_is_rejected() {
        let logger = InMemoryLogger::default();
        let w = worker(4, &logger);
        assert!(matches!(w.run(), Err(QueueError::Runtime(_))));
        assert_eq!(w.state(), WorkerState::Idle);
    }

    #[test]
    fn test_run_after_shutdown_fails_immediately() {
        let logger = InMemoryLogger::default();
        let w = worker(4, &logger);
        w.shutdown().unwrap();

        assert_eq!(w.run(), Err(QueueError::QueueShutdown));
        assert_eq!(w.state(), WorkerState::Idle);
    }

    #[test]
    fn test_state_transitions() {
        let logger = InMemoryLogger::default();
        let w = worker(4, &logger);
        assert_eq!(w.state(), WorkerState::Idle);

        w.queue(Envelope::from_task(|_ctx| async { Ok(()) }, EnvelopeOptions::new()))
            .unwrap();
        let handle = w.start().unwrap();
        wait_until_running(&w);
        w.shutdown().unwrap();

        assert_eq!(handle.join().unwrap(), Ok(()));
        assert_eq!(w.state(), WorkerState::Stopped);
        assert_eq!(w.stats().completed, 1);
    }

    #[test]
    fn test_failed_task_logged_with_message() {
        let logger = InMemoryLogger::default();
        let w = worker(4, &logger);

        w.queue(Envelope::from_task(
            |_ctx| async { Err(anyhow::anyhow!("disk full")) },
            EnvelopeOptions::new(),
        ))
        .unwrap();
        let handle = w.start().unwrap();
        wait_until_running(&w);
        w.shutdown().unwrap();

        assert_eq!(handle.join().unwrap(), Ok(()));
        assert_eq!(logger.messages(LogLevel::Error), vec!["disk full".to_string()]);
        assert_eq!(w.stats().failed, 1);
    }

    #[test]
    fn test_rejections_counted() {
        let logger = InMemoryLogger::default();
        let w = worker(1, &logger);
        w.queue(Envelope::from_message(&"a", EnvelopeOptions::new())).unwrap();
        assert_eq!(
            w.queue(Envelope::from_message(&"b", EnvelopeOptions::new())),
            Err(QueueError::CapacityExceeded)
        );

        let stats = w.stats();
        assert_eq!(stats.submitted, 1);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.usage, 1);
        assert_eq!(stats.capacity, 1);
    }
}
