//! Worker capability trait, lifecycle state, and statistics.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

use super::{Envelope, QueueError};

/// Capabilities a queue backend exposes to the surrounding framework.
///
/// Implementations own a mailbox and the loop that drains it.
pub trait Worker: Send + Sync {
    /// Hook invoked before [`Worker::run`].
    ///
    /// # Errors
    ///
    /// Implementation-defined.
    fn before_run(&self) -> Result<(), QueueError>;

    /// Hook invoked after [`Worker::run`] returns.
    ///
    /// # Errors
    ///
    /// Implementation-defined.
    fn after_run(&self) -> Result<(), QueueError>;

    /// Consume queued work until the queue is shut down and drained.
    ///
    /// A loop runs at most once per worker.
    ///
    /// # Errors
    ///
    /// - `QueueError::QueueShutdown` if shutdown was initiated before the call
    /// - `QueueError::AlreadyStarted` if a loop is running or has already run
    /// - `QueueError::Runtime` if called from inside a tokio runtime
    /// - `QueueError::TaskPanicked` if a task panicked; the loop stops there
    ///   and the worker is shut down
    fn run(&self) -> Result<(), QueueError>;

    /// Stop accepting work and let the loop drain. Idempotent.
    ///
    /// # Errors
    ///
    /// Implementation-defined.
    fn shutdown(&self) -> Result<(), QueueError>;

    /// Submit an envelope without blocking.
    ///
    /// # Errors
    ///
    /// - `QueueError::QueueShutdown` after shutdown
    /// - `QueueError::CapacityExceeded` when the mailbox is full
    fn queue(&self, envelope: Envelope) -> Result<(), QueueError>;

    /// Fixed mailbox bound.
    fn capacity(&self) -> usize;

    /// Currently buffered envelopes.
    fn usage(&self) -> usize;
}

/// Lifecycle of a worker loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerState {
    /// `run` has not been called yet.
    Idle = 0,
    /// The loop is consuming the mailbox.
    Running = 1,
    /// The loop has returned.
    Stopped = 2,
}

impl WorkerState {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Running,
            _ => Self::Stopped,
        }
    }
}

/// Atomic cell holding a [`WorkerState`].
#[derive(Debug)]
pub(crate) struct AtomicWorkerState(AtomicU8);

impl AtomicWorkerState {
    pub(crate) const fn new(state: WorkerState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub(crate) fn load(&self) -> WorkerState {
        WorkerState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn store(&self, state: WorkerState) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Move from `from` to `to`; `false` if the current state is not `from`.
    pub(crate) fn transition(&self, from: WorkerState, to: WorkerState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Statistics about worker throughput and failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Mailbox bound.
    pub capacity: usize,
    /// Envelopes currently buffered.
    pub usage: usize,
    /// Envelopes accepted by `queue`.
    pub submitted: u64,
    /// Envelopes rejected because the mailbox was full.
    pub rejected: u64,
    /// Envelopes whose task returned `Ok`.
    pub completed: u64,
    /// Envelopes whose task returned an application error.
    pub failed: u64,
    /// Envelopes that ran past their timeout.
    pub timed_out: u64,
    /// Task units detached after the abandon grace period.
    pub abandoned: u64,
}

/// Internal counters for worker statistics (thread-safe).
#[derive(Debug, Default)]
pub(crate) struct WorkerCounters {
    pub submitted: AtomicU64,
    pub rejected: AtomicU64,
    pub completed: AtomicU64,
    pub failed: AtomicU64,
    pub timed_out: AtomicU64,
    pub abandoned: AtomicU64,
}

impl WorkerCounters {
    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current statistics.
    pub(crate) fn snapshot(&self, capacity: usize, usage: usize) -> WorkerStats {
        WorkerStats {
            capacity,
            usage,
            submitted: self.submitted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
        }
    }
}
