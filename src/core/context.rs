//! Cancellable, deadline-bound execution context handed to every task.

use std::fmt;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// Roughly 30 years; used when `now + timeout` would overflow.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Reason a [`TaskContext`] is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    /// The context's deadline passed.
    DeadlineExceeded,
    /// The context was cancelled, either by shutdown or because the
    /// supervising guard finished.
    Cancelled,
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeadlineExceeded => write!(f, "context deadline exceeded"),
            Self::Cancelled => write!(f, "context canceled"),
        }
    }
}

impl std::error::Error for ContextError {}

/// Execution context passed to tasks and handlers.
///
/// Cancellation is cooperative: a task that never looks at its context keeps
/// running until it returns on its own. Long-running tasks should race their
/// work against [`TaskContext::done`] or poll [`TaskContext::err`].
///
/// # Example
///
/// ```rust,ignore
/// let envelope = Envelope::from_task(
///     |ctx: TaskContext| async move {
///         tokio::select! {
///             reason = ctx.done() => Err(reason.into()),
///             () = do_work() => Ok(()),
///         }
///     },
///     EnvelopeOptions::new().with_timeout(Duration::from_secs(5)),
/// );
/// ```
#[derive(Debug, Clone)]
pub struct TaskContext {
    deadline: Instant,
    cancel: watch::Receiver<bool>,
}

/// Handle that cancels the [`TaskContext`] it was created with.
///
/// Dropping the handle also cancels the context.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancel the associated context. Calling it again has no effect.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl TaskContext {
    /// Create a context that expires `timeout` from now.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> (Self, CancelHandle) {
        let now = Instant::now();
        let deadline = now
            .checked_add(timeout)
            .unwrap_or_else(|| now + FAR_FUTURE);
        Self::with_deadline(deadline)
    }

    /// Create a context that expires at `deadline`.
    #[must_use]
    pub fn with_deadline(deadline: Instant) -> (Self, CancelHandle) {
        let (tx, cancel) = watch::channel(false);
        (Self { deadline, cancel }, CancelHandle { tx })
    }

    /// Instant at which the context expires.
    #[must_use]
    pub const fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Time left before the deadline, zero once it has passed.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Whether the context was cancelled (explicitly or by dropping its handle).
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow() || self.cancel.has_changed().is_err()
    }

    /// Why the context is done, or `None` while it is still live.
    #[must_use]
    pub fn err(&self) -> Option<ContextError> {
        if *self.cancel.borrow() {
            Some(ContextError::Cancelled)
        } else if Instant::now() >= self.deadline {
            Some(ContextError::DeadlineExceeded)
        } else if self.cancel.has_changed().is_err() {
            Some(ContextError::Cancelled)
        } else {
            None
        }
    }

    /// Resolve once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> ContextError {
        let mut cancel = self.cancel.clone();
        tokio::select! {
            _ = cancel.wait_for(|cancelled| *cancelled) => ContextError::Cancelled,
            () = tokio::time::sleep_until(self.deadline) => ContextError::DeadlineExceeded,
        }
    }
}
