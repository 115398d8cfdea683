//! Per-envelope supervisor enforcing the deadline and isolating panics.
//!
//! Each envelope's work runs as its own tokio task (the "unit"). The guard
//! races the unit against the envelope's deadline and the worker's shutdown
//! signal:
//!
//! - completion returns the unit's result
//! - deadline expiry logs a timeout notice, then keeps waiting for the unit
//! - shutdown cancels the unit's context, then keeps waiting for the unit
//!
//! Waiting after a timeout or cancel is unbounded unless an abandon grace
//! period is configured, in which case the unit is aborted and detached.
//!
//! A panic inside the unit is reported as [`GuardOutcome::Fatal`], which the
//! worker loop never swallows.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinError;
use tracing::{debug, warn};

use super::worker::WorkerCounters;
use super::{AppResult, Envelope, Logger, TaskContext, TaskHandler};

/// Result of supervising one envelope.
#[derive(Debug)]
pub enum GuardOutcome {
    /// The task returned `Ok`.
    Completed,
    /// The task returned an application error. Recoverable.
    Failed(anyhow::Error),
    /// The task panicked. Fatal to the worker loop.
    Fatal(String),
    /// The task outlived the abandon grace period and was detached.
    Abandoned,
}

/// Supervises one envelope at a time on behalf of the worker loop.
pub(crate) struct ExecutionGuard<'a> {
    handler: Arc<dyn TaskHandler>,
    logger: &'a dyn Logger,
    shutdown: watch::Receiver<bool>,
    abandon_after: Option<Duration>,
    counters: &'a WorkerCounters,
}

impl<'a> ExecutionGuard<'a> {
    pub(crate) fn new(
        handler: Arc<dyn TaskHandler>,
        logger: &'a dyn Logger,
        shutdown: watch::Receiver<bool>,
        abandon_after: Option<Duration>,
        counters: &'a WorkerCounters,
    ) -> Self {
        Self {
            handler,
            logger,
            shutdown,
            abandon_after,
            counters,
        }
    }

    /// Run one envelope to completion. Must be called within a tokio runtime.
    pub(crate) async fn run(&self, mut envelope: Envelope) -> GuardOutcome {
        let id = envelope.id();
        let timeout = envelope.timeout();
        let (ctx, cancel) = TaskContext::with_timeout(timeout);
        let deadline = ctx.deadline();

        let task = envelope.take_task();
        let handler = Arc::clone(&self.handler);
        let mut unit = tokio::spawn(async move {
            match task {
                Some(task) => task(ctx).await,
                None => handler.handle(ctx, envelope).await,
            }
        });

        let mut shutdown = self.shutdown.clone();
        tokio::select! {
            biased;
            joined = &mut unit => return classify(joined),
            () = tokio::time::sleep_until(deadline) => {
                WorkerCounters::incr(&self.counters.timed_out);
                self.logger.info(&format!("job timeout: {timeout:?}"));
            }
            _ = shutdown.wait_for(|stopped| *stopped) => {
                debug!(%id, "shutdown during task, cancelling context");
                cancel.cancel();
            }
        }

        let joined = match self.abandon_after {
            None => unit.await,
            Some(grace) => {
                if let Ok(joined) = tokio::time::timeout(grace, &mut unit).await {
                    joined
                } else {
                    unit.abort();
                    WorkerCounters::incr(&self.counters.abandoned);
                    warn!(%id, grace_ms = grace.as_millis(), "task unit abandoned");
                    self.logger
                        .error(&format!("job {id} abandoned after {grace:?} grace period"));
                    return GuardOutcome::Abandoned;
                }
            }
        };
        drop(cancel);
        debug!(%id, "task unit finished after timeout or cancel");
        classify(joined)
    }
}

fn classify(joined: Result<AppResult<()>, JoinError>) -> GuardOutcome {
    match joined {
        Ok(Ok(())) => GuardOutcome::Completed,
        Ok(Err(err)) => GuardOutcome::Failed(err),
        Err(err) if err.is_panic() => GuardOutcome::Fatal(panic_message(err.into_panic())),
        Err(err) => GuardOutcome::Failed(anyhow::anyhow!("task unit cancelled: {err}")),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Short label for an outcome, used in log fields.
pub(crate) const fn outcome_label(outcome: &GuardOutcome) -> &'static str {
    match outcome {
        GuardOutcome::Completed => "completed",
        GuardOutcome::Failed(_) => "failed",
        GuardOutcome::Fatal(_) => "fatal",
        GuardOutcome::Abandoned => "abandoned",
    }
}
