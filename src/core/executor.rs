//! Handler abstraction for payload envelopes.

use std::future::Future;

use async_trait::async_trait;

use super::{AppResult, Envelope, TaskContext};

/// Runs payload envelopes, i.e. envelopes that carry no callable task.
///
/// Task envelopes run their own callable; every other envelope is handed to
/// the worker's handler together with its execution context.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use prometheus_task_queue::core::{AppResult, Envelope, TaskContext, TaskHandler};
///
/// struct Printer;
///
/// #[async_trait]
/// impl TaskHandler for Printer {
///     async fn handle(&self, _ctx: TaskContext, envelope: Envelope) -> AppResult<()> {
///         println!("{}", String::from_utf8_lossy(envelope.payload()));
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait TaskHandler: Send + Sync + 'static {
    /// Process one envelope.
    ///
    /// Returning `Err` is an application error: it is logged and the worker
    /// moves on. Panicking is fatal to the worker loop.
    async fn handle(&self, ctx: TaskContext, envelope: Envelope) -> AppResult<()>;
}

/// Handler that accepts every envelope and does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

#[async_trait]
impl TaskHandler for NoopHandler {
    async fn handle(&self, _ctx: TaskContext, _envelope: Envelope) -> AppResult<()> {
        Ok(())
    }
}

/// Adapter turning an async closure into a [`TaskHandler`].
#[derive(Debug, Clone)]
pub struct FnHandler<F> {
    f: F,
}

impl<F> FnHandler<F> {
    /// Wrap a closure.
    pub const fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> TaskHandler for FnHandler<F>
where
    F: Fn(TaskContext, Envelope) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = AppResult<()>> + Send + 'static,
{
    async fn handle(&self, ctx: TaskContext, envelope: Envelope) -> AppResult<()> {
        (self.f)(ctx, envelope).await
    }
}
