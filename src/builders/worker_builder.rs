//! Builder for [`SimpleWorker`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::WorkerConfig;
use crate::core::{
    AppResult, Envelope, FnHandler, Logger, NoopHandler, QueueError, SimpleWorker, TaskContext,
    TaskHandler, TracingLogger,
};

/// Configures and builds a [`SimpleWorker`].
///
/// ```rust,ignore
/// let worker = SimpleWorker::builder()
///     .with_capacity(128)
///     .with_run_fn(|_ctx, envelope| async move {
///         store(envelope.payload()).await
///     })
///     .build()?;
/// ```
pub struct WorkerBuilder {
    config: WorkerConfig,
    handler: Arc<dyn TaskHandler>,
    logger: Arc<dyn Logger>,
}

impl Default for WorkerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerBuilder {
    /// Builder with default configuration, a no-op handler and the tracing logger.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(WorkerConfig::default())
    }

    /// Builder starting from an existing configuration.
    #[must_use]
    pub fn from_config(config: WorkerConfig) -> Self {
        Self {
            config,
            handler: Arc::new(NoopHandler),
            logger: Arc::new(TracingLogger),
        }
    }

    /// Set the mailbox capacity.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.config = self.config.with_capacity(capacity);
        self
    }

    /// Set the number of task runtime threads.
    #[must_use]
    pub fn with_task_threads(mut self, task_threads: usize) -> Self {
        self.config = self.config.with_task_threads(task_threads);
        self
    }

    /// Detach tasks that keep running this long after a timeout or cancel.
    #[must_use]
    pub fn with_abandon_after(mut self, grace: Duration) -> Self {
        self.config = self.config.with_abandon_after(Some(grace));
        self
    }

    /// Set the handler for payload envelopes.
    #[must_use]
    pub fn with_handler(mut self, handler: impl TaskHandler) -> Self {
        self.handler = Arc::new(handler);
        self
    }

    /// Set the handler for payload envelopes from an async closure.
    #[must_use]
    pub fn with_run_fn<F, Fut>(self, f: F) -> Self
    where
        F: Fn(TaskContext, Envelope) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<()>> + Send + 'static,
    {
        self.with_handler(FnHandler::new(f))
    }

    /// Set the logger collaborator.
    #[must_use]
    pub fn with_logger(mut self, logger: impl Logger + 'static) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    /// Configuration the worker will be built with.
    #[must_use]
    pub const fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Build the worker.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::InvalidConfig` if the configuration is invalid.
    pub fn build(self) -> Result<SimpleWorker, QueueError> {
        SimpleWorker::new(&self.config, self.handler, self.logger)
    }
}
