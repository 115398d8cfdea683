//! Message envelope: the unit of work carried through the mailbox.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use uuid::Uuid;

use super::codec;
use super::{AppResult, CodecError, TaskContext};

/// Default execution bound for an envelope.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60 * 60);
/// Default delay between retries (metadata only).
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Owned callable carried by task envelopes.
pub type TaskFn = Box<dyn FnOnce(TaskContext) -> BoxFuture<'static, AppResult<()>> + Send>;

/// A message handed to the queue by a producer.
pub trait QueuedMessage {
    /// Raw payload of the message.
    fn bytes(&self) -> &[u8];
}

impl QueuedMessage for Vec<u8> {
    fn bytes(&self) -> &[u8] {
        self
    }
}

impl QueuedMessage for String {
    fn bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl QueuedMessage for &str {
    fn bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Execution policy applied to a new envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeOptions {
    timeout: Duration,
    retry_count: u32,
    retry_delay: Duration,
}

impl Default for EnvelopeOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retry_count: 0,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl EnvelopeOptions {
    /// Options with the default policy: 60 minute timeout, no retries, 100ms retry delay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the execution timeout. Zero keeps the default.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        if !timeout.is_zero() {
            self.timeout = timeout;
        }
        self
    }

    /// Set the timeout verbatim, zero included. Used when decoding.
    pub(crate) const fn with_exact_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry count carried as metadata.
    #[must_use]
    pub const fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    /// Set the retry delay carried as metadata.
    #[must_use]
    pub const fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }
}

/// A queued unit of work: either a callable task or an opaque payload,
/// plus its execution policy.
pub struct Envelope {
    id: Uuid,
    task: Option<TaskFn>,
    payload: Vec<u8>,
    timeout: Duration,
    retry_count: u32,
    retry_delay: Duration,
    raw: Vec<u8>,
}

impl Envelope {
    /// Build a payload envelope from a queued message. The envelope has no task.
    pub fn from_message(message: &impl QueuedMessage, opts: EnvelopeOptions) -> Self {
        Self::from_parts(Uuid::new_v4(), None, message.bytes().to_vec(), opts)
    }

    /// Build a task envelope from an async callable. The payload is empty.
    pub fn from_task<F, Fut>(task: F, opts: EnvelopeOptions) -> Self
    where
        F: FnOnce(TaskContext) -> Fut + Send + 'static,
        Fut: Future<Output = AppResult<()>> + Send + 'static,
    {
        let task: TaskFn = Box::new(move |ctx| task(ctx).boxed());
        Self::from_parts(Uuid::new_v4(), Some(task), Vec::new(), opts)
    }

    pub(crate) fn from_parts(
        id: Uuid,
        task: Option<TaskFn>,
        payload: Vec<u8>,
        opts: EnvelopeOptions,
    ) -> Self {
        Self {
            id,
            task,
            payload,
            timeout: opts.timeout,
            retry_count: opts.retry_count,
            retry_delay: opts.retry_delay,
            raw: Vec::new(),
        }
    }

    /// Identifier used to correlate log lines.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Opaque payload; empty for task envelopes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Execution bound.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Retry count (metadata only).
    #[must_use]
    pub const fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Retry delay (metadata only).
    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Whether this envelope still carries a callable task.
    #[must_use]
    pub const fn has_task(&self) -> bool {
        self.task.is_some()
    }

    pub(crate) fn take_task(&mut self) -> Option<TaskFn> {
        self.task.take()
    }

    /// Encode the transportable fields and cache the result as the raw form
    /// returned by [`QueuedMessage::bytes`].
    ///
    /// # Errors
    ///
    /// Returns `CodecError` if serialization fails.
    pub fn encode(&mut self) -> Result<(), CodecError> {
        self.raw = codec::encode(self)?;
        Ok(())
    }

    /// Decode an envelope previously produced by [`Envelope::encode`].
    ///
    /// # Errors
    ///
    /// See [`codec::decode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        codec::decode(bytes)
    }
}

impl QueuedMessage for Envelope {
    fn bytes(&self) -> &[u8] {
        &self.raw
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("id", &self.id)
            .field("has_task", &self.task.is_some())
            .field("payload_len", &self.payload.len())
            .field("timeout", &self.timeout)
            .field("retry_count", &self.retry_count)
            .field("retry_delay", &self.retry_delay)
            .finish_non_exhaustive()
    }
}
