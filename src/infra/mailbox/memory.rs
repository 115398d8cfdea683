//! In-memory bounded FIFO mailbox.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;

use crate::core::{Envelope, QueueError};

/// Fixed-capacity FIFO buffer between producers and the worker loop.
///
/// Backed by a bounded crossbeam channel. Enqueue never blocks: a full
/// mailbox rejects with `CapacityExceeded`. Closing drops the only sender,
/// so the dequeue sequence drains what is buffered and then ends.
pub struct BoundedMailbox {
    capacity: usize,
    /// `None` once closed. Held only for the duration of a `try_send`.
    tx: Mutex<Option<Sender<Envelope>>>,
    rx: Receiver<Envelope>,
}

impl BoundedMailbox {
    /// Create a mailbox holding at most `capacity` envelopes.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "capacity must be positive");
        let (tx, rx) = bounded(capacity);
        Self {
            capacity,
            tx: Mutex::new(Some(tx)),
            rx,
        }
    }

    /// Enqueue an envelope without blocking.
    ///
    /// # Errors
    ///
    /// - `QueueError::CapacityExceeded` if the mailbox is full
    /// - `QueueError::QueueShutdown` if the mailbox has been closed
    pub fn enqueue(&self, envelope: Envelope) -> Result<(), QueueError> {
        let tx = self.tx.lock();
        let Some(tx) = tx.as_ref() else {
            return Err(QueueError::QueueShutdown);
        };
        match tx.try_send(envelope) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(QueueError::CapacityExceeded),
            Err(TrySendError::Disconnected(_)) => Err(QueueError::QueueShutdown),
        }
    }

    /// Blocking, exhaustible sequence of envelopes in FIFO order.
    ///
    /// Each `next()` blocks until an envelope is available and returns `None`
    /// once the mailbox is closed and drained.
    pub fn dequeue(&self) -> impl Iterator<Item = Envelope> + '_ {
        self.rx.iter()
    }

    /// Take the next envelope if one is buffered, without blocking.
    ///
    /// For tooling and tests that inspect a mailbox with no loop attached.
    /// Calling it while a worker loop drains the same mailbox steals that
    /// envelope from the loop.
    #[must_use]
    pub fn try_dequeue(&self) -> Option<Envelope> {
        self.rx.try_recv().ok()
    }

    /// Stop accepting envelopes. Returns `true` for the call that closed it.
    pub fn close(&self) -> bool {
        self.tx.lock().take().is_some()
    }

    /// Whether the mailbox has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.lock().is_none()
    }

    /// Number of buffered envelopes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.rx.len()
    }

    /// Fixed bound set at construction.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl std::fmt::Debug for BoundedMailbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedMailbox")
            .field("capacity", &self.capacity)
            .field("size", &self.size())
            .field("closed", &self.is_closed())
            .finish()
    }
}
