//! The pipeline message bus.
//!
//! A multi-producer FIFO built on a kanal channel. Elements post from their
//! own threads; the controller is the single consumer. Every handle is a
//! clone of the same channel, so posting is safe from anywhere.

use super::message::{Message, MessageMask};
use crate::error::{Error, Result};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Thread-safe, filterable message queue.
#[derive(Clone)]
pub struct Bus {
    tx: kanal::Sender<Message>,
    rx: kanal::Receiver<Message>,
    // Last assigned sequence number. Held while sending so that sequence
    // order and queue order agree.
    seqnum: Arc<Mutex<u64>>,
}

impl Bus {
    /// Create a new, open bus.
    pub fn new() -> Self {
        let (tx, rx) = kanal::unbounded();
        Self {
            tx,
            rx,
            seqnum: Arc::new(Mutex::new(0)),
        }
    }

    /// Post a message, assigning its sequence number.
    ///
    /// Fails only once the bus has been closed.
    pub fn post(&self, message: Message) -> Result<()> {
        let mut last = self.seqnum.lock().unwrap_or_else(PoisonError::into_inner);
        let message = message.stamped(*last + 1);
        tracing::trace!(seqnum = message.seqnum(), message = %message, "bus post");
        self.tx.send(message).map_err(|_| Error::BusClosed)?;
        *last += 1;
        Ok(())
    }

    /// Block until a message arrives. `None` means end-of-bus.
    pub fn pop(&self) -> Option<Message> {
        self.rx.recv().ok()
    }

    /// Wait up to `timeout` for the next message of any kind.
    pub fn timed_pop(&self, timeout: Duration) -> Option<Message> {
        self.timed_pop_filtered(Some(timeout), MessageMask::ALL)
    }

    /// Wait for the next message whose kind is in `mask`.
    ///
    /// With `Some(timeout)` this returns `None` once the timeout expires;
    /// `Some(Duration::ZERO)` only looks at what is already queued. With
    /// `None` it blocks until a matching message arrives or the bus closes.
    ///
    /// Messages outside `mask` that are popped while waiting are dropped.
    pub fn timed_pop_filtered(
        &self,
        timeout: Option<Duration>,
        mask: MessageMask,
    ) -> Option<Message> {
        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            let message = match deadline {
                None => self.rx.recv().ok()?,
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        self.rx.try_recv().ok().flatten()?
                    } else {
                        self.rx.recv_timeout(remaining).ok()?
                    }
                }
            };

            if mask.matches(message.message_type()) {
                return Some(message);
            }
            tracing::trace!(seqnum = message.seqnum(), message = %message, "dropped by filter");
        }
    }

    /// Receive the next message from async code. `None` means end-of-bus.
    pub async fn pop_async(&self) -> Option<Message> {
        self.rx.as_async().recv().await.ok()
    }

    /// Number of queued messages.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether no message is queued.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Close the bus for every handle.
    ///
    /// Queued messages are discarded, posting fails with
    /// [`Error::BusClosed`] and blocked pops return `None`.
    pub fn close(&self) {
        let _ = self.tx.close();
        tracing::debug!("bus closed");
    }

    /// Whether the bus has been closed.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Bus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bus")
            .field("queued", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}
