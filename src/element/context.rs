//! Element runtime context and signals.
//!
//! The context is handed to an element when it joins a pipeline. It is the
//! element's only channel back to the controller: it posts bus messages and
//! emits signals, both of which are safe to use from any thread.

use super::pad::Pad;
use crate::event::StreamKind;
use crate::pipeline::{Bus, Message, MessageSource, MessageView};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Notifications emitted synchronously on the element's thread.
#[derive(Debug, Clone)]
pub enum Signal {
    /// The element exposed a new dynamic pad.
    PadAdded {
        /// Emitting element.
        element: String,
        /// The new pad, with its negotiated caps.
        pad: Pad,
    },
    /// Tags of one stream changed.
    TagsChanged {
        /// Emitting element.
        element: String,
        /// Stream kind.
        kind: StreamKind,
        /// Stream index within its kind.
        index: usize,
    },
}

impl Signal {
    /// Name of the emitting element.
    pub fn element(&self) -> &str {
        match self {
            Signal::PadAdded { element, .. } | Signal::TagsChanged { element, .. } => element,
        }
    }
}

/// Callback invoked for every emitted signal.
pub type SignalHandler = Arc<dyn Fn(&Signal) + Send + Sync>;

/// Signal dispatcher shared by a pipeline and its elements.
///
/// Handlers run on the emitting thread. They should do as little as
/// possible, typically posting an application message to the bus.
#[derive(Clone, Default)]
pub struct SignalHub {
    handlers: Arc<Mutex<Vec<SignalHandler>>>,
}

impl SignalHub {
    /// Create a hub with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler.
    pub fn connect<F>(&self, handler: F)
    where
        F: Fn(&Signal) + Send + Sync + 'static,
    {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(handler));
    }

    /// Remove all handlers.
    pub fn disconnect_all(&self) {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Dispatch a signal to every handler.
    pub fn emit(&self, signal: &Signal) {
        // Handlers run outside the lock so they may connect further handlers.
        let handlers: Vec<SignalHandler> = self
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for handler in handlers {
            handler(signal);
        }
    }
}

impl std::fmt::Debug for SignalHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let handlers = self
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("SignalHub")
            .field("handlers", &handlers)
            .finish()
    }
}

/// Finishes one pending transition from any thread.
///
/// Obtained from [`ElementContext::async_completion`] while the transition
/// is being offered. If the pipeline abandons that transition in the
/// meantime, the completion is recognised as stale and ignored.
#[derive(Clone, Debug)]
pub struct AsyncCompletion {
    ctx: ElementContext,
    cookie: u64,
}

impl AsyncCompletion {
    /// Post `AsyncDone` for the captured transition.
    pub fn complete(&self) {
        self.ctx
            .post(Message::async_done(self.ctx.source(), self.cookie));
    }
}

/// Runtime context for an element.
#[derive(Clone, Debug)]
pub struct ElementContext {
    /// Name of this element instance.
    name: String,
    bus: Bus,
    signals: SignalHub,
    // Identifies the transition the pipeline is currently offering.
    transition: Arc<AtomicU64>,
}

impl ElementContext {
    /// Create a new element context.
    pub fn new(name: impl Into<String>, bus: Bus, signals: SignalHub) -> Self {
        Self {
            name: name.into(),
            bus,
            signals,
            transition: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Share the pipeline's transition counter.
    pub(crate) fn with_transition_counter(mut self, counter: Arc<AtomicU64>) -> Self {
        self.transition = counter;
        self
    }

    /// Get the element's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The pipeline bus.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// This element as a message source.
    pub fn source(&self) -> MessageSource {
        MessageSource::Element(self.name.clone())
    }

    /// Post a message, logging if the bus is already closed.
    pub fn post(&self, message: Message) {
        if let Err(err) = self.bus.post(message) {
            tracing::debug!(element = %self.name, error = %err, "message not posted");
        }
    }

    /// Post a runtime error.
    pub fn post_error(&self, message: impl Into<String>, debug: Option<String>) {
        self.post(Message::error(self.source(), message, debug));
    }

    /// Post end-of-stream.
    pub fn post_eos(&self) {
        self.post(Message::eos(self.source()));
    }

    /// Capture the transition being offered, to complete it later.
    ///
    /// Call from [`Element::change_state`] before answering `Pending`.
    ///
    /// [`Element::change_state`]: super::Element::change_state
    pub fn async_completion(&self) -> AsyncCompletion {
        AsyncCompletion {
            ctx: self.clone(),
            cookie: self.transition.load(Ordering::Acquire),
        }
    }

    /// Report that the media duration changed.
    pub fn post_duration_changed(&self) {
        self.post(Message::new(self.source(), MessageView::DurationChanged));
    }

    /// Announce a new dynamic pad.
    pub fn pad_added(&self, pad: Pad) {
        tracing::debug!(element = %self.name, pad = %pad.name(), caps = ?pad.caps(), "pad added");
        self.signals.emit(&Signal::PadAdded {
            element: self.name.clone(),
            pad,
        });
    }

    /// Announce that a stream's tags changed.
    pub fn tags_changed(&self, kind: StreamKind, index: usize) {
        self.signals.emit(&Signal::TagsChanged {
            element: self.name.clone(),
            kind,
            index,
        });
    }
}
