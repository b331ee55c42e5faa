//! Messages posted on the pipeline bus.
//!
//! Messages are immutable values. Elements post them from their own threads,
//! the controller posts [`MessageView::Application`] messages to marshal
//! signal-handler work onto its loop, and the controller's drain loop
//! consumes each message exactly once.

use super::state::State;
use crate::event::Structure;
use std::fmt;

/// Who posted a message.
///
/// Identifies the origin by name without owning it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageSource {
    /// The top-level pipeline itself.
    Pipeline(String),
    /// A child element of the pipeline.
    Element(String),
}

impl MessageSource {
    /// Name of the origin.
    pub fn name(&self) -> &str {
        match self {
            MessageSource::Pipeline(name) | MessageSource::Element(name) => name,
        }
    }

    /// Whether the message comes from the top-level pipeline.
    pub fn is_pipeline(&self) -> bool {
        matches!(self, MessageSource::Pipeline(_))
    }
}

impl fmt::Display for MessageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Message payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageView {
    /// A runtime error inside an element.
    Error {
        /// Human readable error text.
        message: String,
        /// Optional debugging details.
        debug: Option<String>,
    },

    /// End of stream: all data has been played.
    Eos,

    /// A state transition completed.
    StateChanged {
        /// State before the transition.
        old: State,
        /// State after the transition.
        new: State,
        /// Final target if more transitions follow.
        pending: Option<State>,
    },

    /// The media duration changed; cached durations are stale.
    DurationChanged,

    /// An element finished a transition it had reported as pending.
    AsyncDone {
        /// Identifies the transition being completed. Completions of an
        /// abandoned transition carry an older cookie and are ignored.
        cookie: u64,
    },

    /// Application-defined payload.
    Application(Structure),
}

/// Message kinds, used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// [`MessageView::Error`].
    Error,
    /// [`MessageView::Eos`].
    Eos,
    /// [`MessageView::StateChanged`].
    StateChanged,
    /// [`MessageView::DurationChanged`].
    DurationChanged,
    /// [`MessageView::AsyncDone`].
    AsyncDone,
    /// [`MessageView::Application`].
    Application,
}

impl MessageType {
    const fn bit(self) -> u32 {
        match self {
            MessageType::Error => 1 << 0,
            MessageType::Eos => 1 << 1,
            MessageType::StateChanged => 1 << 2,
            MessageType::DurationChanged => 1 << 3,
            MessageType::AsyncDone => 1 << 4,
            MessageType::Application => 1 << 5,
        }
    }
}

/// A set of admissible message kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MessageMask(u32);

impl MessageMask {
    /// Matches nothing.
    pub const NONE: Self = Self(0);
    /// Error messages.
    pub const ERROR: Self = Self(MessageType::Error.bit());
    /// End-of-stream messages.
    pub const EOS: Self = Self(MessageType::Eos.bit());
    /// State-changed messages.
    pub const STATE_CHANGED: Self = Self(MessageType::StateChanged.bit());
    /// Duration-changed messages.
    pub const DURATION_CHANGED: Self = Self(MessageType::DurationChanged.bit());
    /// Async-done messages.
    pub const ASYNC_DONE: Self = Self(MessageType::AsyncDone.bit());
    /// Application messages.
    pub const APPLICATION: Self = Self(MessageType::Application.bit());
    /// Every kind.
    pub const ALL: Self = Self(0b11_1111);

    /// Check if the mask admits a kind.
    pub const fn matches(self, ty: MessageType) -> bool {
        self.0 & ty.bit() != 0
    }

    /// Check if contains all kinds of another mask.
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Union of masks.
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl std::ops::BitOr for MessageMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// An immutable bus message.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    seqnum: u64,
    source: MessageSource,
    view: MessageView,
}

impl Message {
    /// Create a message. Its sequence number is assigned when posted.
    pub fn new(source: MessageSource, view: MessageView) -> Self {
        Self {
            seqnum: 0,
            source,
            view,
        }
    }

    pub(super) fn stamped(mut self, seqnum: u64) -> Self {
        self.seqnum = seqnum;
        self
    }

    /// Create an error message.
    pub fn error(source: MessageSource, message: impl Into<String>, debug: Option<String>) -> Self {
        Self::new(
            source,
            MessageView::Error {
                message: message.into(),
                debug,
            },
        )
    }

    /// Create an end-of-stream message.
    pub fn eos(source: MessageSource) -> Self {
        Self::new(source, MessageView::Eos)
    }

    /// Create a state-changed message.
    pub fn state_changed(
        source: MessageSource,
        old: State,
        new: State,
        pending: Option<State>,
    ) -> Self {
        Self::new(source, MessageView::StateChanged { old, new, pending })
    }

    /// Create an async-done message for the transition `cookie`.
    pub fn async_done(source: MessageSource, cookie: u64) -> Self {
        Self::new(source, MessageView::AsyncDone { cookie })
    }

    /// Create an application message.
    pub fn application(source: MessageSource, structure: Structure) -> Self {
        Self::new(source, MessageView::Application(structure))
    }

    /// Position in the bus order, starting at 1. Zero until posted.
    pub fn seqnum(&self) -> u64 {
        self.seqnum
    }

    /// Who posted the message.
    pub fn source(&self) -> &MessageSource {
        &self.source
    }

    /// The payload.
    pub fn view(&self) -> &MessageView {
        &self.view
    }

    /// The kind of message.
    pub fn message_type(&self) -> MessageType {
        match self.view {
            MessageView::Error { .. } => MessageType::Error,
            MessageView::Eos => MessageType::Eos,
            MessageView::StateChanged { .. } => MessageType::StateChanged,
            MessageView::DurationChanged => MessageType::DurationChanged,
            MessageView::AsyncDone { .. } => MessageType::AsyncDone,
            MessageView::Application(_) => MessageType::Application,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.view {
            MessageView::Error { message, .. } => write!(f, "Error in {}: {}", self.source, message),
            MessageView::Eos => write!(f, "EOS from {}", self.source),
            MessageView::StateChanged { old, new, .. } => {
                write!(f, "{}: state changed {:?} -> {:?}", self.source, old, new)
            }
            MessageView::DurationChanged => write!(f, "{}: duration changed", self.source),
            MessageView::AsyncDone { cookie } => {
                write!(f, "{}: async done (transition {})", self.source, cookie)
            }
            MessageView::Application(s) => write!(f, "{}: application '{}'", self.source, s.name()),
        }
    }
}
