//! The element interface seen by the control core.
//!
//! Elements are opaque processing units. The core never looks at media
//! data; it only drives state transitions, reads and writes properties,
//! forwards queries and seeks, and asks for stream tags. Every method has a
//! default so that simple elements only implement what they take part in.

use super::context::ElementContext;
use super::pad::Pad;
use super::property::{PropertyError, Value};
use crate::event::{SeekEvent, StreamKind, TagList};
use crate::pipeline::{Query, StateChange, StateChangeResult};

/// An element owned by a [`Pipeline`](crate::pipeline::Pipeline).
///
/// Elements may run their own worker threads. Anything they need to tell
/// the controller from those threads goes through the [`ElementContext`]
/// handed to [`Element::attach`]: bus messages and signals.
///
/// # Example
///
/// ```rust
/// use playctl::element::{Element, Pad};
/// use playctl::pipeline::{StateChange, StateChangeResult};
///
/// struct Counter {
///     transitions: usize,
/// }
///
/// impl Element for Counter {
///     fn pads(&self) -> Vec<Pad> {
///         vec![Pad::sink()]
///     }
///
///     fn change_state(&mut self, _transition: StateChange) -> StateChangeResult {
///         self.transitions += 1;
///         StateChangeResult::Success
///     }
/// }
/// ```
pub trait Element: Send {
    /// Called once when the element is added to a pipeline.
    fn attach(&mut self, ctx: ElementContext) {
        let _ = ctx;
    }

    /// Pads that exist from construction.
    fn pads(&self) -> Vec<Pad> {
        Vec::new()
    }

    /// Perform one adjacent state transition.
    ///
    /// Returning [`StateChangeResult::Pending`] promises an `AsyncDone`
    /// message once finished: take an [`ElementContext::async_completion`]
    /// here and complete it from the worker.
    ///
    /// A pending transition may be abandoned. The pipeline then offers the
    /// reverse transition, and any later completion of the old one is
    /// ignored.
    fn change_state(&mut self, transition: StateChange) -> StateChangeResult {
        let _ = transition;
        StateChangeResult::Success
    }

    /// Set a property.
    fn set_property(&mut self, name: &str, value: Value) -> Result<(), PropertyError> {
        let _ = (name, value);
        Err(PropertyError::Unknown)
    }

    /// Read a property.
    fn property(&self, name: &str) -> Option<Value> {
        let _ = name;
        None
    }

    /// Answer a query in place. Returns `false` if unanswered.
    fn query(&self, query: &mut Query) -> bool {
        let _ = query;
        false
    }

    /// Handle a seek. Returns `false` if not handled.
    fn seek(&mut self, event: &SeekEvent) -> bool {
        let _ = event;
        false
    }

    /// Tags of one stream, for elements that expose streams.
    fn stream_tags(&self, kind: StreamKind, index: usize) -> Option<TagList> {
        let _ = (kind, index);
        None
    }
}

impl<E: Element + ?Sized> Element for Box<E> {
    fn attach(&mut self, ctx: ElementContext) {
        (**self).attach(ctx)
    }

    fn pads(&self) -> Vec<Pad> {
        (**self).pads()
    }

    fn change_state(&mut self, transition: StateChange) -> StateChangeResult {
        (**self).change_state(transition)
    }

    fn set_property(&mut self, name: &str, value: Value) -> Result<(), PropertyError> {
        (**self).set_property(name, value)
    }

    fn property(&self, name: &str) -> Option<Value> {
        (**self).property(name)
    }

    fn query(&self, query: &mut Query) -> bool {
        (**self).query(query)
    }

    fn seek(&mut self, event: &SeekEvent) -> bool {
        (**self).seek(event)
    }

    fn stream_tags(&self, kind: StreamKind, index: usize) -> Option<TagList> {
        (**self).stream_tags(kind, index)
    }
}
