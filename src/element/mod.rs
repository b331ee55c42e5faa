//! Elements as seen by the control core.
//!
//! - [`Element`]: the opaque processing unit trait
//! - [`Pad`] / [`Caps`]: typed connection points and their media types
//! - [`Value`]: untyped property values
//! - [`ElementContext`]: an element's handle to the bus and signals
//!
//! # Design
//!
//! Elements own their processing and may run their own threads. The core
//! only talks to them through the trait, on the controller thread; elements
//! talk back only through their context, from any thread. The pipeline owns
//! the pads so that link state stays on the controller side.

mod context;
mod pad;
mod property;
mod traits;

pub use context::{AsyncCompletion, ElementContext, Signal, SignalHandler, SignalHub};
pub use pad::{Caps, Pad, PadDirection, PadPresence, PadRef};
pub use property::{PropertyError, Value};
pub use traits::Element;
