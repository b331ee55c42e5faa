//! # playctl
//!
//! Control core for media playback pipelines.
//!
//! playctl drives a graph of opaque processing elements through its
//! lifecycle and reacts to what the elements report. It does not decode or
//! render anything itself; it orchestrates elements that do.
//!
//! ## Features
//!
//! - **State machine**: `Null -> Ready -> Paused -> Playing` one step at a
//!   time, with asynchronous completion
//! - **Message bus**: ordered, filterable, thread-safe queue between element
//!   threads and the controller
//! - **Dynamic linking**: pads discovered at runtime are routed to downstream
//!   chains by media type, idempotently
//! - **Queries**: cached duration, position, one-shot seeking capability and
//!   flushing key-unit seeks
//! - **Stream tags**: per-stream codec, language and bitrate tables
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use playctl::prelude::*;
//!
//! let framework = playctl::init();
//! let factory = ElementFactory::with_builtins();
//! let pipeline = playctl::elements::playback_pipeline(&factory, "sim://trailer")?;
//!
//! let mut controller = PlaybackController::new(framework, pipeline, ControllerConfig::default())?;
//! controller.play()?;
//! let outcome = controller.run();
//! println!("{outcome:?}");
//! # Ok::<(), playctl::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod config;
pub mod controller;
pub mod element;
pub mod elements;
pub mod error;
pub mod event;
pub mod framework;
pub mod inspector;
pub mod observability;
pub mod pipeline;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::clock::ClockTime;
    pub use crate::config::{ChainConfig, ControllerConfig};
    pub use crate::controller::{PlaybackController, RunOutcome, ShutdownHandle};
    pub use crate::element::{Element, ElementContext, Pad, PadRef, Value};
    pub use crate::error::{Error, Result};
    pub use crate::event::{SeekEvent, StreamKind, Structure, Tag, TagList};
    pub use crate::framework::Framework;
    pub use crate::pipeline::{
        Bus, ElementFactory, Message, MessageMask, MessageView, Pipeline, State,
        StateChangeResult,
    };
}

pub use error::{Error, Result};
pub use framework::init;
