//! Pipeline construction and control.
//!
//! This module provides the pipeline control core:
//!
//! - [`Pipeline`]: the element graph, its links and its state machine
//! - [`Bus`] / [`Message`]: the message queue between elements and controller
//! - [`State`] / [`StateChangeResult`]: lifecycle states and transition outcomes
//! - [`LinkResolver`]: links dynamically discovered pads to downstream chains
//! - [`QueryEngine`]: position, duration and seeking queries
//! - [`ElementFactory`]: creates elements by kind
//!
//! # Example
//!
//! ```rust
//! use playctl::pipeline::{ElementFactory, Pipeline, State, StateChangeResult};
//!
//! let _framework = playctl::init();
//! let factory = ElementFactory::with_builtins();
//!
//! let mut pipeline = Pipeline::new("test-pipeline");
//! pipeline.make(&factory, "audioconvert", "convert")?;
//! pipeline.make(&factory, "autoaudiosink", "sink")?;
//! pipeline.link("convert", "sink")?;
//!
//! assert_eq!(pipeline.request_state(State::Ready), StateChangeResult::Success);
//! # Ok::<(), playctl::Error>(())
//! ```

mod bus;
pub mod factory;
mod graph;
mod message;
mod query;
mod resolver;
mod state;

pub use bus::Bus;
pub use factory::ElementFactory;
pub use graph::{Link, Node, NodeId, Pipeline};
pub use message::{Message, MessageMask, MessageSource, MessageType, MessageView};
pub use query::{Query, QueryEngine, QueryTarget, ScheduledSeek, SeekCapability};
pub use resolver::{LinkAttempt, LinkResolver, Resolution};
pub use state::{State, StateChange, StateChangeResult, StateMachine};
