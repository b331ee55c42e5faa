//! Error types for playctl.

use crate::element::PropertyError;
use crate::pipeline::State;
use thiserror::Error;

/// Result type alias using playctl's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for pipeline setup and control.
///
/// Only setup and control failures live here. Recoverable query failures are
/// reported as `None` by the query engine, and runtime element failures
/// arrive on the bus as [`crate::pipeline::MessageView::Error`].
#[derive(Error, Debug)]
pub enum Error {
    /// The element factory has no constructor for this kind.
    #[error("cannot create element of kind {kind}")]
    ElementCreation {
        /// The requested element kind.
        kind: String,
    },

    /// `playctl::init()` has not been called (or the guard was dropped).
    #[error("framework is not initialized")]
    NotInitialized,

    /// An element with this name is already part of the pipeline.
    #[error("element '{0}' already exists in the pipeline")]
    DuplicateElement(String),

    /// No element with this name is part of the pipeline.
    #[error("element '{0}' not found")]
    ElementNotFound(String),

    /// The element has no pad with this name.
    #[error("element '{element}' has no pad '{pad}'")]
    PadNotFound {
        /// Element name.
        element: String,
        /// Pad name.
        pad: String,
    },

    /// Two pads could not be linked.
    #[error("cannot link {src} -> {sink}: {reason}")]
    Link {
        /// Source pad, as `element:pad`.
        src: String,
        /// Sink pad, as `element:pad`.
        sink: String,
        /// Why the link was refused.
        reason: String,
    },

    /// The pipeline refused a state change.
    #[error("unable to set the pipeline to the {target} state")]
    StateChange {
        /// The requested target state.
        target: State,
    },

    /// A property could not be set or read.
    #[error("property '{name}' on '{element}': {source}")]
    Property {
        /// Element name.
        element: String,
        /// Property name.
        name: String,
        /// Why the access failed.
        #[source]
        source: PropertyError,
    },

    /// Generic pipeline error.
    #[error("pipeline error: {0}")]
    Pipeline(String),

    /// The bus was closed while posting.
    #[error("bus closed")]
    BusClosed,
}
