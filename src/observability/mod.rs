//! Observability: tracing spans, structured log helpers and diagnostics.
//!
//! playctl emits everything through `tracing`; installing a subscriber is
//! the application's job.
//!
//! ## Spans
//!
//! | Span | Level | Fields |
//! |------|-------|--------|
//! | `controller` | INFO | `name` |
//! | `message` | DEBUG | `seqnum`, `source`, `kind` |
//!
//! ## Diagnostics
//!
//! User-facing conditions (element errors, end of stream, fatal state
//! change failures) are reported through a [`DiagnosticSink`]. The default
//! [`TracingSink`] logs them; tests plug in a [`CollectingSink`].
//!
//! ## Example
//!
//! ```rust
//! use playctl::observability::instrument_controller;
//!
//! let _guard = instrument_controller("player");
//! // Control loop turns are traced under this span
//! ```

mod diagnostics;
mod tracing_support;

pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, TracingSink};
pub use tracing_support::{
    instrument_controller, span_controller, span_message, trace_eos, trace_link,
    trace_link_attempt, trace_position, trace_seek, trace_seek_capability, trace_state_change,
    trace_state_step,
};
