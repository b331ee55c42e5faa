//! User-facing diagnostics.

use crate::pipeline::State;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// A condition the user should hear about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// An element posted a runtime error.
    ElementError {
        /// Posting element.
        source: String,
        /// Error text, verbatim.
        message: String,
        /// Optional debugging details.
        debug: Option<String>,
    },
    /// The media played to its end.
    EndOfStream,
    /// The pipeline refused a requested state.
    StateChangeFailed {
        /// The requested state.
        target: State,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ElementError {
                source,
                message,
                debug,
            } => {
                write!(f, "Error received from element {source}: {message}")?;
                write!(f, "\nDebugging information: {}", debug.as_deref().unwrap_or("none"))
            }
            Diagnostic::EndOfStream => f.write_str("End-Of-Stream reached."),
            Diagnostic::StateChangeFailed { target } => {
                write!(f, "Unable to set the pipeline to the {target} state.")
            }
        }
    }
}

/// Receives diagnostics from a controller.
pub trait DiagnosticSink: Send {
    /// Report one diagnostic.
    fn report(&self, diagnostic: &Diagnostic);
}

/// Logs diagnostics through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        match diagnostic {
            Diagnostic::ElementError {
                source,
                message,
                debug,
            } => {
                tracing::error!(element = %source, "Error received from element {source}: {message}");
                let details = debug.as_deref().unwrap_or("none");
                tracing::error!("Debugging information: {}", details);
            }
            Diagnostic::EndOfStream => tracing::info!("{diagnostic}"),
            Diagnostic::StateChangeFailed { .. } => tracing::error!("{diagnostic}"),
        }
    }
}

/// Keeps every diagnostic in memory. Clones share the same store.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    entries: Arc<Mutex<Vec<Diagnostic>>>,
}

impl CollectingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all diagnostics reported so far.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Error texts of all element errors, verbatim.
    pub fn error_messages(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|d| match d {
                Diagnostic::ElementError { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic.clone());
    }
}
