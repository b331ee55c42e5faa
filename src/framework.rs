//! Process-wide framework lifecycle.
//!
//! Element construction requires a live [`Framework`] token. The token is a
//! scoped acquisition: [`init`] takes a reference on the process-wide state
//! and dropping the last token (or calling [`Framework::shutdown`]) releases
//! it. A controller holds its token for its whole lifetime and releases it
//! only after the pipeline has been torn down.

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicUsize, Ordering};

static REFCOUNT: AtomicUsize = AtomicUsize::new(0);

/// Token proving the framework is initialized.
#[derive(Debug)]
pub struct Framework {
    _private: (),
}

/// Initialize the framework and return a token.
///
/// May be called any number of times; the framework stays initialized until
/// every token has been dropped.
pub fn init() -> Framework {
    Framework::acquire()
}

impl Framework {
    fn acquire() -> Self {
        if REFCOUNT.fetch_add(1, Ordering::AcqRel) == 0 {
            tracing::debug!("framework initialized");
        }
        Self { _private: () }
    }

    /// Whether at least one token is alive.
    pub fn is_initialized() -> bool {
        REFCOUNT.load(Ordering::Acquire) > 0
    }

    /// Fail with [`Error::NotInitialized`] if no token is alive.
    pub fn ensure_initialized() -> Result<()> {
        if Self::is_initialized() {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    /// Release this token explicitly.
    pub fn shutdown(self) {
        drop(self);
    }
}

impl Clone for Framework {
    fn clone(&self) -> Self {
        Self::acquire()
    }
}

impl Drop for Framework {
    fn drop(&mut self) {
        if REFCOUNT.fetch_sub(1, Ordering::AcqRel) == 1 {
            tracing::debug!("framework shut down");
        }
    }
}
