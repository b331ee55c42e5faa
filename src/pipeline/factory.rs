//! Element factory: creates elements by kind name.

use crate::element::Element;
use crate::elements::{
    AudioConvert, AudioResample, FakeSink, UriDecodeBin, VertigoTv, VideoConvert, VideoTestSrc,
};
use crate::error::{Error, Result};
use crate::framework::Framework;
use std::collections::HashMap;
use std::sync::Arc;

/// Constructor registered for a kind. Receives the instance name.
pub type ElementConstructor = Arc<dyn Fn(&str) -> Result<Box<dyn Element>> + Send + Sync>;

/// Registry of element constructors.
#[derive(Clone, Default)]
pub struct ElementFactory {
    constructors: HashMap<String, ElementConstructor>,
}

impl ElementFactory {
    /// Create an empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a factory with the built-in simulated elements registered.
    pub fn with_builtins() -> Self {
        let mut factory = Self::new();

        factory.register("uridecodebin", |_| Ok(Box::new(UriDecodeBin::new())));
        factory.register("videotestsrc", |_| Ok(Box::new(VideoTestSrc::new())));
        factory.register("vertigotv", |_| Ok(Box::new(VertigoTv::new())));
        factory.register("audioconvert", |_| Ok(Box::new(AudioConvert::new())));
        factory.register("audioresample", |_| Ok(Box::new(AudioResample::new())));
        factory.register("videoconvert", |_| Ok(Box::new(VideoConvert::new())));
        factory.register("autoaudiosink", |_| Ok(Box::new(FakeSink::audio())));
        factory.register("autovideosink", |_| Ok(Box::new(FakeSink::video())));
        factory.register("fakesink", |_| Ok(Box::new(FakeSink::new())));

        factory
    }

    /// Register a custom element constructor, replacing any previous one.
    pub fn register<F>(&mut self, kind: &str, constructor: F)
    where
        F: Fn(&str) -> Result<Box<dyn Element>> + Send + Sync + 'static,
    {
        self.constructors.insert(kind.to_string(), Arc::new(constructor));
    }

    /// Create an element of `kind` named `name`.
    ///
    /// Requires an initialized framework. Unknown kinds fail with
    /// [`Error::ElementCreation`].
    pub fn make(&self, kind: &str, name: &str) -> Result<Box<dyn Element>> {
        Framework::ensure_initialized()?;
        let constructor = self.constructors.get(kind).ok_or_else(|| {
            tracing::error!(kind = %kind, name = %name, "no constructor registered");
            Error::ElementCreation {
                kind: kind.to_string(),
            }
        })?;
        tracing::trace!(kind = %kind, name = %name, "creating element");
        constructor(name)
    }

    /// Check if an element kind is registered.
    pub fn is_registered(&self, kind: &str) -> bool {
        self.constructors.contains_key(kind)
    }

    /// List all available kinds, sorted.
    pub fn list_elements(&self) -> Vec<String> {
        let mut names: Vec<String> = self.constructors.keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for ElementFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementFactory")
            .field("kinds", &self.list_elements())
            .finish()
    }
}
