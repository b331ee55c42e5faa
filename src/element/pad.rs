//! Pad abstraction for element inputs and outputs.
//!
//! Pads are the typed connection points of elements. A pad's media type is
//! unknown until the owning element negotiates it, which for dynamic pads
//! only happens once the element has inspected its input.

use std::fmt;

/// Direction of a pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PadDirection {
    /// An output pad (produces data for downstream).
    Src,
    /// An input pad (receives data from upstream).
    Sink,
}

/// Whether a pad is always present or created dynamically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PadPresence {
    /// Pad exists from construction.
    #[default]
    Always,
    /// Pad appears at runtime (e.g., once a demuxer has seen the container).
    Sometimes,
}

/// Negotiated media type of a pad, e.g. `audio/x-raw, rate=48000`.
///
/// Only the media type name (the part before the first `,`) takes part in
/// compatibility checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Caps(String);

impl Caps {
    /// Create caps from a descriptor string.
    pub fn new(descriptor: impl Into<String>) -> Self {
        Self(descriptor.into())
    }

    /// The media type name, without fields.
    pub fn media_type(&self) -> &str {
        self.0.split(',').next().unwrap_or_default().trim()
    }

    /// Whether the media type starts with `prefix`.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.media_type().starts_with(prefix)
    }

    /// The full descriptor.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Caps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Caps {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identifies a pad by owning element and pad name.
///
/// This is a non-owning reference: the pipeline owns the pad, the reference
/// only names it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PadRef {
    /// Owning element name.
    pub element: String,
    /// Pad name.
    pub pad: String,
}

impl PadRef {
    /// Create a pad reference.
    pub fn new(element: impl Into<String>, pad: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            pad: pad.into(),
        }
    }
}

impl fmt::Display for PadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.element, self.pad)
    }
}

/// A pad instance on an element.
#[derive(Debug, Clone)]
pub struct Pad {
    name: String,
    direction: PadDirection,
    presence: PadPresence,
    /// Negotiated caps, if known.
    caps: Option<Caps>,
    /// Media type prefixes a sink pad accepts (empty accepts anything).
    accepts: Vec<String>,
    /// The linked peer, if any.
    peer: Option<PadRef>,
}

impl Pad {
    /// Create a new pad.
    pub fn new(name: impl Into<String>, direction: PadDirection) -> Self {
        Self {
            name: name.into(),
            direction,
            presence: PadPresence::Always,
            caps: None,
            accepts: Vec::new(),
            peer: None,
        }
    }

    /// Create a standard sink pad named "sink".
    pub fn sink() -> Self {
        Self::new("sink", PadDirection::Sink)
    }

    /// Create a standard source pad named "src".
    pub fn src() -> Self {
        Self::new("src", PadDirection::Src)
    }

    /// Create a dynamic source pad with already negotiated caps.
    pub fn sometimes(name: impl Into<String>, caps: impl Into<Caps>) -> Self {
        Self {
            presence: PadPresence::Sometimes,
            caps: Some(caps.into()),
            ..Self::new(name, PadDirection::Src)
        }
    }

    /// Restrict the media types this pad accepts.
    pub fn accepting<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepts = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the caps.
    pub fn with_caps(mut self, caps: impl Into<Caps>) -> Self {
        self.caps = Some(caps.into());
        self
    }

    /// Get the pad's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the pad's direction.
    pub fn direction(&self) -> PadDirection {
        self.direction
    }

    /// Get the pad's presence.
    pub fn presence(&self) -> PadPresence {
        self.presence
    }

    /// Check if this is a sink pad.
    pub fn is_sink(&self) -> bool {
        self.direction == PadDirection::Sink
    }

    /// Check if this is a source pad.
    pub fn is_src(&self) -> bool {
        self.direction == PadDirection::Src
    }

    /// Negotiated caps, if known.
    pub fn caps(&self) -> Option<&Caps> {
        self.caps.as_ref()
    }

    /// The linked peer, if any.
    pub fn peer(&self) -> Option<&PadRef> {
        self.peer.as_ref()
    }

    /// Whether the pad is linked.
    pub fn is_linked(&self) -> bool {
        self.peer.is_some()
    }

    /// Whether this pad accepts data of the given caps.
    ///
    /// Unknown caps are accepted; the check is repeated once caps are known.
    pub fn accepts(&self, caps: Option<&Caps>) -> bool {
        match caps {
            Some(caps) if !self.accepts.is_empty() => {
                self.accepts.iter().any(|prefix| caps.has_prefix(prefix))
            }
            _ => true,
        }
    }

    pub(crate) fn set_caps(&mut self, caps: Option<Caps>) {
        self.caps = caps;
    }

    pub(crate) fn set_peer(&mut self, peer: Option<PadRef>) {
        self.peer = peer;
    }
}
