//! Seek events, application payloads and stream tags.
//!
//! - [`SeekEvent`]: a request sent to elements to jump to a new position
//! - [`Structure`]: named key/value payload carried by application messages
//! - [`TagList`]: per-stream metadata (codec, language, bitrate)
//!
//! # Example
//!
//! ```rust
//! use playctl::clock::ClockTime;
//! use playctl::event::{SeekEvent, SeekFlags, Structure};
//!
//! let seek = SeekEvent::new(ClockTime::from_secs(20));
//! assert!(seek.flags.contains(SeekFlags::FLUSH));
//! assert!(seek.flags.contains(SeekFlags::KEY_UNIT));
//!
//! let payload = Structure::new("tags-changed").with_field("element", "source");
//! assert_eq!(payload.get_str("element"), Some("source"));
//! ```

mod tags;

pub use tags::{StreamKind, Tag, TagList, TagValue};

use crate::clock::ClockTime;
use crate::element::Value;
use std::collections::BTreeMap;

// ============================================================================
// Seek Event
// ============================================================================

/// Seek event - request to jump to a position.
#[derive(Debug, Clone, PartialEq)]
pub struct SeekEvent {
    /// Playback rate after the seek (1.0 = normal).
    pub rate: f64,
    /// Seek flags.
    pub flags: SeekFlags,
    /// Target position.
    pub position: ClockTime,
}

impl SeekEvent {
    /// A flushing seek that snaps to the nearest key unit.
    ///
    /// Buffered data is discarded and the position lands on the closest
    /// seekable unit rather than the exact frame.
    pub fn new(position: ClockTime) -> Self {
        Self {
            rate: 1.0,
            flags: SeekFlags::FLUSH.union(SeekFlags::KEY_UNIT),
            position,
        }
    }

    /// Set seek flags.
    pub fn with_flags(mut self, flags: SeekFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// Flags for seek events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SeekFlags(u32);

impl SeekFlags {
    /// No special flags.
    pub const NONE: Self = Self(0);
    /// Flush pipeline before seek.
    pub const FLUSH: Self = Self(1 << 0);
    /// Seek to exact position (may be slower).
    pub const ACCURATE: Self = Self(1 << 1);
    /// Seek to nearest keyframe.
    pub const KEY_UNIT: Self = Self(1 << 2);

    /// Check if empty.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Check if contains a flag.
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Union of flags.
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

// ============================================================================
// Structure
// ============================================================================

/// Named key/value payload.
///
/// Used by application messages, which the controller posts to itself to
/// move signal-handler work onto its loop.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    name: String,
    fields: BTreeMap<String, Value>,
}

impl Structure {
    /// Create an empty structure.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add a field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a field.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// The structure name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the structure has the given name.
    pub fn has_name(&self, name: &str) -> bool {
        self.name == name
    }

    /// Get a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Get a string field.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Get an unsigned field.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(Value::as_u64)
    }

    /// Iterate over fields in key order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seek_event_defaults() {
        let seek = SeekEvent::new(ClockTime::from_secs(20));
        assert_eq!(seek.position, ClockTime::from_secs(20));
        assert_eq!(seek.rate, 1.0);
        assert!(seek.flags.contains(SeekFlags::FLUSH.union(SeekFlags::KEY_UNIT)));
        assert!(!seek.flags.contains(SeekFlags::ACCURATE));
    }

    #[test]
    fn test_seek_flags() {
        let flags = SeekFlags::NONE;
        assert!(flags.is_empty());
        let seek = SeekEvent::new(ClockTime::ZERO).with_flags(SeekFlags::ACCURATE);
        assert!(seek.flags.contains(SeekFlags::ACCURATE));
        assert!(!seek.flags.contains(SeekFlags::FLUSH));
    }

    #[test]
    fn test_structure_fields() {
        let s = Structure::new("pad-added")
            .with_field("element", "source")
            .with_field("index", 2u64);
        assert!(s.has_name("pad-added"));
        assert_eq!(s.get_str("element"), Some("source"));
        assert_eq!(s.get_u64("index"), Some(2));
        assert_eq!(s.get_str("missing"), None);
        let keys: Vec<_> = s.fields().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["element", "index"]);
    }
}
