//! Per-stream metadata.
//!
//! Elements that expose streams answer [`Element::stream_tags`] with one
//! [`TagList`] per stream. Only the [`Tag`]s the player shows are modelled.
//!
//! ```rust
//! use playctl::event::{Tag, TagList};
//!
//! let tags = TagList::new()
//!     .with(Tag::AudioCodec, "Opus")
//!     .with(Tag::Language, "en")
//!     .with(Tag::Bitrate, 128_000u64);
//!
//! assert_eq!(tags.text(Tag::AudioCodec), Some("Opus"));
//! assert_eq!(tags.number(Tag::Bitrate), Some(128_000));
//! ```
//!
//! [`Element::stream_tags`]: crate::element::Element::stream_tags

use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Stream Kind
// ============================================================================

/// Kind of elementary stream.
///
/// The ordering (video, audio, subtitle) is the presentation order of the
/// stream inspector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StreamKind {
    /// Video stream.
    Video,
    /// Audio stream.
    Audio,
    /// Subtitle (text) stream.
    Subtitle,
}

impl StreamKind {
    /// All kinds in presentation order.
    pub const ALL: [StreamKind; 3] = [StreamKind::Video, StreamKind::Audio, StreamKind::Subtitle];

    /// Property holding the number of streams of this kind.
    pub fn count_property(self) -> &'static str {
        match self {
            StreamKind::Video => "n-video",
            StreamKind::Audio => "n-audio",
            StreamKind::Subtitle => "n-text",
        }
    }

    /// Lower-case label.
    pub fn label(self) -> &'static str {
        match self {
            StreamKind::Video => "video",
            StreamKind::Audio => "audio",
            StreamKind::Subtitle => "subtitle",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Tags
// ============================================================================

/// Well-known stream tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    /// Video codec name, text.
    VideoCodec,
    /// Audio codec name, text.
    AudioCodec,
    /// ISO 639 language code, text.
    Language,
    /// Nominal bitrate in bits per second, number.
    Bitrate,
    /// Container format, text.
    Container,
}

impl Tag {
    /// Wire name of the tag.
    pub const fn key(self) -> &'static str {
        match self {
            Tag::VideoCodec => "video-codec",
            Tag::AudioCodec => "audio-codec",
            Tag::Language => "language-code",
            Tag::Bitrate => "bitrate",
            Tag::Container => "container-format",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Tag payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    /// Free text.
    Text(String),
    /// Unsigned quantity.
    Number(u64),
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Text(s) => f.write_str(s),
            TagValue::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for TagValue {
    fn from(s: &str) -> Self {
        TagValue::Text(s.to_owned())
    }
}

impl From<String> for TagValue {
    fn from(s: String) -> Self {
        TagValue::Text(s)
    }
}

impl From<u64> for TagValue {
    fn from(n: u64) -> Self {
        TagValue::Number(n)
    }
}

// ============================================================================
// Tag List
// ============================================================================

/// Tags of one stream, iterated in [`Tag`] order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagList {
    entries: BTreeMap<Tag, TagValue>,
}

impl TagList {
    /// Empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `tag`, returning the value it replaces.
    pub fn insert(&mut self, tag: Tag, value: impl Into<TagValue>) -> Option<TagValue> {
        self.entries.insert(tag, value.into())
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, tag: Tag, value: impl Into<TagValue>) -> Self {
        self.insert(tag, value);
        self
    }

    /// Raw value of `tag`.
    pub fn get(&self, tag: Tag) -> Option<&TagValue> {
        self.entries.get(&tag)
    }

    /// Text value of `tag`; `None` if absent or numeric.
    pub fn text(&self, tag: Tag) -> Option<&str> {
        match self.get(tag)? {
            TagValue::Text(s) => Some(s),
            TagValue::Number(_) => None,
        }
    }

    /// Numeric value of `tag`; `None` if absent or text.
    pub fn number(&self, tag: Tag) -> Option<u64> {
        match self.get(tag)? {
            TagValue::Number(n) => Some(*n),
            TagValue::Text(_) => None,
        }
    }

    /// Number of tags set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if no tag is set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tags in [`Tag`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Tag, &TagValue)> {
        self.entries.iter().map(|(tag, value)| (*tag, value))
    }
}
