//! Description of simulated media.

use crate::clock::ClockTime;
use crate::element::Caps;
use crate::event::{StreamKind, Tag, TagList};

/// One elementary stream inside a container.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    /// Video, audio or subtitle.
    pub kind: StreamKind,
    /// Caps of the decoded output pad.
    pub caps: Caps,
    /// Stream tags; empty for streams without tags.
    pub tags: TagList,
}

impl StreamInfo {
    /// Create a stream description.
    pub fn new(kind: StreamKind, caps: impl Into<Caps>, tags: TagList) -> Self {
        Self {
            kind,
            caps: caps.into(),
            tags,
        }
    }
}

/// What a simulated source "finds" when it inspects a URI.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    /// Total duration.
    pub duration: ClockTime,
    /// Whether the media can be seeked.
    pub seekable: bool,
    /// Distance between seekable key units.
    pub key_interval: ClockTime,
    /// Streams in container order.
    pub streams: Vec<StreamInfo>,
}

impl MediaInfo {
    /// Seekable media without streams.
    pub fn new(duration: ClockTime) -> Self {
        Self {
            duration,
            seekable: true,
            key_interval: ClockTime::from_secs(1),
            streams: Vec::new(),
        }
    }

    /// Add a stream.
    pub fn with_stream(mut self, kind: StreamKind, caps: impl Into<Caps>, tags: TagList) -> Self {
        self.streams.push(StreamInfo::new(kind, caps, tags));
        self
    }

    /// Set the key unit interval.
    pub fn with_key_interval(mut self, interval: ClockTime) -> Self {
        self.key_interval = interval;
        self
    }

    /// A 52 second WebM trailer with one VP9 video and one Vorbis audio stream.
    pub fn sintel_trailer() -> Self {
        let video = TagList::new()
            .with(Tag::VideoCodec, "VP9")
            .with(Tag::Container, "Matroska");
        let audio = TagList::new()
            .with(Tag::AudioCodec, "Vorbis")
            .with(Tag::Language, "en")
            .with(Tag::Bitrate, 80_000u64);

        Self::new(ClockTime::from_millis(52_209))
            .with_key_interval(ClockTime::from_secs(2))
            .with_stream(
                StreamKind::Video,
                "video/x-raw, format=I420, width=854, height=480",
                video,
            )
            .with_stream(
                StreamKind::Audio,
                "audio/x-raw, format=F32LE, rate=48000, channels=2",
                audio,
            )
    }

    /// Streams of one kind, in container order.
    pub fn streams_of(&self, kind: StreamKind) -> impl Iterator<Item = &StreamInfo> {
        self.streams.iter().filter(move |s| s.kind == kind)
    }

    /// Number of streams of one kind.
    pub fn count(&self, kind: StreamKind) -> usize {
        self.streams_of(kind).count()
    }

    /// Snap `position` to the nearest key unit, clamped to the duration.
    pub fn snap_to_key_unit(&self, position: ClockTime) -> ClockTime {
        let interval = self.key_interval.nanos();
        let snapped = if interval == 0 {
            position.nanos()
        } else {
            ((position.nanos() + interval / 2) / interval) * interval
        };
        ClockTime::from_nanos(snapped.min(self.duration.nanos()))
    }
}

impl Default for MediaInfo {
    fn default() -> Self {
        Self::sintel_trailer()
    }
}
