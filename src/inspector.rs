//! Per-stream tag aggregation for presentation.
//!
//! [`StreamInspector::refresh`] asks the stream-owning element how many
//! video, audio and subtitle streams it has and collects each stream's tags.
//! The table is rebuilt from scratch on every refresh.

use crate::event::{StreamKind, Tag, TagList};
use crate::pipeline::Pipeline;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Where stream counts and tags come from.
pub trait StreamSource {
    /// Number of streams of a kind.
    fn stream_count(&self, kind: StreamKind) -> usize;

    /// Tags of one stream, if the stream has any.
    fn stream_tags(&self, kind: StreamKind, index: usize) -> Option<TagList>;
}

/// The streams of one element inside a pipeline.
///
/// Counts are read from the element's `n-video`, `n-audio` and `n-text`
/// properties; a missing property counts as zero streams.
#[derive(Debug, Clone, Copy)]
pub struct ElementStreams<'a> {
    pipeline: &'a Pipeline,
    element: &'a str,
}

impl<'a> ElementStreams<'a> {
    /// Streams of `element` in `pipeline`.
    pub fn new(pipeline: &'a Pipeline, element: &'a str) -> Self {
        Self { pipeline, element }
    }
}

impl StreamSource for ElementStreams<'_> {
    fn stream_count(&self, kind: StreamKind) -> usize {
        self.pipeline
            .property(self.element, kind.count_property())
            .and_then(|v| v.as_u64())
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0)
    }

    fn stream_tags(&self, kind: StreamKind, index: usize) -> Option<TagList> {
        self.pipeline.stream_tags(self.element, kind, index)
    }
}

/// Tags keyed by stream kind and index, iterated video, audio, subtitle.
pub type StreamTable = BTreeMap<(StreamKind, usize), TagList>;

/// Builds and renders the stream tag table.
#[derive(Debug, Clone, Default)]
pub struct StreamInspector {
    table: StreamTable,
    text: String,
}

impl StreamInspector {
    /// Create an empty inspector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the table from `source` and return the rendered text.
    pub fn refresh(&mut self, source: &impl StreamSource) -> &str {
        let mut table = StreamTable::new();
        for kind in StreamKind::ALL {
            for index in 0..source.stream_count(kind) {
                if let Some(tags) = source.stream_tags(kind, index) {
                    table.insert((kind, index), tags);
                }
            }
        }
        tracing::debug!(streams = table.len(), "stream table rebuilt");

        self.text = render(&table);
        self.table = table;
        &self.text
    }

    /// Drop all stream information.
    pub fn clear(&mut self) {
        self.table.clear();
        self.text.clear();
    }

    /// The current table.
    pub fn table(&self) -> &StreamTable {
        &self.table
    }

    /// The current rendering.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Render a table. Missing tags are left out rather than shown as errors.
pub fn render(table: &StreamTable) -> String {
    let mut out = String::new();
    for ((kind, index), tags) in table {
        // Sections after the first video block are separated by a blank line.
        if *kind != StreamKind::Video {
            out.push('\n');
        }
        let _ = writeln!(out, "{kind} stream {index}:");
        for (label, tag) in shown(*kind) {
            if let Some(value) = tags.get(*tag) {
                let _ = writeln!(out, "  {label}: {value}");
            }
        }
    }
    out
}

/// Tags listed under each kind, with their labels.
fn shown(kind: StreamKind) -> &'static [(&'static str, Tag)] {
    match kind {
        StreamKind::Video => &[("codec", Tag::VideoCodec)],
        StreamKind::Audio => &[
            ("codec", Tag::AudioCodec),
            ("language", Tag::Language),
            ("bitrate", Tag::Bitrate),
        ],
        StreamKind::Subtitle => &[("language", Tag::Language)],
    }
}
