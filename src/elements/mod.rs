//! Built-in simulated elements.
//!
//! These model the control-plane behaviour of a decoding playback graph
//! without touching media data:
//!
//! ## Sources
//! - [`UriDecodeBin`]: opens a URI, exposes decoded streams as dynamic pads
//! - [`VideoTestSrc`]: raw video test patterns, no discovery
//!
//! ## Filters
//! - [`AudioConvert`], [`AudioResample`]: raw audio in and out
//! - [`VideoConvert`]: raw video in and out
//! - [`VertigoTv`]: video effect, raw video in and out
//!
//! ## Sinks
//! - [`FakeSink`]: discards everything; audio and video variants stand in
//!   for device sinks

mod convert;
mod fakesink;
mod media;
mod testsrc;
mod uridecodebin;

pub use convert::{AudioConvert, AudioResample, VideoConvert};
pub use fakesink::FakeSink;
pub use media::{MediaInfo, StreamInfo};
pub use testsrc::{TestPattern, VertigoTv, VideoTestSrc};
pub use uridecodebin::UriDecodeBin;

use crate::error::Result;
use crate::pipeline::{ElementFactory, Pipeline};

/// Media played when no URI is given.
pub const DEFAULT_URI: &str =
    "https://gstreamer.freedesktop.org/data/media/sintel_trailer-480p.webm";

/// Build the standard decode graph for `uri`.
///
/// ```text
/// source (uridecodebin) ~> convert -> resample -> sink
///                       ~> vcon -> vsink
/// ```
///
/// `~>` marks links made at runtime once the source has discovered its
/// streams. Every creation or static link failure is returned as an error.
pub fn playback_pipeline(factory: &ElementFactory, uri: &str) -> Result<Pipeline> {
    let mut pipeline = Pipeline::new("playback");
    pipeline.make(factory, "uridecodebin", "source")?;
    pipeline.make(factory, "audioconvert", "convert")?;
    pipeline.make(factory, "audioresample", "resample")?;
    pipeline.make(factory, "autoaudiosink", "sink")?;
    pipeline.make(factory, "videoconvert", "vcon")?;
    pipeline.make(factory, "autovideosink", "vsink")?;

    pipeline.link_many(&["convert", "resample", "sink"])?;
    pipeline.link("vcon", "vsink")?;
    pipeline.set_property("source", "uri", uri)?;
    Ok(pipeline)
}

/// Build the static test-pattern graph.
///
/// ```text
/// source (videotestsrc) -> vertigo -> videocon -> sink
/// ```
///
/// Every pad is known up front, so the graph is fully linked before it
/// leaves `Null`. An unknown `pattern` fails the property set.
pub fn test_pattern_pipeline(factory: &ElementFactory, pattern: &str) -> Result<Pipeline> {
    let mut pipeline = Pipeline::new("test-pattern");
    pipeline.make(factory, "videotestsrc", "source")?;
    pipeline.make(factory, "vertigotv", "vertigo")?;
    pipeline.make(factory, "videoconvert", "videocon")?;
    pipeline.make(factory, "autovideosink", "sink")?;

    pipeline.set_property("source", "pattern", pattern)?;
    pipeline.link_many(&["source", "vertigo", "videocon", "sink"])?;
    Ok(pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{PadRef, Value};
    use crate::framework;

    #[test]
    fn test_playback_pipeline_shape() {
        let _fw = framework::init();
        let factory = ElementFactory::with_builtins();
        let pipeline = playback_pipeline(&factory, DEFAULT_URI).unwrap();

        assert_eq!(pipeline.node_count(), 6);
        assert_eq!(pipeline.edge_count(), 3);
        assert!(pipeline.is_linked(&PadRef::new("resample", "src")));
        assert!(!pipeline.is_linked(&PadRef::new("convert", "sink")));
        assert_eq!(
            pipeline.property("source", "uri").and_then(|v| v.as_str().map(String::from)),
            Some(DEFAULT_URI.to_string())
        );
    }

    #[test]
    fn test_pattern_pipeline_shape() {
        let _fw = framework::init();
        let factory = ElementFactory::with_builtins();
        let pipeline = test_pattern_pipeline(&factory, "ball").unwrap();

        assert_eq!(pipeline.node_count(), 4);
        assert_eq!(pipeline.edge_count(), 3);
        assert!(pipeline.is_linked(&PadRef::new("videocon", "sink")));
        assert_eq!(pipeline.property("source", "pattern"), Some(Value::from("ball")));
    }

    #[test]
    fn test_missing_kind_is_fatal() {
        let _fw = framework::init();
        let mut factory = ElementFactory::new();
        factory.register("uridecodebin", |_| Ok(Box::new(UriDecodeBin::new())));
        factory.register("audioconvert", |_| Ok(Box::new(AudioConvert::new())));

        let err = playback_pipeline(&factory, DEFAULT_URI).unwrap_err();
        assert_eq!(err.to_string(), "cannot create element of kind audioresample");
    }
}
