//! Raw media converters.
//!
//! These take part in linking and state changes only; no samples flow
//! through the simulated graph.

use crate::element::{Element, Pad};

fn filter_pads(media_type: &str) -> Vec<Pad> {
    vec![Pad::sink().accepting([media_type]), Pad::src()]
}

/// Converts between raw audio formats.
#[derive(Debug, Clone, Copy, Default)]
pub struct AudioConvert;

impl AudioConvert {
    /// Create a converter.
    pub fn new() -> Self {
        Self
    }
}

impl Element for AudioConvert {
    fn pads(&self) -> Vec<Pad> {
        filter_pads("audio/x-raw")
    }
}

/// Resamples raw audio.
#[derive(Debug, Clone, Copy, Default)]
pub struct AudioResample;

impl AudioResample {
    /// Create a resampler.
    pub fn new() -> Self {
        Self
    }
}

impl Element for AudioResample {
    fn pads(&self) -> Vec<Pad> {
        filter_pads("audio/x-raw")
    }
}

/// Converts between raw video formats.
#[derive(Debug, Clone, Copy, Default)]
pub struct VideoConvert;

impl VideoConvert {
    /// Create a converter.
    pub fn new() -> Self {
        Self
    }
}

impl Element for VideoConvert {
    fn pads(&self) -> Vec<Pad> {
        filter_pads("video/x-raw")
    }
}
