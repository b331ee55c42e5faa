//! Controller configuration.
//!
//! [`ControllerConfig`] is a plain struct with a [`Default`] and a couple of
//! presets. Every field is public; adjust what you need:
//!
//! ```rust
//! use playctl::config::ControllerConfig;
//! use std::time::Duration;
//!
//! let config = ControllerConfig {
//!     poll_timeout: Duration::from_millis(20),
//!     ..ControllerConfig::tutorial()
//! };
//! assert!(config.scheduled_seek.is_some());
//! ```

use crate::clock::ClockTime;
use crate::pipeline::{MessageMask, ScheduledSeek, State};
use std::time::Duration;

// ============================================================================
// Downstream chains
// ============================================================================

/// A downstream chain that dynamically discovered pads may feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    /// Chain name used in diagnostics.
    pub name: String,
    /// Media type prefix this chain handles.
    pub caps_prefix: String,
    /// First element of the chain.
    pub element: String,
    /// Sink pad on that element.
    pub pad: String,
}

impl ChainConfig {
    /// Create a chain entry.
    pub fn new(
        name: impl Into<String>,
        caps_prefix: impl Into<String>,
        element: impl Into<String>,
        pad: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            caps_prefix: caps_prefix.into(),
            element: element.into(),
            pad: pad.into(),
        }
    }

    /// Raw audio into the element named `convert`.
    pub fn audio() -> Self {
        Self::new("audio", "audio/x-raw", "convert", "sink")
    }

    /// Raw video into the element named `vcon`.
    pub fn video() -> Self {
        Self::new("video", "video/x-raw", "vcon", "sink")
    }
}

// ============================================================================
// Controller
// ============================================================================

/// Configuration for a [`PlaybackController`](crate::controller::PlaybackController).
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Upper bound for one blocking bus pop.
    pub poll_timeout: Duration,

    /// Message kinds the control loop drains.
    pub message_mask: MessageMask,

    /// Media type prefixes the link resolver accepts.
    pub accepted_caps: Vec<String>,

    /// Downstream chains for dynamic linking.
    pub chains: Vec<ChainConfig>,

    /// Element owning the URI, stream counts and stream tags.
    pub source: String,

    /// One-shot automatic seek, if any.
    pub scheduled_seek: Option<ScheduledSeek>,

    /// State to return to on end-of-stream. Errors always go to `Null`.
    pub eos_state: State,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_millis(100),
            message_mask: MessageMask::ERROR
                | MessageMask::EOS
                | MessageMask::STATE_CHANGED
                | MessageMask::DURATION_CHANGED
                | MessageMask::ASYNC_DONE
                | MessageMask::APPLICATION,
            accepted_caps: vec!["audio/x-raw".to_string(), "video/x-raw".to_string()],
            chains: vec![ChainConfig::audio(), ChainConfig::video()],
            source: "source".to_string(),
            scheduled_seek: None,
            eos_state: State::Ready,
        }
    }
}

impl ControllerConfig {
    /// Command-line walkthrough: jump to 20s once playback passes 10s.
    pub fn tutorial() -> Self {
        Self {
            scheduled_seek: Some(ScheduledSeek::new(
                ClockTime::from_secs(10),
                ClockTime::from_secs(20),
            )),
            ..Self::default()
        }
    }

    /// Interactive player: refreshes once a second, no automatic seek.
    pub fn player() -> Self {
        Self {
            poll_timeout: Duration::from_secs(1),
            ..Self::default()
        }
    }

    /// Audio-only playback.
    pub fn audio_only() -> Self {
        Self {
            accepted_caps: vec!["audio/x-raw".to_string()],
            chains: vec![ChainConfig::audio()],
            ..Self::default()
        }
    }
}
