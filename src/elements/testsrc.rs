//! Test pattern source and a pass-through video effect.
//!
//! [`VideoTestSrc`] is the simplest live-free source: it needs no discovery,
//! so every state change completes synchronously. Together with
//! [`VertigoTv`] it forms the static graph built by
//! [`test_pattern_pipeline`](super::test_pattern_pipeline).

use crate::element::{Element, Pad, PropertyError, Value};
use std::fmt;

/// Test pattern types, in their numeric order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TestPattern {
    /// SMPTE 100% color bars.
    #[default]
    Smpte,
    /// Random noise.
    Snow,
    /// Solid black.
    Black,
    /// Solid white.
    White,
    /// Solid red.
    Red,
    /// Solid green.
    Green,
    /// Solid blue.
    Blue,
    /// Checkers with 1px squares.
    Checkers1,
    /// Checkers with 2px squares.
    Checkers2,
    /// Checkers with 4px squares.
    Checkers4,
    /// Checkers with 8px squares.
    Checkers8,
    /// Circular rings.
    Circular,
    /// Alternating black and white frames.
    Blink,
    /// SMPTE 75% color bars.
    Smpte75,
    /// Zone plate.
    ZonePlate,
    /// Gamut checkers.
    Gamut,
    /// Chroma zone plate.
    ChromaZonePlate,
    /// A single configurable color.
    SolidColor,
    /// A moving ball.
    Ball,
    /// SMPTE 100% color bars, full frame.
    Smpte100,
    /// A moving bar.
    Bar,
    /// Pinwheel.
    Pinwheel,
    /// Spokes.
    Spokes,
    /// Gradient.
    Gradient,
    /// Every color.
    Colors,
}

impl TestPattern {
    /// Every pattern, indexed by its numeric value.
    pub const ALL: [TestPattern; 25] = [
        TestPattern::Smpte,
        TestPattern::Snow,
        TestPattern::Black,
        TestPattern::White,
        TestPattern::Red,
        TestPattern::Green,
        TestPattern::Blue,
        TestPattern::Checkers1,
        TestPattern::Checkers2,
        TestPattern::Checkers4,
        TestPattern::Checkers8,
        TestPattern::Circular,
        TestPattern::Blink,
        TestPattern::Smpte75,
        TestPattern::ZonePlate,
        TestPattern::Gamut,
        TestPattern::ChromaZonePlate,
        TestPattern::SolidColor,
        TestPattern::Ball,
        TestPattern::Smpte100,
        TestPattern::Bar,
        TestPattern::Pinwheel,
        TestPattern::Spokes,
        TestPattern::Gradient,
        TestPattern::Colors,
    ];

    /// Short name accepted by the `pattern` property.
    pub fn nick(self) -> &'static str {
        match self {
            TestPattern::Smpte => "smpte",
            TestPattern::Snow => "snow",
            TestPattern::Black => "black",
            TestPattern::White => "white",
            TestPattern::Red => "red",
            TestPattern::Green => "green",
            TestPattern::Blue => "blue",
            TestPattern::Checkers1 => "checkers-1",
            TestPattern::Checkers2 => "checkers-2",
            TestPattern::Checkers4 => "checkers-4",
            TestPattern::Checkers8 => "checkers-8",
            TestPattern::Circular => "circular",
            TestPattern::Blink => "blink",
            TestPattern::Smpte75 => "smpte75",
            TestPattern::ZonePlate => "zone-plate",
            TestPattern::Gamut => "gamut",
            TestPattern::ChromaZonePlate => "chroma-zone-plate",
            TestPattern::SolidColor => "solid-color",
            TestPattern::Ball => "ball",
            TestPattern::Smpte100 => "smpte100",
            TestPattern::Bar => "bar",
            TestPattern::Pinwheel => "pinwheel",
            TestPattern::Spokes => "spokes",
            TestPattern::Gradient => "gradient",
            TestPattern::Colors => "colors",
        }
    }

    /// Numeric value of the pattern.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Parse a property value: a numeric index or a nick.
    pub fn from_value(value: &Value) -> Option<Self> {
        if let Some(nick) = value.as_str() {
            if let Some(pattern) = Self::ALL.iter().find(|p| p.nick() == nick) {
                return Some(*pattern);
            }
        }
        let index = usize::try_from(value.as_u64()?).ok()?;
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for TestPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.nick())
    }
}

/// A source producing raw video test patterns.
///
/// # Example
///
/// ```rust
/// use playctl::element::{Element, Value};
/// use playctl::elements::{TestPattern, VideoTestSrc};
///
/// let mut src = VideoTestSrc::new();
/// src.set_property("pattern", Value::from("ball")).unwrap();
/// assert_eq!(src.pattern(), TestPattern::Ball);
/// assert!(src.set_property("pattern", Value::from(25u64)).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct VideoTestSrc {
    pattern: TestPattern,
}

impl VideoTestSrc {
    /// Create a source showing SMPTE bars.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the test pattern.
    pub fn with_pattern(mut self, pattern: TestPattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Current test pattern.
    pub fn pattern(&self) -> TestPattern {
        self.pattern
    }
}

impl Element for VideoTestSrc {
    fn pads(&self) -> Vec<Pad> {
        vec![Pad::src().with_caps("video/x-raw")]
    }

    fn set_property(&mut self, name: &str, value: Value) -> Result<(), PropertyError> {
        match name {
            "pattern" => {
                let pattern =
                    TestPattern::from_value(&value).ok_or(PropertyError::InvalidValue(value))?;
                tracing::debug!(pattern = %pattern, "test pattern selected");
                self.pattern = pattern;
                Ok(())
            }
            _ => Err(PropertyError::Unknown),
        }
    }

    fn property(&self, name: &str) -> Option<Value> {
        match name {
            "pattern" => Some(Value::from(self.pattern.nick())),
            _ => None,
        }
    }
}

/// Vertigo video effect. Raw video in and out.
#[derive(Debug, Clone, Copy, Default)]
pub struct VertigoTv;

impl VertigoTv {
    /// Create the effect.
    pub fn new() -> Self {
        Self
    }
}

impl Element for VertigoTv {
    fn pads(&self) -> Vec<Pad> {
        vec![Pad::sink().accepting(["video/x-raw"]), Pad::src().with_caps("video/x-raw")]
    }
}
