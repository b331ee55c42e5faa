//! Sink that discards everything.

use crate::element::{Element, Pad, PropertyError, Value};

/// A sink standing in for audio or video output.
///
/// `FakeSink::audio()` and `FakeSink::video()` only accept raw audio or raw
/// video, like the automatic device sinks they replace.
#[derive(Debug, Clone)]
pub struct FakeSink {
    accepts: Option<&'static str>,
    silent: bool,
}

impl FakeSink {
    /// A sink accepting any media.
    pub fn new() -> Self {
        Self {
            accepts: None,
            silent: true,
        }
    }

    /// A sink for raw audio.
    pub fn audio() -> Self {
        Self {
            accepts: Some("audio/x-raw"),
            ..Self::new()
        }
    }

    /// A sink for raw video.
    pub fn video() -> Self {
        Self {
            accepts: Some("video/x-raw"),
            ..Self::new()
        }
    }
}

impl Default for FakeSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Element for FakeSink {
    fn pads(&self) -> Vec<Pad> {
        let pad = Pad::sink();
        match self.accepts {
            Some(prefix) => vec![pad.accepting([prefix])],
            None => vec![pad],
        }
    }

    fn set_property(&mut self, name: &str, value: Value) -> Result<(), PropertyError> {
        match name {
            "silent" => {
                self.silent = value
                    .as_bool()
                    .ok_or_else(|| PropertyError::InvalidValue(value.clone()))?;
                Ok(())
            }
            _ => Err(PropertyError::Unknown),
        }
    }

    fn property(&self, name: &str) -> Option<Value> {
        match name {
            "silent" => Some(Value::Bool(self.silent)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Caps;

    #[test]
    fn test_sink_variants() {
        let any = FakeSink::new().pads();
        assert!(any[0].accepts(Some(&Caps::new("text/x-raw"))));

        let audio = FakeSink::audio().pads();
        assert!(!audio[0].accepts(Some(&Caps::new("video/x-raw"))));
    }

    #[test]
    fn test_silent_property() {
        let mut sink = FakeSink::new();
        sink.set_property("silent", Value::from("false")).unwrap();
        assert_eq!(sink.property("silent"), Some(Value::Bool(false)));
        assert_eq!(sink.set_property("rate", Value::from(1u64)), Err(PropertyError::Unknown));
    }
}
