//! Shared mock elements for integration tests.
//!
//! Every mock records what it sees in a [`Recorder`] that the test keeps a
//! clone of, so assertions can be made after the pipeline took ownership of
//! the element.

#![allow(dead_code)]

use playctl::clock::ClockTime;
use playctl::config::{ChainConfig, ControllerConfig};
use playctl::controller::PlaybackController;
use playctl::element::{Element, ElementContext, Pad, PropertyError, Value};
use playctl::event::{SeekEvent, StreamKind, Tag, TagList};
use playctl::pipeline::{Pipeline, Query, SeekCapability, StateChange, StateChangeResult};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// What a mock source has been asked to do, and what it answers.
#[derive(Debug, Default)]
pub struct RecorderState {
    pub transitions: Vec<StateChange>,
    pub position: Option<ClockTime>,
    pub duration: Option<ClockTime>,
    pub duration_failures: usize,
    pub duration_queries: usize,
    pub seeking_queries: usize,
    pub seekable: bool,
    pub seeks: Vec<ClockTime>,
    pub refuse: Option<StateChange>,
}

/// Shared handle on a [`RecorderState`].
#[derive(Debug, Clone, Default)]
pub struct Recorder(Arc<Mutex<RecorderState>>);

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock(&self) -> MutexGuard<'_, RecorderState> {
        self.0.lock().unwrap()
    }

    pub fn set_position(&self, position: ClockTime) {
        self.lock().position = Some(position);
    }

    pub fn transitions(&self) -> Vec<StateChange> {
        self.lock().transitions.clone()
    }

    pub fn seeks(&self) -> Vec<ClockTime> {
        self.lock().seeks.clone()
    }

    pub fn seeking_queries(&self) -> usize {
        self.lock().seeking_queries
    }

    pub fn duration_queries(&self) -> usize {
        self.lock().duration_queries
    }
}

/// A demuxing source that exposes its pads when pre-rolling.
pub struct MockSource {
    recorder: Recorder,
    ctx: Option<ElementContext>,
    pads: Vec<(String, String)>,
    streams: Vec<(StreamKind, TagList)>,
    async_preroll: bool,
}

impl MockSource {
    pub fn new(recorder: Recorder) -> Self {
        Self {
            recorder,
            ctx: None,
            pads: Vec::new(),
            streams: Vec::new(),
            async_preroll: false,
        }
    }

    /// Expose a pad with these caps on `Ready -> Paused`.
    pub fn with_pad(mut self, name: &str, caps: &str) -> Self {
        self.pads.push((name.to_string(), caps.to_string()));
        self
    }

    /// Report a stream with these tags.
    pub fn with_stream(mut self, kind: StreamKind, tags: TagList) -> Self {
        self.streams.push((kind, tags));
        self
    }

    /// Complete `Ready -> Paused` from another thread.
    pub fn with_async_preroll(mut self) -> Self {
        self.async_preroll = true;
        self
    }

    fn count(&self, kind: StreamKind) -> usize {
        self.streams.iter().filter(|(k, _)| *k == kind).count()
    }
}

impl Element for MockSource {
    fn attach(&mut self, ctx: ElementContext) {
        self.ctx = Some(ctx);
    }

    fn change_state(&mut self, transition: StateChange) -> StateChangeResult {
        self.recorder.lock().transitions.push(transition);
        if self.recorder.lock().refuse == Some(transition) {
            return StateChangeResult::Failure;
        }
        if transition != StateChange::READY_TO_PAUSED {
            return StateChangeResult::Success;
        }

        let Some(ctx) = self.ctx.clone() else {
            return StateChangeResult::Failure;
        };
        for (name, caps) in &self.pads {
            ctx.pad_added(Pad::sometimes(name.as_str(), caps.as_str()));
        }
        for kind in StreamKind::ALL {
            for index in 0..self.count(kind) {
                ctx.tags_changed(kind, index);
            }
        }

        if self.async_preroll {
            let done = ctx.async_completion();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(5));
                done.complete();
            });
            StateChangeResult::Pending
        } else {
            StateChangeResult::Success
        }
    }

    fn set_property(&mut self, name: &str, _value: Value) -> Result<(), PropertyError> {
        match name {
            "uri" => Ok(()),
            _ => Err(PropertyError::Unknown),
        }
    }

    fn property(&self, name: &str) -> Option<Value> {
        StreamKind::ALL
            .into_iter()
            .find(|k| k.count_property() == name)
            .map(|k| Value::from(self.count(k)))
    }

    fn query(&self, query: &mut Query) -> bool {
        let mut recorder = self.recorder.lock();
        match query {
            Query::Position(slot) => {
                *slot = recorder.position;
                recorder.position.is_some()
            }
            Query::Duration(slot) => {
                recorder.duration_queries += 1;
                if recorder.duration_failures > 0 {
                    recorder.duration_failures -= 1;
                    return false;
                }
                *slot = recorder.duration;
                recorder.duration.is_some()
            }
            Query::Seeking(slot) => {
                recorder.seeking_queries += 1;
                *slot = Some(SeekCapability {
                    enabled: recorder.seekable,
                    start: ClockTime::ZERO,
                    end: recorder.duration,
                });
                true
            }
        }
    }

    fn seek(&mut self, event: &SeekEvent) -> bool {
        let mut recorder = self.recorder.lock();
        recorder.seeks.push(event.position);
        recorder.position = Some(event.position);
        true
    }

    fn stream_tags(&self, kind: StreamKind, index: usize) -> Option<TagList> {
        self.streams
            .iter()
            .filter(|(k, _)| *k == kind)
            .nth(index)
            .map(|(_, tags)| tags.clone())
    }
}

/// A filter or sink accepting one media type prefix.
pub struct MockFilter {
    media_type: &'static str,
    has_src: bool,
}

impl MockFilter {
    pub fn filter(media_type: &'static str) -> Self {
        Self {
            media_type,
            has_src: true,
        }
    }

    pub fn sink(media_type: &'static str) -> Self {
        Self {
            media_type,
            has_src: false,
        }
    }
}

impl Element for MockFilter {
    fn pads(&self) -> Vec<Pad> {
        let mut pads = vec![Pad::sink().accepting([self.media_type])];
        if self.has_src {
            pads.push(Pad::src());
        }
        pads
    }
}

/// `source ~> convert -> sink` and `source ~> vcon -> vsink`.
pub fn pipeline_with(source: MockSource) -> Pipeline {
    let mut pipeline = Pipeline::new("pipeline");
    pipeline.add("source", "mocksource", Box::new(source)).unwrap();
    pipeline
        .add("convert", "audioconvert", Box::new(MockFilter::filter("audio/x-raw")))
        .unwrap();
    pipeline
        .add("sink", "fakesink", Box::new(MockFilter::sink("audio/x-raw")))
        .unwrap();
    pipeline
        .add("vcon", "videoconvert", Box::new(MockFilter::filter("video/x-raw")))
        .unwrap();
    pipeline
        .add("vsink", "fakesink", Box::new(MockFilter::sink("video/x-raw")))
        .unwrap();
    pipeline.link("convert", "sink").unwrap();
    pipeline.link("vcon", "vsink").unwrap();
    pipeline
}

/// Default configuration with a short poll timeout.
pub fn fast_config() -> ControllerConfig {
    ControllerConfig {
        poll_timeout: Duration::from_millis(5),
        chains: vec![ChainConfig::audio(), ChainConfig::video()],
        ..ControllerConfig::default()
    }
}

/// Turn the loop until `done` holds, failing the test after two seconds.
pub fn step_until(controller: &mut PlaybackController, mut done: impl FnMut(&PlaybackController) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !done(controller) {
        assert!(Instant::now() < deadline, "condition not reached: {controller:?}");
        controller.step();
    }
}

/// Turn the loop until the bus is empty.
pub fn drain(controller: &mut PlaybackController) {
    while !controller.pipeline().bus().is_empty() {
        controller.step();
    }
}

/// Tags of an audio stream.
pub fn audio_tags(codec: &str, language: &str) -> TagList {
    let mut tags = TagList::new();
    tags.insert(Tag::AudioCodec, codec);
    tags.insert(Tag::Language, language);
    tags
}

/// Tags of a video stream.
pub fn video_tags(codec: &str) -> TagList {
    let mut tags = TagList::new();
    tags.insert(Tag::VideoCodec, codec);
    tags
}
