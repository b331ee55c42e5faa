//! Simulated URI source with demuxing and decoding.
//!
//! [`UriDecodeBin`] behaves like a decoding source as seen from the control
//! plane. Going to `Paused` is asynchronous: a worker thread "inspects" the
//! media, exposes one dynamic pad per stream, announces stream tags and
//! posts `AsyncDone`. While playing, the position follows the wall clock
//! (scaled by the `speed` property) and the worker posts EOS once it passes
//! the duration.

use super::media::MediaInfo;
use crate::clock::ClockTime;
use crate::element::{AsyncCompletion, Element, ElementContext, Pad, PropertyError, Value};
use crate::event::{SeekEvent, SeekFlags, StreamKind, TagList};
use crate::pipeline::{Query, SeekCapability, StateChange, StateChangeResult};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use url::Url;

/// URI schemes the simulated source can open.
const SUPPORTED_SCHEMES: [&str; 4] = ["file", "http", "https", "sim"];

/// Worker wake-up interval while playing.
const TICK: Duration = Duration::from_millis(10);

#[derive(Debug)]
struct Playback {
    discovered: bool,
    base: ClockTime,
    started: Option<Instant>,
    speed: f64,
    eos_sent: bool,
}

impl Playback {
    fn position(&self, duration: ClockTime) -> ClockTime {
        let position = match self.started {
            Some(at) => self.base.advanced(at.elapsed(), self.speed),
            None => self.base,
        };
        position.min(duration)
    }

    fn reset(&mut self) {
        self.discovered = false;
        self.base = ClockTime::ZERO;
        self.started = None;
        self.eos_sent = false;
    }
}

struct Worker {
    stop: kanal::Sender<()>,
    handle: JoinHandle<()>,
}

/// Decoding source for a URI.
///
/// # Properties
///
/// | Name | Type | Access |
/// |------|------|--------|
/// | `uri` | string | read/write while not running |
/// | `speed` | double | read/write |
/// | `n-video`, `n-audio`, `n-text` | uint | read-only, zero until pre-rolled |
pub struct UriDecodeBin {
    ctx: Option<ElementContext>,
    uri: Option<String>,
    media: Arc<MediaInfo>,
    discover_delay: Duration,
    playback: Arc<Mutex<Playback>>,
    worker: Option<Worker>,
}

impl UriDecodeBin {
    /// Create a source that finds [`MediaInfo::sintel_trailer`] at any URI.
    pub fn new() -> Self {
        Self {
            ctx: None,
            uri: None,
            media: Arc::new(MediaInfo::default()),
            discover_delay: Duration::from_millis(5),
            playback: Arc::new(Mutex::new(Playback {
                discovered: false,
                base: ClockTime::ZERO,
                started: None,
                speed: 1.0,
                eos_sent: false,
            })),
            worker: None,
        }
    }

    /// Use `media` for whatever URI is opened.
    pub fn with_media(mut self, media: MediaInfo) -> Self {
        self.media = Arc::new(media);
        self
    }

    /// Time the worker spends inspecting the media before exposing pads.
    pub fn with_discover_delay(mut self, delay: Duration) -> Self {
        self.discover_delay = delay;
        self
    }

    /// Playback speed relative to the wall clock.
    pub fn with_speed(self, speed: f64) -> Self {
        self.lock().speed = speed;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Playback> {
        self.playback.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn start(&mut self) -> StateChangeResult {
        let Some(ctx) = self.ctx.clone() else {
            tracing::warn!("uridecodebin is not part of a pipeline");
            return StateChangeResult::Failure;
        };
        let Some(uri) = self.uri.clone() else {
            tracing::warn!(element = %ctx.name(), "no URI set");
            return StateChangeResult::Failure;
        };

        let done = ctx.async_completion();
        let (stop, stopped) = kanal::bounded(1);
        let media = Arc::clone(&self.media);
        let playback = Arc::clone(&self.playback);
        let delay = self.discover_delay;
        let spawned = std::thread::Builder::new()
            .name(format!("{}-worker", ctx.name()))
            .spawn(move || run_worker(ctx, done, uri, media, playback, stopped, delay));

        match spawned {
            Ok(handle) => {
                self.worker = Some(Worker { stop, handle });
                StateChangeResult::Pending
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to spawn worker thread");
                StateChangeResult::Failure
            }
        }
    }

    fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop.send(());
            if worker.handle.join().is_err() {
                tracing::warn!("uridecodebin worker panicked");
            }
        }
        self.lock().reset();
    }
}

impl Default for UriDecodeBin {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for UriDecodeBin {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Element for UriDecodeBin {
    fn attach(&mut self, ctx: ElementContext) {
        self.ctx = Some(ctx);
    }

    fn change_state(&mut self, transition: StateChange) -> StateChangeResult {
        match transition {
            StateChange::READY_TO_PAUSED => self.start(),
            StateChange::PAUSED_TO_PLAYING => {
                self.lock().started = Some(Instant::now());
                StateChangeResult::Success
            }
            StateChange::PLAYING_TO_PAUSED => {
                let duration = self.media.duration;
                let mut playback = self.lock();
                playback.base = playback.position(duration);
                playback.started = None;
                StateChangeResult::Success
            }
            StateChange::PAUSED_TO_READY => {
                self.stop();
                StateChangeResult::Success
            }
            _ => StateChangeResult::Success,
        }
    }

    fn set_property(&mut self, name: &str, value: Value) -> Result<(), PropertyError> {
        match name {
            "uri" => {
                if self.worker.is_some() {
                    return Err(PropertyError::NotWritable("element is running".into()));
                }
                let uri = value
                    .as_str()
                    .ok_or_else(|| PropertyError::InvalidValue(value.clone()))?;
                self.uri = Some(uri.to_string());
                Ok(())
            }
            "speed" => match value {
                Value::Double(speed) if speed > 0.0 => {
                    self.lock().speed = speed;
                    Ok(())
                }
                other => Err(PropertyError::InvalidValue(other)),
            },
            "n-video" | "n-audio" | "n-text" => Err(PropertyError::NotWritable("read-only".into())),
            _ => Err(PropertyError::Unknown),
        }
    }

    fn property(&self, name: &str) -> Option<Value> {
        match name {
            "uri" => self.uri.clone().map(Value::from),
            "speed" => Some(Value::Double(self.lock().speed)),
            _ => {
                let kind = StreamKind::ALL
                    .into_iter()
                    .find(|k| k.count_property() == name)?;
                let count = if self.lock().discovered {
                    self.media.count(kind)
                } else {
                    0
                };
                Some(Value::from(count))
            }
        }
    }

    fn query(&self, query: &mut Query) -> bool {
        let playback = self.lock();
        if !playback.discovered {
            return false;
        }
        let duration = self.media.duration;
        match query {
            Query::Position(slot) => *slot = Some(playback.position(duration)),
            Query::Duration(slot) => *slot = Some(duration),
            Query::Seeking(slot) => {
                *slot = Some(SeekCapability {
                    enabled: self.media.seekable,
                    start: ClockTime::ZERO,
                    end: Some(duration),
                })
            }
        }
        true
    }

    fn seek(&mut self, event: &SeekEvent) -> bool {
        if !self.media.seekable {
            return false;
        }
        let target = if event.flags.contains(SeekFlags::KEY_UNIT) {
            self.media.snap_to_key_unit(event.position)
        } else {
            event.position.min(self.media.duration)
        };

        let mut playback = self.lock();
        if !playback.discovered {
            return false;
        }
        playback.base = target;
        if playback.started.is_some() {
            playback.started = Some(Instant::now());
        }
        playback.eos_sent = false;
        tracing::debug!(requested = %event.position, position = %target, "seek performed");
        true
    }

    fn stream_tags(&self, kind: StreamKind, index: usize) -> Option<TagList> {
        if !self.lock().discovered {
            return None;
        }
        self.media
            .streams_of(kind)
            .nth(index)
            .filter(|s| !s.tags.is_empty())
            .map(|s| s.tags.clone())
    }
}

/// Wait up to `timeout` for a stop request. Returns `true` if the worker
/// should exit.
fn stop_requested(stopped: &kanal::Receiver<()>, timeout: Duration) -> bool {
    !matches!(
        stopped.recv_timeout(timeout),
        Err(kanal::ReceiveErrorTimeout::Timeout)
    )
}

/// Parse `uri` and check the scheme. The error is the debug text posted
/// alongside "Resource not found.".
fn open(uri: &str) -> std::result::Result<Url, String> {
    let url = Url::parse(uri).map_err(|e| format!("could not parse '{uri}': {e}"))?;
    if !SUPPORTED_SCHEMES.contains(&url.scheme()) {
        return Err(format!(
            "could not open '{uri}': unsupported URI scheme '{}'",
            url.scheme()
        ));
    }
    Ok(url)
}

fn run_worker(
    ctx: ElementContext,
    done: AsyncCompletion,
    uri: String,
    media: Arc<MediaInfo>,
    playback: Arc<Mutex<Playback>>,
    stopped: kanal::Receiver<()>,
    delay: Duration,
) {
    if stop_requested(&stopped, delay) {
        return;
    }

    let url = match open(&uri) {
        Ok(url) => url,
        Err(debug) => {
            ctx.post_error("Resource not found.", Some(debug));
            return;
        }
    };

    playback
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .discovered = true;

    for (i, stream) in media.streams.iter().enumerate() {
        ctx.pad_added(Pad::sometimes(format!("src_{i}"), stream.caps.clone()));
    }
    for kind in StreamKind::ALL {
        for (index, stream) in media.streams_of(kind).enumerate() {
            if !stream.tags.is_empty() {
                ctx.tags_changed(kind, index);
            }
        }
    }
    ctx.post_duration_changed();
    done.complete();
    tracing::debug!(element = %ctx.name(), uri = %url, streams = media.streams.len(), "pre-rolled");

    while !stop_requested(&stopped, TICK) {
        let reached_end = {
            let mut playback = playback.lock().unwrap_or_else(PoisonError::into_inner);
            let end = !playback.eos_sent
                && playback.started.is_some()
                && playback.position(media.duration) >= media.duration;
            if end {
                playback.eos_sent = true;
            }
            end
        };
        if reached_end {
            ctx.post_eos();
        }
    }
}
