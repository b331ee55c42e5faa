//! The playback controller.
//!
//! [`PlaybackController`] owns one [`Pipeline`] and runs a single-threaded
//! cooperative loop over its bus. Each turn pops at most one message within
//! the configured timeout; when nothing arrives it does the periodic work
//! instead (position refresh and the scheduled seek).
//!
//! Element threads never call into the controller. Their signals are turned
//! into application messages on the bus, so dynamic linking and stream tag
//! aggregation run on the control loop like everything else.
//!
//! # Example
//!
//! ```rust,no_run
//! use playctl::config::ControllerConfig;
//! use playctl::controller::{PlaybackController, RunOutcome};
//! use playctl::elements::{DEFAULT_URI, playback_pipeline};
//! use playctl::pipeline::ElementFactory;
//!
//! let framework = playctl::init();
//! let pipeline = playback_pipeline(&ElementFactory::with_builtins(), DEFAULT_URI)?;
//! let mut controller = PlaybackController::new(framework, pipeline, ControllerConfig::tutorial())?;
//!
//! controller.play()?;
//! match controller.run() {
//!     RunOutcome::Eos => println!("End-Of-Stream reached."),
//!     RunOutcome::Error { message, .. } => eprintln!("{message}"),
//!     RunOutcome::Shutdown => {}
//! }
//! # Ok::<(), playctl::Error>(())
//! ```

use crate::clock::ClockTime;
use crate::config::ControllerConfig;
use crate::element::{Pad, PadRef, Signal};
use crate::error::{Error, Result};
use crate::event::Structure;
use crate::framework::Framework;
use crate::inspector::{ElementStreams, StreamInspector};
use crate::observability::{self, Diagnostic, DiagnosticSink, TracingSink};
use crate::pipeline::{
    Bus, LinkResolver, Message, MessageSource, MessageView, Pipeline, QueryEngine, ScheduledSeek,
    State, StateChangeResult,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Application message carrying a discovered pad.
pub const PAD_ADDED: &str = "pad-added";
/// Application message announcing changed stream tags.
pub const TAGS_CHANGED: &str = "tags-changed";
/// Application message waking the loop for shutdown.
const SHUTDOWN: &str = "shutdown";

/// Why [`PlaybackController::run`] returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The media played to its end.
    Eos,
    /// An element reported an error; the pipeline has been taken to `Null`.
    Error {
        /// Reporting element.
        source: String,
        /// Error text, verbatim.
        message: String,
        /// Optional debugging details.
        debug: Option<String>,
    },
    /// Shutdown was requested through a [`ShutdownHandle`].
    Shutdown,
}

/// Requests the control loop to exit. Cheap to clone, usable from any thread.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    requested: Arc<AtomicBool>,
    bus: Bus,
}

impl ShutdownHandle {
    /// Ask the loop to take the pipeline to `Null` and return.
    pub fn request(&self) {
        if !self.requested.swap(true, Ordering::AcqRel) {
            let wake = Message::application(
                MessageSource::Element("controller".into()),
                Structure::new(SHUTDOWN),
            );
            let _ = self.bus.post(wake);
        }
    }

    /// Whether shutdown has been requested.
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}

/// Drives one pipeline through its lifecycle.
pub struct PlaybackController {
    pipeline: Pipeline,
    bus: Bus,
    resolver: LinkResolver,
    engine: QueryEngine,
    inspector: StreamInspector,
    config: ControllerConfig,
    scheduled_seek: Option<ScheduledSeek>,
    state: State,
    playing: bool,
    position: Option<ClockTime>,
    duration: Option<ClockTime>,
    outcome: Option<RunOutcome>,
    sink: Box<dyn DiagnosticSink>,
    shutdown: ShutdownHandle,
    // Released only after the pipeline above has been dropped.
    _framework: Framework,
}

impl PlaybackController {
    /// Take ownership of `pipeline` and prepare it for control.
    ///
    /// Fails if the configured source element or any chain's sink pad is
    /// missing from the pipeline.
    pub fn new(framework: Framework, pipeline: Pipeline, config: ControllerConfig) -> Result<Self> {
        if pipeline.node(&config.source).is_none() {
            return Err(Error::ElementNotFound(config.source.clone()));
        }
        for chain in &config.chains {
            let sink = PadRef::new(chain.element.as_str(), chain.pad.as_str());
            if pipeline.pad(&sink).is_none() {
                return Err(Error::PadNotFound {
                    element: sink.element,
                    pad: sink.pad,
                });
            }
        }

        let bus = pipeline.bus().clone();
        let signal_bus = bus.clone();
        pipeline
            .signals()
            .connect(move |signal| forward_signal(&signal_bus, signal));

        let shutdown = ShutdownHandle {
            requested: Arc::new(AtomicBool::new(false)),
            bus: bus.clone(),
        };

        Ok(Self {
            resolver: LinkResolver::new(config.accepted_caps.clone(), config.chains.clone()),
            scheduled_seek: config.scheduled_seek,
            state: pipeline.current_state(),
            pipeline,
            bus,
            engine: QueryEngine::new(),
            inspector: StreamInspector::new(),
            config,
            playing: false,
            position: None,
            duration: None,
            outcome: None,
            sink: Box::new(TracingSink),
            shutdown,
            _framework: framework,
        })
    }

    /// Report diagnostics to `sink` instead of the log.
    pub fn with_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The controlled pipeline.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Last state confirmed by a pipeline `StateChanged` message.
    pub fn state(&self) -> State {
        self.state
    }

    /// Whether the confirmed state is `Playing`.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Position seen by the last refresh.
    pub fn position(&self) -> Option<ClockTime> {
        self.position
    }

    /// Duration, once known.
    pub fn duration(&self) -> Option<ClockTime> {
        self.duration
    }

    /// Whether the current media can be seeked.
    pub fn seek_enabled(&self) -> bool {
        self.engine.seek_enabled()
    }

    /// Rendered stream tags.
    pub fn stream_info(&self) -> &str {
        self.inspector.text()
    }

    /// The link resolver, for diagnostics.
    pub fn resolver(&self) -> &LinkResolver {
        &self.resolver
    }

    /// Handle for requesting shutdown from elsewhere.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    // ========================================================================
    // Player operations
    // ========================================================================

    /// Load a new URI. The pipeline must be at most `Ready`.
    ///
    /// Resets the query session, the stream table, the link claims and the
    /// scheduled seek.
    pub fn set_uri(&mut self, uri: &str) -> Result<()> {
        if self.pipeline.current_state() > State::Ready || self.pipeline.is_state_pending() {
            return Err(Error::Pipeline(format!(
                "cannot change the URI in state {}",
                self.pipeline.current_state()
            )));
        }

        let source = self.config.source.clone();
        self.pipeline.set_property(&source, "uri", uri)?;
        let removed = self.pipeline.remove_dynamic_pads(&source)?;
        tracing::debug!(uri = %uri, removed_pads = removed, "new media");

        self.resolver.reset();
        self.engine.reset();
        self.inspector.clear();
        if let Some(seek) = &mut self.scheduled_seek {
            seek.rearm();
        }
        self.position = None;
        self.duration = None;
        self.outcome = None;
        Ok(())
    }

    /// Start or resume playback.
    pub fn play(&mut self) -> Result<StateChangeResult> {
        self.outcome = None;
        self.request(State::Playing)
    }

    /// Pause playback.
    pub fn pause(&mut self) -> Result<StateChangeResult> {
        self.request(State::Paused)
    }

    /// Stop playback, keeping resources allocated.
    pub fn stop(&mut self) -> Result<StateChangeResult> {
        self.request(State::Ready)
    }

    /// Release all resources.
    pub fn shutdown(&mut self) -> Result<StateChangeResult> {
        self.playing = false;
        self.request(State::Null)
    }

    /// Flushing key-unit seek. Fire and forget: watch the position.
    pub fn seek(&mut self, position: ClockTime) -> bool {
        if self.engine.seek_queried() && !self.engine.seek_enabled() {
            tracing::warn!(position = %position, "seeking is disabled for this media");
            return false;
        }
        self.engine.seek(&mut self.pipeline, position)
    }

    /// Request a state and handle refusal.
    ///
    /// On failure the refusal is reported, the pipeline is taken to `Null`
    /// and [`Error::StateChange`] is returned.
    pub fn request(&mut self, target: State) -> Result<StateChangeResult> {
        let result = self.pipeline.request_state(target);
        tracing::debug!(target = %target, result = ?result, "state requested");
        if result.is_failure() {
            self.fail_state_change(target);
            return Err(Error::StateChange { target });
        }
        Ok(result)
    }

    fn fail_state_change(&mut self, target: State) {
        self.sink.report(&Diagnostic::StateChangeFailed { target });
        self.playing = false;
        if target != State::Null {
            self.pipeline.request_state(State::Null);
        }
    }

    // ========================================================================
    // Control loop
    // ========================================================================

    /// Run until end-of-stream, an error or a shutdown request.
    pub fn run(&mut self) -> RunOutcome {
        let _span = observability::instrument_controller(self.pipeline.name());
        loop {
            if let Some(outcome) = self.step() {
                tracing::debug!(outcome = ?outcome, "control loop finished");
                return outcome;
            }
        }
    }

    /// One loop turn: handle at most one message, or do the periodic work
    /// if none arrives within the poll timeout.
    ///
    /// Returns the outcome once the loop should terminate.
    pub fn step(&mut self) -> Option<RunOutcome> {
        if self.outcome.is_none() && self.shutdown.is_requested() {
            self.shutdown_now();
        }
        if let Some(outcome) = &self.outcome {
            return Some(outcome.clone());
        }

        match self
            .bus
            .timed_pop_filtered(Some(self.config.poll_timeout), self.config.message_mask)
        {
            Some(message) => self.handle_message(&message),
            None if self.playing => self.refresh(),
            None => {}
        }
        self.outcome.clone()
    }

    fn shutdown_now(&mut self) {
        tracing::info!("shutdown requested");
        self.playing = false;
        self.pipeline.request_state(State::Null);
        self.outcome = Some(RunOutcome::Shutdown);
    }

    /// Process one bus message.
    pub fn handle_message(&mut self, message: &Message) {
        let _span = observability::span_message(message).entered();
        let source = message.source().name().to_string();

        match message.view() {
            MessageView::Error { message, debug } => {
                self.sink.report(&Diagnostic::ElementError {
                    source: source.clone(),
                    message: message.clone(),
                    debug: debug.clone(),
                });
                self.playing = false;
                self.pipeline.request_state(State::Null);
                self.outcome = Some(RunOutcome::Error {
                    source,
                    message: message.clone(),
                    debug: debug.clone(),
                });
            }
            MessageView::Eos => {
                observability::trace_eos(self.pipeline.name(), &source);
                self.sink.report(&Diagnostic::EndOfStream);
                self.playing = false;
                self.pipeline.request_state(self.config.eos_state);
                self.outcome = Some(RunOutcome::Eos);
            }
            MessageView::StateChanged { old, new, .. } => {
                if message.source().is_pipeline() {
                    self.on_state_changed(*old, *new);
                } else {
                    tracing::trace!(element = %source, from = %old, to = %new, "child state changed");
                }
            }
            MessageView::DurationChanged => {
                self.engine.invalidate_duration();
                self.duration = None;
            }
            MessageView::AsyncDone { .. } => {
                if self.pipeline.complete_async(message).is_failure() {
                    let target = self.pipeline.target_state();
                    self.fail_state_change(target);
                }
            }
            MessageView::Application(structure) => match structure.name() {
                PAD_ADDED => self.on_pad_added(structure),
                TAGS_CHANGED => self.refresh_streams(),
                SHUTDOWN => {}
                other => tracing::debug!(name = %other, "unhandled application message"),
            },
        }
    }

    fn on_state_changed(&mut self, old: State, new: State) {
        tracing::info!("Pipeline state changed from {old} to {new}");
        self.state = new;
        self.playing = new == State::Playing;

        if old == State::Ready && new == State::Paused {
            self.refresh();
        }
        if self.playing && !self.engine.seek_queried() {
            self.engine.query_seek_capability(&self.pipeline);
        }
    }

    fn on_pad_added(&mut self, structure: &Structure) {
        let (Some(element), Some(pad)) = (structure.get_str("element"), structure.get_str("pad"))
        else {
            tracing::warn!(structure = ?structure, "malformed pad-added message");
            return;
        };
        tracing::info!("Received new pad '{pad}' from '{element}'");

        let pad_ref = PadRef::new(element, pad);
        if self.pipeline.pad(&pad_ref).is_none() {
            let caps = structure.get_str("caps").unwrap_or_default();
            if let Err(err) = self.pipeline.add_pad(element, Pad::sometimes(pad, caps)) {
                tracing::warn!(pad = %pad_ref, error = %err, "cannot register pad");
                return;
            }
        }

        let resolution = self.resolver.resolve(&mut self.pipeline, &pad_ref);
        tracing::debug!(pad = %pad_ref, resolution = ?resolution, "pad resolved");
    }

    fn refresh_streams(&mut self) {
        let streams = ElementStreams::new(&self.pipeline, &self.config.source);
        self.inspector.refresh(&streams);
    }

    /// Update duration and position and run the scheduled seek.
    ///
    /// Does nothing below `Paused`. Unavailable values are skipped until the
    /// next call.
    pub fn refresh(&mut self) {
        if self.state < State::Paused {
            return;
        }

        self.duration = self.engine.query_duration(&self.pipeline);
        let Some(position) = self.engine.query_position(&self.pipeline) else {
            return;
        };
        self.position = Some(position);
        observability::trace_position(position, self.duration);

        if !self.playing {
            return;
        }
        let seek_enabled = self.engine.seek_enabled();
        if let Some(target) = self
            .scheduled_seek
            .as_mut()
            .and_then(|seek| seek.poll(position, seek_enabled))
        {
            tracing::info!("Reached {position}, performing seek to {target}");
            self.engine.seek(&mut self.pipeline, target);
        }
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.pipeline.signals().disconnect_all();
        if self.pipeline.current_state() != State::Null || self.pipeline.is_state_pending() {
            self.pipeline.request_state(State::Null);
        }
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("pipeline", &self.pipeline)
            .field("state", &self.state)
            .field("playing", &self.playing)
            .field("position", &self.position)
            .field("duration", &self.duration)
            .finish()
    }
}

/// Turn an element signal into an application message for the loop.
fn forward_signal(bus: &Bus, signal: &Signal) {
    let structure = match signal {
        Signal::PadAdded { element, pad } => {
            let mut s = Structure::new(PAD_ADDED)
                .with_field("element", element.as_str())
                .with_field("pad", pad.name());
            if let Some(caps) = pad.caps() {
                s.set("caps", caps.as_str());
            }
            s
        }
        Signal::TagsChanged {
            element,
            kind,
            index,
        } => Structure::new(TAGS_CHANGED)
            .with_field("element", element.as_str())
            .with_field("kind", kind.label())
            .with_field("index", *index),
    };
    let message = Message::application(MessageSource::Element(signal.element().to_string()), structure);
    if bus.post(message).is_err() {
        tracing::debug!(element = %signal.element(), "signal dropped, bus closed");
    }
}
