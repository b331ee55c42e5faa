//! Pipeline lifecycle: stepping, async completion and confirmed state.

mod common;

use common::{MockSource, Recorder, drain, fast_config, pipeline_with, step_until};
use playctl::controller::PlaybackController;
use playctl::elements::{FakeSink, UriDecodeBin};
use playctl::pipeline::{
    Message, MessageMask, MessageSource, MessageView, Pipeline, State, StateChange,
    StateChangeResult,
};
use std::time::Duration;

/// A decoding source with a slow discovery step, next to a sink.
fn slow_source_pipeline(delay: Duration) -> Pipeline {
    let mut pipeline = Pipeline::new("slow");
    let source = UriDecodeBin::new().with_discover_delay(delay);
    pipeline.add("source", "uridecodebin", Box::new(source)).unwrap();
    pipeline.add("sink", "fakesink", Box::new(FakeSink::new())).unwrap();
    pipeline.set_property("source", "uri", "sim://trailer").unwrap();
    pipeline
}

/// Child state changes of `element` currently queued, in order.
fn element_transitions(pipeline: &Pipeline, element: &str) -> Vec<(State, State)> {
    let mut seen = Vec::new();
    while let Some(msg) = pipeline
        .bus()
        .timed_pop_filtered(Some(Duration::ZERO), MessageMask::STATE_CHANGED)
    {
        if let MessageView::StateChanged { old, new, .. } = msg.view() {
            if msg.source().name() == element {
                seen.push((*old, *new));
            }
        }
    }
    seen
}

/// Pipeline-origin state changes currently queued, in order.
fn pipeline_transitions(pipeline: &Pipeline) -> Vec<(State, State)> {
    let mut seen = Vec::new();
    while let Some(msg) = pipeline
        .bus()
        .timed_pop_filtered(Some(Duration::ZERO), MessageMask::STATE_CHANGED)
    {
        if let (true, MessageView::StateChanged { old, new, .. }) =
            (msg.source().is_pipeline(), msg.view())
        {
            seen.push((*old, *new));
        }
    }
    seen
}

#[test]
fn test_sequential_requests_reach_playing() {
    let recorder = Recorder::new();
    let mut pipeline = pipeline_with(MockSource::new(recorder.clone()));

    let mut seen = Vec::new();
    for target in [State::Ready, State::Paused, State::Playing] {
        let result = pipeline.request_state(target);
        assert_eq!(result, StateChangeResult::Success);
        seen.extend(pipeline_transitions(&pipeline));
    }

    assert_eq!(pipeline.current_state(), State::Playing);
    assert_eq!(
        seen,
        vec![
            (State::Null, State::Ready),
            (State::Ready, State::Paused),
            (State::Paused, State::Playing),
        ]
    );
    assert!(seen.iter().all(|(old, new)| new > old));
    assert_eq!(
        recorder.transitions(),
        vec![
            StateChange::NULL_TO_READY,
            StateChange::READY_TO_PAUSED,
            StateChange::PAUSED_TO_PLAYING,
        ]
    );
}

#[test]
fn test_async_preroll_completes_on_async_done() {
    let recorder = Recorder::new();
    let mut pipeline = pipeline_with(MockSource::new(recorder.clone()).with_async_preroll());

    assert_eq!(pipeline.request_state(State::Playing), StateChangeResult::Pending);
    assert_eq!(pipeline.current_state(), State::Ready);
    assert!(pipeline.is_state_pending());

    let done = pipeline
        .bus()
        .timed_pop_filtered(Some(Duration::from_secs(2)), MessageMask::ASYNC_DONE)
        .expect("async-done");
    let result = pipeline.complete_async(&done);
    assert_eq!(result, StateChangeResult::Success);
    assert_eq!(pipeline.current_state(), State::Playing);
    assert!(!pipeline.is_state_pending());
}

#[test]
fn test_controller_confirms_state_from_pipeline_only() {
    let recorder = Recorder::new();
    let source = MockSource::new(recorder).with_async_preroll();
    let framework = playctl::init();
    let mut controller =
        PlaybackController::new(framework, pipeline_with(source), fast_config()).unwrap();

    assert_eq!(controller.play().unwrap(), StateChangeResult::Pending);
    step_until(&mut controller, |c| c.state() == State::Playing);
    assert!(controller.is_playing());

    // A child reporting a backward change does not move the confirmed state.
    controller
        .pipeline()
        .bus()
        .post(Message::state_changed(
            MessageSource::Element("source".into()),
            State::Playing,
            State::Paused,
            None,
        ))
        .unwrap();
    drain(&mut controller);
    assert_eq!(controller.state(), State::Playing);
    assert!(controller.is_playing());
}

#[test]
fn test_no_backward_change_without_teardown() {
    let framework = playctl::init();
    let source = MockSource::new(Recorder::new()).with_async_preroll();
    let mut pipeline = pipeline_with(source);
    pipeline.request_state(State::Playing);

    let done = pipeline
        .bus()
        .timed_pop_filtered(Some(Duration::from_secs(2)), MessageMask::ASYNC_DONE)
        .unwrap();
    pipeline.complete_async(&done);
    let upward = pipeline_transitions(&pipeline);
    assert!(upward.iter().all(|(old, new)| new > old));
    assert_eq!(upward.last(), Some(&(State::Paused, State::Playing)));

    // Only an explicit request walks back, one state at a time.
    assert_eq!(pipeline.request_state(State::Null), StateChangeResult::Success);
    assert_eq!(
        pipeline_transitions(&pipeline),
        vec![
            (State::Playing, State::Paused),
            (State::Paused, State::Ready),
            (State::Ready, State::Null),
        ]
    );
    drop(framework);
}

#[test]
fn test_refused_transition_falls_back_to_null() {
    let recorder = Recorder::new();
    recorder.lock().refuse = Some(StateChange::PAUSED_TO_PLAYING);
    let framework = playctl::init();
    let mut controller = PlaybackController::new(
        framework,
        pipeline_with(MockSource::new(recorder.clone())),
        fast_config(),
    )
    .unwrap();

    let err = controller.play().unwrap_err();
    assert!(matches!(
        err,
        playctl::Error::StateChange {
            target: State::Playing
        }
    ));
    assert_eq!(controller.pipeline().current_state(), State::Null);
    assert_eq!(
        recorder.transitions().last(),
        Some(&StateChange::READY_TO_NULL)
    );
}

#[test]
fn test_reversed_request_abandons_pending_step() {
    let mut pipeline = slow_source_pipeline(Duration::from_secs(5));
    assert_eq!(pipeline.request_state(State::Paused), StateChangeResult::Pending);
    assert_eq!(pipeline.request_state(State::Ready), StateChangeResult::Success);

    assert_eq!(pipeline.current_state(), State::Ready);
    assert_eq!(pipeline.target_state(), State::Ready);
    assert!(!pipeline.is_state_pending());
    let transitions = pipeline_transitions(&pipeline);
    assert_eq!(transitions, vec![(State::Null, State::Ready)]);
    assert!(!transitions.contains(&(State::Ready, State::Paused)));
}

#[test]
fn test_reversed_request_walks_synchronous_elements_back() {
    let mut pipeline = slow_source_pipeline(Duration::from_secs(5));
    pipeline.request_state(State::Paused);
    pipeline.request_state(State::Ready);

    assert_eq!(
        element_transitions(&pipeline, "sink"),
        vec![
            (State::Null, State::Ready),
            (State::Ready, State::Paused),
            (State::Paused, State::Ready),
        ]
    );
}

#[test]
fn test_stale_async_done_after_stop_is_ignored() {
    let mut pipeline = slow_source_pipeline(Duration::from_millis(200));
    assert_eq!(pipeline.request_state(State::Paused), StateChangeResult::Pending);
    // Let the first pre-roll finish and queue its async-done.
    std::thread::sleep(Duration::from_millis(400));
    assert_eq!(pipeline.request_state(State::Ready), StateChangeResult::Success);
    assert_eq!(pipeline.request_state(State::Paused), StateChangeResult::Pending);

    let stale = pipeline
        .bus()
        .timed_pop_filtered(Some(Duration::ZERO), MessageMask::ASYNC_DONE)
        .expect("queued async-done");
    assert_eq!(pipeline.complete_async(&stale), StateChangeResult::Pending);
    assert_eq!(pipeline.current_state(), State::Ready);
    assert!(pipeline.is_state_pending());

    let fresh = pipeline
        .bus()
        .timed_pop_filtered(Some(Duration::from_secs(2)), MessageMask::ASYNC_DONE)
        .expect("async-done");
    assert_eq!(pipeline.complete_async(&fresh), StateChangeResult::Success);
    assert_eq!(pipeline.current_state(), State::Paused);
}
