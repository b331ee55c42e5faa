//! Duration caching and retry.

mod common;

use common::{MockSource, Recorder, drain, fast_config, pipeline_with};
use playctl::clock::ClockTime;
use playctl::controller::PlaybackController;
use playctl::pipeline::{Message, MessageSource, MessageView, QueryEngine, State};

#[test]
fn test_duration_retried_until_known_then_cached() {
    let recorder = Recorder::new();
    {
        let mut state = recorder.lock();
        state.duration = Some(ClockTime::from_secs(52));
        state.duration_failures = 3;
    }
    let pipeline = pipeline_with(MockSource::new(recorder.clone()));
    let mut engine = QueryEngine::new();

    for _ in 0..3 {
        assert_eq!(engine.query_duration(&pipeline), None);
    }
    assert_eq!(engine.query_duration(&pipeline), Some(ClockTime::from_secs(52)));
    assert_eq!(recorder.duration_queries(), 4);

    // Served from the cache even if the answer would differ now.
    recorder.lock().duration = Some(ClockTime::from_secs(99));
    for _ in 0..5 {
        assert_eq!(engine.query_duration(&pipeline), Some(ClockTime::from_secs(52)));
    }
    assert_eq!(recorder.duration_queries(), 4);

    engine.invalidate_duration();
    assert_eq!(engine.query_duration(&pipeline), Some(ClockTime::from_secs(99)));
    assert_eq!(recorder.duration_queries(), 5);
}

#[test]
fn test_duration_changed_message_invalidates() {
    let recorder = Recorder::new();
    {
        let mut state = recorder.lock();
        state.duration = Some(ClockTime::from_secs(10));
        state.position = Some(ClockTime::from_secs(1));
    }
    let framework = playctl::init();
    let mut controller = PlaybackController::new(
        framework,
        pipeline_with(MockSource::new(recorder.clone())),
        fast_config(),
    )
    .unwrap();

    controller.play().unwrap();
    drain(&mut controller);
    assert_eq!(controller.state(), State::Playing);
    controller.refresh();
    controller.refresh();
    assert_eq!(controller.duration(), Some(ClockTime::from_secs(10)));
    assert_eq!(recorder.duration_queries(), 1);

    recorder.lock().duration = Some(ClockTime::from_secs(20));
    let changed = Message::new(
        MessageSource::Element("source".into()),
        MessageView::DurationChanged,
    );
    controller.pipeline().bus().post(changed).unwrap();
    drain(&mut controller);
    assert_eq!(controller.duration(), None);

    controller.refresh();
    assert_eq!(controller.duration(), Some(ClockTime::from_secs(20)));
    assert_eq!(recorder.duration_queries(), 2);
}

#[test]
fn test_position_unavailable_is_skipped() {
    let recorder = Recorder::new();
    let framework = playctl::init();
    let mut controller = PlaybackController::new(
        framework,
        pipeline_with(MockSource::new(recorder.clone())),
        fast_config(),
    )
    .unwrap();

    controller.play().unwrap();
    drain(&mut controller);
    controller.refresh();
    assert_eq!(controller.position(), None);

    recorder.set_position(ClockTime::from_secs(3));
    controller.refresh();
    assert_eq!(controller.position(), Some(ClockTime::from_secs(3)));
}
