//! Position, duration and seeking queries.
//!
//! [`QueryEngine`] keeps the per-media session state: the cached duration,
//! whether seeking is possible and over which range. Query failures are
//! never errors; they come back as `None` and the caller retries on its
//! next refresh tick.

use crate::clock::ClockTime;
use crate::event::SeekEvent;
use crate::observability;

/// Seeking capability of the current media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeekCapability {
    /// Whether seeking is possible at all.
    pub enabled: bool,
    /// Start of the seekable range.
    pub start: ClockTime,
    /// End of the seekable range, if known.
    pub end: Option<ClockTime>,
}

impl SeekCapability {
    /// Seeking not possible.
    pub const DISABLED: Self = Self {
        enabled: false,
        start: ClockTime::ZERO,
        end: None,
    };
}

/// A query answered in place by an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    /// Current playback position.
    Position(Option<ClockTime>),
    /// Total media duration.
    Duration(Option<ClockTime>),
    /// Seeking capability.
    Seeking(Option<SeekCapability>),
}

impl Query {
    /// An unanswered position query.
    pub fn position() -> Self {
        Query::Position(None)
    }

    /// An unanswered duration query.
    pub fn duration() -> Self {
        Query::Duration(None)
    }

    /// An unanswered seeking query.
    pub fn seeking() -> Self {
        Query::Seeking(None)
    }
}

/// Anything queries and seeks can be sent to.
pub trait QueryTarget {
    /// Answer a query in place. Returns `false` if nobody answered.
    fn query(&self, query: &mut Query) -> bool;

    /// Deliver a seek. Returns `false` if nobody handled it.
    fn send_seek(&mut self, event: &SeekEvent) -> bool;
}

/// Per-media query session.
#[derive(Debug, Clone, Default)]
pub struct QueryEngine {
    duration: Option<ClockTime>,
    seeking: Option<SeekCapability>,
}

impl QueryEngine {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything learned about the current media.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Duration of the media.
    ///
    /// Queried until it first succeeds, then served from the cache until
    /// [`invalidate_duration`](Self::invalidate_duration).
    pub fn query_duration(&mut self, target: &impl QueryTarget) -> Option<ClockTime> {
        if self.duration.is_some() {
            return self.duration;
        }

        let mut query = Query::duration();
        match (target.query(&mut query), query) {
            (true, Query::Duration(Some(duration))) => {
                tracing::debug!(duration = %duration, "duration known");
                self.duration = Some(duration);
            }
            _ => tracing::debug!("could not query current duration"),
        }
        self.duration
    }

    /// Drop the cached duration; the next query goes to the pipeline.
    pub fn invalidate_duration(&mut self) {
        self.duration = None;
    }

    /// Current position. `None` means unavailable for now, not an error.
    pub fn query_position(&self, target: &impl QueryTarget) -> Option<ClockTime> {
        let mut query = Query::position();
        match (target.query(&mut query), query) {
            (true, Query::Position(Some(position))) => Some(position),
            _ => {
                tracing::trace!("could not query current position");
                None
            }
        }
    }

    /// Seeking capability, queried at most once per media.
    ///
    /// A failed query is logged and treated as seeking disabled.
    pub fn query_seek_capability(&mut self, target: &impl QueryTarget) -> SeekCapability {
        if let Some(capability) = self.seeking {
            return capability;
        }

        let mut query = Query::seeking();
        let capability = match (target.query(&mut query), query) {
            (true, Query::Seeking(Some(capability))) => capability,
            _ => {
                tracing::warn!("seeking query failed");
                SeekCapability::DISABLED
            }
        };
        observability::trace_seek_capability(&capability);
        self.seeking = Some(capability);
        capability
    }

    /// Whether the seeking capability has been queried for this media.
    pub fn seek_queried(&self) -> bool {
        self.seeking.is_some()
    }

    /// Whether seeking is known to be possible.
    pub fn seek_enabled(&self) -> bool {
        self.seeking.is_some_and(|c| c.enabled)
    }

    /// Issue a flushing key-unit seek.
    ///
    /// Fire and forget: the outcome shows up in later position queries.
    /// The return value only says whether any element took the event.
    pub fn seek(&self, target: &mut impl QueryTarget, position: ClockTime) -> bool {
        let handled = target.send_seek(&SeekEvent::new(position));
        observability::trace_seek(position, handled);
        handled
    }
}

/// One-shot automatic seek once playback passes a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledSeek {
    /// Position that triggers the seek.
    pub threshold: ClockTime,
    /// Where to seek to.
    pub target: ClockTime,
    done: bool,
}

impl ScheduledSeek {
    /// Seek to `target` once the position exceeds `threshold`.
    pub fn new(threshold: ClockTime, target: ClockTime) -> Self {
        Self {
            threshold,
            target,
            done: false,
        }
    }

    /// Whether the seek has been issued.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Arm again, e.g. for new media.
    pub fn rearm(&mut self) {
        self.done = false;
    }

    /// Returns the target the first time `position` crosses the threshold
    /// while seeking is enabled, and `None` ever after.
    pub fn poll(&mut self, position: ClockTime, seek_enabled: bool) -> Option<ClockTime> {
        if self.done || !seek_enabled || position <= self.threshold {
            return None;
        }
        self.done = true;
        Some(self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct FakeTarget {
        duration: Option<ClockTime>,
        position: Option<ClockTime>,
        seeking: Option<SeekCapability>,
        duration_queries: Cell<usize>,
        seeking_queries: Cell<usize>,
        seeks: Vec<SeekEvent>,
    }

    impl QueryTarget for FakeTarget {
        fn query(&self, query: &mut Query) -> bool {
            match query {
                Query::Duration(d) => {
                    self.duration_queries.set(self.duration_queries.get() + 1);
                    *d = self.duration;
                    self.duration.is_some()
                }
                Query::Position(p) => {
                    *p = self.position;
                    self.position.is_some()
                }
                Query::Seeking(s) => {
                    self.seeking_queries.set(self.seeking_queries.get() + 1);
                    *s = self.seeking;
                    self.seeking.is_some()
                }
            }
        }

        fn send_seek(&mut self, event: &SeekEvent) -> bool {
            self.seeks.push(event.clone());
            true
        }
    }

    #[test]
    fn test_duration_cached_until_invalidated() {
        let mut target = FakeTarget {
            duration: Some(ClockTime::from_secs(52)),
            ..Default::default()
        };
        let mut engine = QueryEngine::new();

        assert_eq!(engine.query_duration(&target), Some(ClockTime::from_secs(52)));
        target.duration = Some(ClockTime::from_secs(60));
        assert_eq!(engine.query_duration(&target), Some(ClockTime::from_secs(52)));
        assert_eq!(target.duration_queries.get(), 1);

        engine.invalidate_duration();
        assert_eq!(engine.query_duration(&target), Some(ClockTime::from_secs(60)));
        assert_eq!(target.duration_queries.get(), 2);
    }

    #[test]
    fn test_position_unavailable_is_none() {
        let target = FakeTarget::default();
        let engine = QueryEngine::new();
        assert_eq!(engine.query_position(&target), None);
    }

    #[test]
    fn test_seek_capability_queried_once() {
        let target = FakeTarget {
            seeking: Some(SeekCapability {
                enabled: true,
                start: ClockTime::ZERO,
                end: Some(ClockTime::from_secs(52)),
            }),
            ..Default::default()
        };
        let mut engine = QueryEngine::new();
        assert!(!engine.seek_queried());

        assert!(engine.query_seek_capability(&target).enabled);
        assert!(engine.query_seek_capability(&target).enabled);
        assert_eq!(target.seeking_queries.get(), 1);
        assert!(engine.seek_enabled());

        engine.reset();
        assert!(!engine.seek_queried());
        assert!(!engine.seek_enabled());
    }

    #[test]
    fn test_failed_seeking_query_disables_seeking() {
        let target = FakeTarget::default();
        let mut engine = QueryEngine::new();
        assert_eq!(engine.query_seek_capability(&target), SeekCapability::DISABLED);
        assert!(engine.seek_queried());
        assert!(!engine.seek_enabled());
    }

    #[test]
    fn test_seek_is_flushing_key_unit() {
        let mut target = FakeTarget::default();
        let engine = QueryEngine::new();
        assert!(engine.seek(&mut target, ClockTime::from_secs(20)));
        assert_eq!(target.seeks, vec![SeekEvent::new(ClockTime::from_secs(20))]);
    }

    #[test]
    fn test_scheduled_seek_fires_once() {
        let mut scheduled = ScheduledSeek::new(ClockTime::from_secs(10), ClockTime::from_secs(20));

        assert_eq!(scheduled.poll(ClockTime::from_secs(5), true), None);
        assert_eq!(scheduled.poll(ClockTime::from_secs(10), true), None);
        assert_eq!(scheduled.poll(ClockTime::from_secs(11), false), None);
        assert_eq!(
            scheduled.poll(ClockTime::from_secs(11), true),
            Some(ClockTime::from_secs(20))
        );
        assert!(scheduled.is_done());
        assert_eq!(scheduled.poll(ClockTime::from_secs(21), true), None);

        scheduled.rearm();
        assert!(!scheduled.is_done());
    }
}
