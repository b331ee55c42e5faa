//! Pipeline lifecycle state machine.
//!
//! A pipeline moves through `Null -> Ready -> Paused -> Playing` one adjacent
//! step at a time, and back down the same way on teardown. Each step is
//! offered to every element, which answers synchronously or reports that it
//! will finish later (an async transition). The pipeline only commits a step
//! once every element has completed it.

use super::graph::Pipeline;
use super::message::{Message, MessageSource, MessageView};
use crate::observability;
use std::fmt;
use std::sync::atomic::Ordering;

/// Lifecycle state of a pipeline or element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum State {
    /// Initial state; no resources allocated.
    #[default]
    Null,
    /// Resources allocated, no media flowing.
    Ready,
    /// Pre-rolled: media is buffered but the clock is stopped.
    Paused,
    /// Media is flowing.
    Playing,
}

impl State {
    /// The adjacent state one step toward `target`, if any.
    pub fn step_toward(self, target: State) -> Option<State> {
        use State::*;
        match (self.cmp(&target), self) {
            (std::cmp::Ordering::Equal, _) => None,
            (std::cmp::Ordering::Less, Null) => Some(Ready),
            (std::cmp::Ordering::Less, Ready) => Some(Paused),
            (std::cmp::Ordering::Less, _) => Some(Playing),
            (std::cmp::Ordering::Greater, Playing) => Some(Paused),
            (std::cmp::Ordering::Greater, Paused) => Some(Ready),
            (std::cmp::Ordering::Greater, _) => Some(Null),
        }
    }

    /// Upper-case name, as printed in logs.
    pub fn name(self) -> &'static str {
        match self {
            State::Null => "NULL",
            State::Ready => "READY",
            State::Paused => "PAUSED",
            State::Playing => "PLAYING",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single adjacent transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateChange {
    current: State,
    next: State,
}

impl StateChange {
    /// `Null -> Ready`.
    pub const NULL_TO_READY: Self = Self::adjacent(State::Null, State::Ready);
    /// `Ready -> Paused`.
    pub const READY_TO_PAUSED: Self = Self::adjacent(State::Ready, State::Paused);
    /// `Paused -> Playing`.
    pub const PAUSED_TO_PLAYING: Self = Self::adjacent(State::Paused, State::Playing);
    /// `Playing -> Paused`.
    pub const PLAYING_TO_PAUSED: Self = Self::adjacent(State::Playing, State::Paused);
    /// `Paused -> Ready`.
    pub const PAUSED_TO_READY: Self = Self::adjacent(State::Paused, State::Ready);
    /// `Ready -> Null`.
    pub const READY_TO_NULL: Self = Self::adjacent(State::Ready, State::Null);

    const fn adjacent(current: State, next: State) -> Self {
        Self { current, next }
    }

    /// The next step from `current` toward `target`.
    ///
    /// Returns `None` if `current == target`. States are never skipped.
    pub fn toward(current: State, target: State) -> Option<Self> {
        current
            .step_toward(target)
            .map(|next| Self::adjacent(current, next))
    }

    /// State before the transition.
    pub fn current(self) -> State {
        self.current
    }

    /// State after the transition.
    pub fn next(self) -> State {
        self.next
    }

    /// Whether this moves toward `Playing`.
    pub fn is_upward(self) -> bool {
        self.next > self.current
    }

    /// The same step taken backward.
    pub fn reversed(self) -> Self {
        Self::adjacent(self.next, self.current)
    }
}

impl fmt::Display for StateChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.current, self.next)
    }
}

/// Outcome of a state change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateChangeResult {
    /// Completed synchronously.
    Success,
    /// At least one element completes later and will post `AsyncDone`.
    Pending,
    /// An element refused the transition.
    Failure,
}

impl StateChangeResult {
    /// Whether the request failed.
    pub fn is_failure(self) -> bool {
        self == StateChangeResult::Failure
    }
}

/// Tracks the committed state, the in-flight step and the final target.
#[derive(Debug, Clone, Default)]
pub struct StateMachine {
    current: State,
    target: State,
    pending: Option<StateChange>,
}

impl StateMachine {
    /// Create a machine in `Null`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last committed state.
    pub fn current(&self) -> State {
        self.current
    }

    /// Final target of the current request.
    pub fn target(&self) -> State {
        self.target
    }

    /// The step waiting for async completion, if any.
    pub fn pending(&self) -> Option<StateChange> {
        self.pending
    }

    /// Set a new final target.
    pub fn set_target(&mut self, target: State) {
        self.target = target;
    }

    /// The next step to perform, unless one is in flight or the target is reached.
    pub fn next_step(&self) -> Option<StateChange> {
        if self.pending.is_some() {
            return None;
        }
        StateChange::toward(self.current, self.target)
    }

    /// Mark a step as waiting for async completion.
    pub fn begin(&mut self, change: StateChange) {
        debug_assert_eq!(change.current(), self.current);
        self.pending = Some(change);
    }

    /// Commit a step. Returns the transition that became current.
    pub fn commit(&mut self, change: StateChange) -> StateChange {
        self.current = change.next();
        if self.pending == Some(change) {
            self.pending = None;
        }
        change
    }

    /// Abandon the in-flight request; the target falls back to the committed state.
    pub fn abort(&mut self) {
        self.pending = None;
        self.target = self.current;
    }

    /// The state still to be reached after the committed one, if any.
    pub fn pending_target(&self) -> Option<State> {
        (self.target != self.current).then_some(self.target)
    }
}

impl Pipeline {
    /// Last committed state of the pipeline.
    pub fn current_state(&self) -> State {
        self.machine.current()
    }

    /// Final target of the last state request.
    pub fn target_state(&self) -> State {
        self.machine.target()
    }

    /// Whether a step is waiting for async completion.
    pub fn is_state_pending(&self) -> bool {
        self.machine.pending().is_some()
    }

    /// Request a transition toward `target`.
    ///
    /// Steps are taken one at a time and offered to every element, sinks
    /// first. For each committed step the pipeline posts a `StateChanged`
    /// message from itself and one per child element.
    ///
    /// A request in the opposite direction of a pending step abandons that
    /// step: every element that took it is sent the reverse transition and
    /// the pipeline walks on from its last committed state. No pipeline
    /// `StateChanged` is posted for the abandoned step.
    pub fn request_state(&mut self, target: State) -> StateChangeResult {
        if let Some(change) = self.machine.pending() {
            let same_direction = if change.is_upward() {
                target >= change.next()
            } else {
                target <= change.next()
            };
            if same_direction {
                self.machine.set_target(target);
                return StateChangeResult::Pending;
            }
            tracing::debug!(
                pipeline = %self.name,
                step = %change,
                target = %target,
                "abandoning pending step"
            );
            self.abort_pending(change);
        }

        self.machine.set_target(target);
        self.advance()
    }

    /// Complete an async transition from a drained `AsyncDone` message.
    ///
    /// Once every awaited element has completed, the pending step is
    /// committed and the pipeline keeps stepping toward its target.
    /// Completions of an abandoned step carry an older transition cookie
    /// and are ignored.
    pub fn complete_async(&mut self, done: &Message) -> StateChangeResult {
        let Some(change) = self.machine.pending() else {
            return StateChangeResult::Success;
        };
        let &MessageView::AsyncDone { cookie } = done.view() else {
            return StateChangeResult::Pending;
        };
        let element = done.source().name();
        let transition = self.transition.load(Ordering::SeqCst);
        if cookie != transition {
            tracing::trace!(
                pipeline = %self.name,
                element = %element,
                cookie,
                transition,
                "stale async-done"
            );
            return StateChangeResult::Pending;
        }
        if !self.awaiting.remove(element) {
            tracing::trace!(pipeline = %self.name, element = %element, "async-done not awaited");
            return StateChangeResult::Pending;
        }

        self.post(Message::state_changed(
            MessageSource::Element(element.to_string()),
            change.current(),
            change.next(),
            None,
        ));

        if !self.awaiting.is_empty() {
            return StateChangeResult::Pending;
        }

        self.commit_step(change);
        self.advance()
    }

    fn advance(&mut self) -> StateChangeResult {
        while let Some(change) = self.machine.next_step() {
            observability::trace_state_step(&self.name, change.current(), change.next());
            self.transition.fetch_add(1, Ordering::SeqCst);

            let mut done = Vec::new();
            let mut waiting = Vec::new();
            let mut refused = None;
            for id in self.state_order() {
                let Some(node) = self.graph.node_weight_mut(id.0) else {
                    continue;
                };
                match node.element.change_state(change) {
                    StateChangeResult::Success => done.push(node.name.clone()),
                    StateChangeResult::Pending => waiting.push(node.name.clone()),
                    StateChangeResult::Failure => {
                        refused = Some(node.name.clone());
                        break;
                    }
                }
            }

            for name in &done {
                self.post(Message::state_changed(
                    MessageSource::Element(name.clone()),
                    change.current(),
                    change.next(),
                    None,
                ));
            }
            self.entered = done;
            self.entered.extend(waiting.iter().cloned());
            self.awaiting = waiting.into_iter().collect();

            if let Some(element) = refused {
                tracing::warn!(
                    pipeline = %self.name,
                    element = %element,
                    step = %change,
                    "element refused state change"
                );
                self.abort_pending(change);
                return StateChangeResult::Failure;
            }

            if !self.awaiting.is_empty() {
                tracing::debug!(
                    pipeline = %self.name,
                    step = %change,
                    waiting = ?self.awaiting,
                    "state change is async"
                );
                self.machine.begin(change);
                return StateChangeResult::Pending;
            }

            self.commit_step(change);
        }
        StateChangeResult::Success
    }

    /// Send the reverse of `change` to every element that took it, then
    /// fall back to the committed state.
    fn abort_pending(&mut self, change: StateChange) {
        let back = change.reversed();
        let entered = std::mem::take(&mut self.entered);
        for id in self.state_order() {
            let Some(node) = self.graph.node_weight_mut(id.0) else {
                continue;
            };
            if !entered.contains(&node.name) {
                continue;
            }
            let name = node.name.clone();
            if node.element.change_state(back).is_failure() {
                tracing::warn!(
                    pipeline = %self.name,
                    element = %name,
                    step = %back,
                    "element failed to roll back"
                );
                continue;
            }
            // Elements still awaited never reported the forward step.
            if !self.awaiting.contains(&name) {
                self.post(Message::state_changed(
                    MessageSource::Element(name),
                    back.current(),
                    back.next(),
                    None,
                ));
            }
        }
        self.awaiting.clear();
        self.machine.abort();
        self.transition.fetch_add(1, Ordering::SeqCst);
    }

    fn commit_step(&mut self, change: StateChange) {
        self.entered.clear();
        self.machine.commit(change);
        observability::trace_state_change(&self.name, change.current(), change.next());
        self.post(Message::state_changed(
            MessageSource::Pipeline(self.name.clone()),
            change.current(),
            change.next(),
            self.machine.pending_target(),
        ));
    }
}
