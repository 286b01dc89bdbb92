#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session façade that plays one round for a presentation layer.
//!
//! [`RoundEngine`] owns the authoritative [`World`] together with the pure
//! systems that react to it. Every operation applies a single command, routes
//! the resulting events through feedback, audio and progress, and publishes
//! a fresh [`Snapshot`] to subscribers whenever something visible changed.

use std::{fmt, time::Duration};

use six_seven_core::{
    Command, DigitSource, Event, GameStats, RoundConfig, RoundError, RoundPhase, RoundView,
    Timestamp,
};
use six_seven_system_audio_cues::{dispatch, AudioCueEmitter, AudioCues};
use six_seven_system_feedback::{Feedback, FeedbackSystem};
use six_seven_system_progress::{ProgressStore, ProgressTracker};
use six_seven_world::{self as world, query, World};
use tracing::trace;

/// Immutable state handed to presentation layers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    /// Round state.
    pub round: RoundView,
    /// Transient banner, if one is showing.
    pub feedback: Option<Feedback>,
}

impl Snapshot {
    /// Text of the feedback banner, if one is showing.
    #[must_use]
    pub fn feedback_text(&self) -> Option<&str> {
        self.feedback.as_ref().map(|feedback| feedback.text.as_str())
    }
}

/// Handle identifying a snapshot subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&Snapshot)>;

/// Plays a single round and fans its outcome out to collaborators.
pub struct RoundEngine<S, A> {
    world: World,
    feedback: FeedbackSystem,
    audio: AudioCues,
    emitter: A,
    progress: ProgressTracker,
    store: S,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl<S, A> RoundEngine<S, A>
where
    S: ProgressStore,
    A: AudioCueEmitter,
{
    /// Creates an engine with sound enabled.
    #[must_use]
    pub fn new(digits: impl DigitSource + 'static, store: S, emitter: A) -> Self {
        Self {
            world: World::new(digits),
            feedback: FeedbackSystem::new(),
            audio: AudioCues::default(),
            emitter,
            progress: ProgressTracker::new(),
            store,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Enables or silences audio cues.
    #[must_use]
    pub fn with_sound(mut self, enabled: bool) -> Self {
        self.audio.set_enabled(enabled);
        self
    }

    /// Starts the round, spawning the first digit immediately.
    pub fn start(&mut self, config: RoundConfig, started_at: Timestamp) -> Result<(), RoundError> {
        self.execute(Command::StartRound { config, started_at })
    }

    /// Advances running time; ignored while paused or outside a round.
    pub fn advance(&mut self, dt: Duration) {
        if let Err(reason) = self.execute(Command::Tick { dt }) {
            trace!(%reason, "tick rejected");
        }
    }

    /// Resolves a tap against the live digit.
    pub fn tap(&mut self) -> Result<(), RoundError> {
        self.execute(Command::Tap)
    }

    /// Freezes every timer.
    pub fn pause(&mut self) -> Result<(), RoundError> {
        self.execute(Command::Pause)
    }

    /// Unfreezes every timer.
    pub fn resume(&mut self) -> Result<(), RoundError> {
        self.execute(Command::Resume)
    }

    /// Pauses a running round or resumes a paused one.
    pub fn toggle_pause(&mut self) -> Result<(), RoundError> {
        if query::phase(&self.world) == RoundPhase::Paused {
            self.resume()
        } else {
            self.pause()
        }
    }

    /// Ends the round and returns its final statistics.
    pub fn end(&mut self) -> Result<GameStats, RoundError> {
        self.execute(Command::EndRound)?;
        query::stats(&self.world).cloned().ok_or(RoundError::NotStarted)
    }

    /// Statistics of the finished round.
    #[must_use]
    pub fn stats(&self) -> Option<&GameStats> {
        query::stats(&self.world)
    }

    /// Captures the current state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            round: query::round_view(&self.world),
            feedback: self.feedback.current().cloned(),
        }
    }

    /// Registers a callback invoked with every published snapshot.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&Snapshot) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Removes a subscriber; returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }

    /// Progress store receiving finished rounds.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Audio emitter receiving cues.
    #[must_use]
    pub fn emitter(&self) -> &A {
        &self.emitter
    }

    /// Number of progress updates the store rejected.
    #[must_use]
    pub fn progress_failures(&self) -> usize {
        self.progress.failures()
    }

    /// Tears the engine down, returning its collaborators.
    #[must_use]
    pub fn into_parts(self) -> (S, A) {
        (self.store, self.emitter)
    }

    fn execute(&mut self, command: Command) -> Result<(), RoundError> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);

        for event in &events {
            if let Event::CommandRejected { reason, .. } = event {
                return Err(reason.clone());
            }
        }

        let feedback_changed = self.feedback.handle(&events);

        let mut cues = Vec::new();
        self.audio.handle(&events, &mut cues);
        dispatch(&mut self.emitter, &cues);

        self.progress.handle(&events, &mut self.store);

        if !events.is_empty() || feedback_changed {
            self.publish();
        }
        Ok(())
    }

    fn publish(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&snapshot);
        }
    }
}

impl<S, A> fmt::Debug for RoundEngine<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoundEngine")
            .field("world", &self.world)
            .field("feedback", &self.feedback)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}
