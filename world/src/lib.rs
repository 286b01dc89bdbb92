#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative round state management for Six-Seven.
//!
//! The world owns the only mutable copy of a round. Adapters mutate it
//! exclusively through [`apply`]; everything else observes it through the
//! [`query`] module or the emitted [`Event`] stream.

mod scoring;
mod timers;

use std::{fmt, time::Duration};

use six_seven_core::{
    ActivePowerUp, Command, DigitSource, Event, GameStats, PowerUpKind, RoundConfig, RoundError,
    RoundMode, RoundPhase, SequenceId, SpawnedDigit, Timestamp, HIT_INTERVAL_NUDGE_MS,
    POWER_UP_DURATION, TARGET_PROBABILITY_DECAY, WRONG_TAP_PENALTY,
};
use tracing::{debug, info};

use crate::timers::{interval_to_duration, Deadline, Timers};

/// Represents the authoritative state of a single round.
///
/// One world hosts exactly one round: once it ends, the world only answers
/// queries about the final state.
pub struct World {
    digits: Box<dyn DigitSource>,
    phase: RoundPhase,
    round: Option<Round>,
}

impl World {
    /// Creates a world that draws spawned digits from the provided source.
    #[must_use]
    pub fn new(digits: impl DigitSource + 'static) -> Self {
        Self {
            digits: Box::new(digits),
            phase: RoundPhase::NotStarted,
            round: None,
        }
    }

    fn start(
        &mut self,
        config: RoundConfig,
        started_at: Timestamp,
        out_events: &mut Vec<Event>,
    ) -> Result<(), RoundError> {
        if self.phase != RoundPhase::NotStarted {
            return Err(RoundError::AlreadyStarted);
        }
        config.validate()?;

        info!(
            difficulty = %config.difficulty,
            mode = %config.mode,
            "round started"
        );
        let time_value = config.initial_time_value();
        out_events.push(Event::RoundStarted {
            config: config.clone(),
            time_value,
        });
        self.round = Some(Round::new(config, started_at));
        self.phase = RoundPhase::Running;
        self.run_due(Duration::ZERO, out_events);
        Ok(())
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        match self.phase {
            RoundPhase::Running => self.run_due(dt, out_events),
            RoundPhase::Paused => {
                if let Some(round) = self.round.as_mut() {
                    round.paused_elapsed = round.paused_elapsed.saturating_add(dt);
                }
            }
            RoundPhase::NotStarted | RoundPhase::Ended => {}
        }
    }

    /// Fires every deadline that falls within the next `dt` of running time in
    /// chronological order, then settles the clock at the end of the window.
    ///
    /// Elapsed time is reported as one [`Event::TimeAdvanced`] per stretch
    /// between deadlines, so observers see each event at the running time it
    /// happened.
    fn run_due(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let Some(round) = self.round.as_mut() else {
            return;
        };
        let horizon = round.timers.now().saturating_add(dt);

        while self.phase == RoundPhase::Running {
            let expiry = round.power_up.as_ref().map(ActivePowerUp::expires_at);
            let Some((at, deadline)) = round.timers.next_due(expiry, horizon) else {
                break;
            };
            advance_to(&mut round.timers, at, out_events);

            match deadline {
                Deadline::PowerUpExpiry => round.expire_power_up(out_events),
                Deadline::SpawnStep => round.spawn_step(self.digits.as_mut(), out_events),
                Deadline::ClockStep => {
                    if round.clock_step(out_events) == ClockOutcome::Expired {
                        round.finish(out_events);
                        self.phase = RoundPhase::Ended;
                    }
                }
            }
        }

        if self.phase == RoundPhase::Running {
            advance_to(&mut round.timers, horizon, out_events);
        }
    }

    fn tap(&mut self, out_events: &mut Vec<Event>) -> Result<(), RoundError> {
        self.require_running()?;
        self.round_mut()?.tap(out_events)
    }

    fn pause(&mut self, out_events: &mut Vec<Event>) -> Result<(), RoundError> {
        self.require_running()?;
        self.phase = RoundPhase::Paused;
        out_events.push(Event::Paused);
        Ok(())
    }

    fn resume(&mut self, out_events: &mut Vec<Event>) -> Result<(), RoundError> {
        match self.phase {
            RoundPhase::Paused => {
                self.phase = RoundPhase::Running;
                out_events.push(Event::Resumed);
                Ok(())
            }
            RoundPhase::Running => Err(RoundError::NotPaused),
            RoundPhase::NotStarted => Err(RoundError::NotStarted),
            RoundPhase::Ended => Err(RoundError::Ended),
        }
    }

    fn end(&mut self, out_events: &mut Vec<Event>) -> Result<(), RoundError> {
        match self.phase {
            RoundPhase::Running | RoundPhase::Paused => {
                self.round_mut()?.finish(out_events);
                self.phase = RoundPhase::Ended;
                Ok(())
            }
            RoundPhase::NotStarted => Err(RoundError::NotStarted),
            RoundPhase::Ended => Err(RoundError::Ended),
        }
    }

    fn require_running(&self) -> Result<(), RoundError> {
        match self.phase {
            RoundPhase::Running => Ok(()),
            RoundPhase::Paused => Err(RoundError::Paused),
            RoundPhase::NotStarted => Err(RoundError::NotStarted),
            RoundPhase::Ended => Err(RoundError::Ended),
        }
    }

    fn round_mut(&mut self) -> Result<&mut Round, RoundError> {
        self.round.as_mut().ok_or(RoundError::NotStarted)
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("digits", &self.digits)
            .field("phase", &self.phase)
            .field("round", &self.round)
            .finish()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands that are not valid in the current phase leave the world untouched
/// and are reported through [`Event::CommandRejected`].
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    let kind = command.kind();
    let result = match command {
        Command::StartRound { config, started_at } => world.start(config, started_at, out_events),
        Command::Tick { dt } => {
            world.tick(dt, out_events);
            Ok(())
        }
        Command::Tap => world.tap(out_events),
        Command::Pause => world.pause(out_events),
        Command::Resume => world.resume(out_events),
        Command::EndRound => world.end(out_events),
    };

    if let Err(reason) = result {
        debug!(command = ?kind, %reason, "command rejected");
        out_events.push(Event::CommandRejected {
            command: kind,
            reason,
        });
    }
}

/// Moves running time to `at`, reporting the elapsed stretch if there is one.
fn advance_to(timers: &mut Timers, at: Duration, out_events: &mut Vec<Event>) {
    let dt = at.saturating_sub(timers.now());
    if !dt.is_zero() {
        out_events.push(Event::TimeAdvanced { dt });
    }
    timers.jump_to(at);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ClockOutcome {
    Continue,
    Expired,
}

#[derive(Clone, Copy, Debug)]
struct LiveDigit {
    digit: SpawnedDigit,
    acted: bool,
}

#[derive(Debug)]
struct Round {
    config: RoundConfig,
    started_at: Timestamp,
    paused_elapsed: Duration,
    timers: Timers,
    score: u64,
    combo: u32,
    max_combo: u32,
    hits: u32,
    misses: u32,
    spawn_interval_ms: f64,
    target_probability: f64,
    time_value: u32,
    live: Option<LiveDigit>,
    next_sequence: SequenceId,
    power_up: Option<ActivePowerUp>,
    stats: Option<GameStats>,
}

impl Round {
    fn new(config: RoundConfig, started_at: Timestamp) -> Self {
        Self {
            spawn_interval_ms: config.initial_spawn_interval_ms,
            target_probability: config.target_probability_start,
            time_value: config.initial_time_value(),
            config,
            started_at,
            paused_elapsed: Duration::ZERO,
            timers: Timers::new(),
            score: 0,
            combo: 0,
            max_combo: 0,
            hits: 0,
            misses: 0,
            live: None,
            next_sequence: SequenceId::new(0),
            power_up: None,
            stats: None,
        }
    }

    fn spawn_step(&mut self, digits: &mut dyn DigitSource, out_events: &mut Vec<Event>) {
        if let Some(previous) = self.live.take() {
            if previous.digit.is_target() && !previous.acted && self.combo > 0 {
                out_events.push(Event::TargetOmitted {
                    digit: previous.digit,
                    combo_lost: self.combo,
                });
                self.combo = 0;
            }
        }

        self.spawn_interval_ms = (self.spawn_interval_ms * self.config.spawn_speed_multiplier)
            .max(self.config.min_spawn_interval_ms);
        self.target_probability = (self.target_probability - TARGET_PROBABILITY_DECAY)
            .max(self.config.target_probability_min);

        let sequence = self.next_sequence;
        let digit = digits.next_digit(sequence, self.target_probability);
        debug_assert_eq!(digit.sequence(), sequence, "digit source skipped a sequence");
        self.next_sequence = sequence.next();
        self.live = Some(LiveDigit {
            digit,
            acted: false,
        });
        self.timers.schedule_spawn(interval_to_duration(self.spawn_interval_ms));

        out_events.push(Event::DigitSpawned {
            digit,
            spawn_interval_ms: self.spawn_interval_ms,
            target_probability: self.target_probability,
        });
    }

    fn clock_step(&mut self, out_events: &mut Vec<Event>) -> ClockOutcome {
        let outcome = match self.config.mode {
            RoundMode::Timed if self.time_value <= 1 => {
                self.time_value = 0;
                ClockOutcome::Expired
            }
            RoundMode::Timed => {
                self.time_value -= 1;
                ClockOutcome::Continue
            }
            RoundMode::Practice => {
                self.time_value = self.time_value.saturating_add(1);
                ClockOutcome::Continue
            }
        };
        self.timers.schedule_clock();
        out_events.push(Event::ClockAdvanced {
            time_value: self.time_value,
        });
        outcome
    }

    fn expire_power_up(&mut self, out_events: &mut Vec<Event>) {
        if let Some(power_up) = self.power_up.take() {
            debug!(kind = ?power_up.kind(), "power-up expired");
            out_events.push(Event::PowerUpExpired {
                kind: power_up.kind(),
            });
        }
    }

    fn tap(&mut self, out_events: &mut Vec<Event>) -> Result<(), RoundError> {
        let live = self.live.as_mut().ok_or(RoundError::NoLiveDigit)?;
        if live.acted {
            return Err(RoundError::AlreadyActed);
        }
        live.acted = true;
        let digit = live.digit;

        if digit.is_target() {
            self.hit(digit, out_events);
        } else {
            self.wrong_tap(digit, out_events);
        }
        Ok(())
    }

    fn hit(&mut self, digit: SpawnedDigit, out_events: &mut Vec<Event>) {
        let combo_multiplier = scoring::combo_multiplier(self.combo);
        let points = scoring::hit_points(&digit, self.combo, self.power_up.as_ref());

        self.score = self.score.saturating_add(points);
        self.combo = self.combo.saturating_add(1);
        self.max_combo = self.max_combo.max(self.combo);
        self.hits = self.hits.saturating_add(1);
        self.spawn_interval_ms =
            (self.spawn_interval_ms - HIT_INTERVAL_NUDGE_MS).max(self.config.min_spawn_interval_ms);

        out_events.push(Event::TargetHit {
            digit,
            points,
            combo_multiplier,
            combo: self.combo,
        });

        if let Some(kind) = digit.power_up() {
            self.activate_power_up(kind, out_events);
        }
    }

    fn activate_power_up(&mut self, kind: PowerUpKind, out_events: &mut Vec<Event>) {
        let power_up = ActivePowerUp::new(kind, POWER_UP_DURATION, self.timers.now());
        let replaced = self.power_up.replace(power_up).map(|previous| previous.kind());
        info!(?kind, ?replaced, "power-up activated");
        out_events.push(Event::PowerUpActivated { power_up, replaced });
    }

    fn wrong_tap(&mut self, digit: SpawnedDigit, out_events: &mut Vec<Event>) {
        if self
            .power_up
            .is_some_and(|power_up| power_up.kind() == PowerUpKind::Shield)
        {
            self.power_up = None;
            out_events.push(Event::ShieldConsumed { digit });
            return;
        }

        let penalty = WRONG_TAP_PENALTY.min(self.score);
        let combo_lost = self.combo;
        self.score -= penalty;
        self.combo = 0;
        self.misses = self.misses.saturating_add(1);
        out_events.push(Event::WrongTap {
            digit,
            penalty,
            combo_lost,
        });
    }

    fn finish(&mut self, out_events: &mut Vec<Event>) {
        let elapsed = self.timers.now().saturating_add(self.paused_elapsed);
        let stats = GameStats {
            score: self.score,
            max_combo: self.max_combo,
            hits: self.hits,
            misses: self.misses,
            accuracy: GameStats::accuracy(self.hits, self.misses),
            difficulty: self.config.difficulty,
            mode: self.config.mode,
            timestamp: self.started_at.saturating_add(elapsed),
        };
        self.live = None;
        self.power_up = None;
        self.stats = Some(stats.clone());

        info!(
            score = stats.score,
            max_combo = stats.max_combo,
            hits = stats.hits,
            misses = stats.misses,
            "round ended"
        );
        out_events.push(Event::RoundEnded { stats });
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use six_seven_core::{
        GameStats, PowerUpStatus, RoundConfig, RoundPhase, RoundView, SpawnedDigit,
    };

    use super::World;

    /// Reports the lifecycle phase of the round.
    #[must_use]
    pub fn phase(world: &World) -> RoundPhase {
        world.phase
    }

    /// Configuration of the round, once started.
    #[must_use]
    pub fn config(world: &World) -> Option<&RoundConfig> {
        world.round.as_ref().map(|round| &round.config)
    }

    /// Final statistics, available once the round ended.
    #[must_use]
    pub fn stats(world: &World) -> Option<&GameStats> {
        world.round.as_ref().and_then(|round| round.stats.as_ref())
    }

    /// Digit that taps currently resolve against.
    #[must_use]
    pub fn current_digit(world: &World) -> Option<SpawnedDigit> {
        world
            .round
            .as_ref()
            .and_then(|round| round.live.map(|live| live.digit))
    }

    /// Running (unpaused) time elapsed since the round started.
    #[must_use]
    pub fn running_time(world: &World) -> Duration {
        world
            .round
            .as_ref()
            .map_or(Duration::ZERO, |round| round.timers.now())
    }

    /// Running time left before the next spawn step.
    #[must_use]
    pub fn spawn_remaining(world: &World) -> Option<Duration> {
        world
            .round
            .as_ref()
            .map(|round| round.timers.spawn_remaining())
    }

    /// Running time left before the next whole-second clock step.
    #[must_use]
    pub fn clock_remaining(world: &World) -> Option<Duration> {
        world
            .round
            .as_ref()
            .map(|round| round.timers.clock_remaining())
    }

    /// Captures a read-only view of the round for presentation purposes.
    #[must_use]
    pub fn round_view(world: &World) -> RoundView {
        let Some(round) = world.round.as_ref() else {
            return RoundView::default();
        };
        let now = round.timers.now();
        RoundView {
            phase: world.phase,
            score: round.score,
            combo: round.combo,
            max_combo: round.max_combo,
            hits: round.hits,
            misses: round.misses,
            time_value: round.time_value,
            current_number: round.live.map(|live| live.digit),
            active_power_up: round.power_up.map(|power_up| PowerUpStatus {
                kind: power_up.kind(),
                remaining: power_up.remaining(now),
            }),
            spawn_interval_ms: round.spawn_interval_ms,
            target_probability: round.target_probability,
            is_paused: world.phase == RoundPhase::Paused,
        }
    }
}
