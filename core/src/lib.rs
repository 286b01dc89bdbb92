#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Six-Seven reflex engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative round world, and pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams and immutable
//! [`RoundView`] snapshots; they never mutate round state directly.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Tap on 6 or 7. Nothing else.";

/// Points awarded for a target hit before any multiplier is applied.
pub const POINTS_PER_HIT: u64 = 100;

/// Consecutive hits required to raise the combo multiplier by one step.
pub const COMBO_STEP: u32 = 5;

/// Upper bound of the combo multiplier.
pub const MAX_COMBO_MULTIPLIER: u32 = 5;

/// Multiplier applied to golden target hits.
pub const GOLDEN_MULTIPLIER: u64 = 3;

/// Points removed from the score when a non-target digit is tapped.
pub const WRONG_TAP_PENALTY: u64 = 50;

/// Fixed reduction applied to the spawn interval on every target hit.
pub const HIT_INTERVAL_NUDGE_MS: f64 = 15.0;

/// Reduction applied to the target probability on every spawn step.
pub const TARGET_PROBABILITY_DECAY: f64 = 0.005;

/// Probability that a spawned target is golden.
pub const GOLDEN_CHANCE: f64 = 0.10;

/// Probability that a non-golden spawned target carries a power-up.
pub const POWER_UP_CHANCE: f64 = 0.05;

/// Lifetime of a collected power-up measured in running round time.
pub const POWER_UP_DURATION: Duration = Duration::from_millis(5_000);

/// Granularity of the round clock.
pub const CLOCK_QUANTUM: Duration = Duration::from_secs(1);

/// Length of a timed round unless configured otherwise.
pub const DEFAULT_ROUND_SECONDS: u32 = 30;

/// Digits that score when tapped.
pub const TARGET_DIGITS: [Digit; 2] = [Digit(6), Digit(7)];

/// Digits that cost points when tapped.
pub const NOISE_DIGITS: [Digit; 8] = [
    Digit(0),
    Digit(1),
    Digit(2),
    Digit(3),
    Digit(4),
    Digit(5),
    Digit(8),
    Digit(9),
];

/// Commands that express all permissible round mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Starts the round using the provided configuration.
    StartRound {
        /// Tuning applied for the entire round.
        config: RoundConfig,
        /// Wall-clock moment the round began, used to stamp the final stats.
        started_at: Timestamp,
    },
    /// Advances the round clocks by the provided delta time.
    Tick {
        /// Duration of time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Resolves a player tap against whatever digit is live.
    Tap,
    /// Freezes every round timer.
    Pause,
    /// Unfreezes every round timer, preserving their remaining time.
    Resume,
    /// Ends the round and publishes the final statistics.
    EndRound,
}

impl Command {
    /// Returns the payload-free discriminant of the command.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        match self {
            Self::StartRound { .. } => CommandKind::StartRound,
            Self::Tick { .. } => CommandKind::Tick,
            Self::Tap => CommandKind::Tap,
            Self::Pause => CommandKind::Pause,
            Self::Resume => CommandKind::Resume,
            Self::EndRound => CommandKind::EndRound,
        }
    }
}

/// Payload-free discriminant of a [`Command`], used when reporting rejections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// [`Command::StartRound`].
    StartRound,
    /// [`Command::Tick`].
    Tick,
    /// [`Command::Tap`].
    Tap,
    /// [`Command::Pause`].
    Pause,
    /// [`Command::Resume`].
    Resume,
    /// [`Command::EndRound`].
    EndRound,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a round began.
    RoundStarted {
        /// Configuration the round runs with.
        config: RoundConfig,
        /// Initial value of the round clock.
        time_value: u32,
    },
    /// Indicates that running round time advanced.
    ///
    /// A tick that crosses round deadlines is reported as several stretches,
    /// each emitted before the events of the deadline that closes it.
    TimeAdvanced {
        /// Duration of running time that elapsed in this stretch.
        dt: Duration,
    },
    /// Confirms that a new digit became live.
    DigitSpawned {
        /// Digit that replaced the previous one.
        digit: SpawnedDigit,
        /// Spawn interval after the step's decay, in milliseconds.
        spawn_interval_ms: f64,
        /// Target probability after the step's decay.
        target_probability: f64,
    },
    /// Reports that a target expired untouched while a combo was running.
    TargetOmitted {
        /// Target that was not tapped.
        digit: SpawnedDigit,
        /// Combo value that was lost.
        combo_lost: u32,
    },
    /// Confirms that a target was tapped.
    TargetHit {
        /// Target that was tapped.
        digit: SpawnedDigit,
        /// Points added to the score.
        points: u64,
        /// Combo multiplier used for the base award.
        combo_multiplier: u32,
        /// Combo value after the hit.
        combo: u32,
    },
    /// Confirms that a power-up became active.
    PowerUpActivated {
        /// Newly active power-up.
        power_up: ActivePowerUp,
        /// Power-up that was replaced, if any.
        replaced: Option<PowerUpKind>,
    },
    /// Reports that the active power-up ran out.
    PowerUpExpired {
        /// Kind of power-up that expired.
        kind: PowerUpKind,
    },
    /// Reports that an active shield absorbed a wrong tap.
    ShieldConsumed {
        /// Noise digit that was tapped.
        digit: SpawnedDigit,
    },
    /// Reports that a noise digit was tapped without protection.
    WrongTap {
        /// Noise digit that was tapped.
        digit: SpawnedDigit,
        /// Points actually removed from the score.
        penalty: u64,
        /// Combo value that was lost.
        combo_lost: u32,
    },
    /// Reports a whole-second step of the round clock.
    ClockAdvanced {
        /// Remaining seconds in timed mode, elapsed seconds in practice mode.
        time_value: u32,
    },
    /// Confirms that the round was paused.
    Paused,
    /// Confirms that the round resumed.
    Resumed,
    /// Announces the end of the round with its final statistics.
    RoundEnded {
        /// Immutable summary of the round.
        stats: GameStats,
    },
    /// Reports that a command was rejected without touching round state.
    CommandRejected {
        /// Command that was rejected.
        command: CommandKind,
        /// Specific reason the command failed.
        reason: RoundError,
    },
}

/// Reasons a command may be rejected by the world.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum RoundError {
    /// The engine already hosts a round; one engine plays exactly one round.
    #[error("a round has already been started on this engine")]
    AlreadyStarted,
    /// The command requires a round that has not started yet.
    #[error("the round has not started")]
    NotStarted,
    /// The round is over and accepts no further commands.
    #[error("the round has ended")]
    Ended,
    /// The command is not accepted while the round is paused.
    #[error("the round is paused")]
    Paused,
    /// The command requires a paused round.
    #[error("the round is not paused")]
    NotPaused,
    /// A tap arrived while no digit was live.
    #[error("no digit is live")]
    NoLiveDigit,
    /// A second tap arrived for the same digit.
    #[error("the live digit was already tapped")]
    AlreadyActed,
    /// The provided configuration failed validation.
    #[error("invalid round configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Validation failures for a [`RoundConfig`].
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Spawn intervals must be at least a millisecond and the floor may not exceed the start.
    #[error("spawn interval bounds {min_ms}ms..{initial_ms}ms are invalid")]
    SpawnInterval {
        /// Configured initial interval.
        initial_ms: f64,
        /// Configured minimum interval.
        min_ms: f64,
    },
    /// The decay multiplier must lie strictly between zero and one.
    #[error("spawn speed multiplier {0} must lie in (0, 1)")]
    SpeedMultiplier(f64),
    /// Probabilities must lie in [0, 1] and the floor may not exceed the start.
    #[error("target probability bounds {min}..{start} are invalid")]
    TargetProbability {
        /// Configured starting probability.
        start: f64,
        /// Configured minimum probability.
        min: f64,
    },
    /// Timed rounds need at least one second.
    #[error("timed rounds require a positive duration")]
    ZeroDuration,
}

/// Difficulty presets selectable by the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    /// Slow cadence with plenty of targets.
    Easy,
    /// Balanced cadence.
    Medium,
    /// Fast cadence with scarce targets.
    Hard,
}

impl Difficulty {
    /// Every difficulty in ascending order.
    pub const ALL: [Difficulty; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Easy => "EASY",
            Self::Medium => "MEDIUM",
            Self::Hard => "HARD",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Describes how the round clock behaves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundMode {
    /// Fixed countdown; the round ends when it reaches zero.
    Timed,
    /// Count-up clock; the round only ends on request.
    Practice,
}

impl fmt::Display for RoundMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timed => f.write_str("timed"),
            Self::Practice => f.write_str("practice"),
        }
    }
}

/// Tuning selected once per round and immutable while it runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundConfig {
    /// Difficulty preset the tuning originates from; recorded in the final stats.
    pub difficulty: Difficulty,
    /// Clock behaviour for the round.
    pub mode: RoundMode,
    /// Spawn interval used before the first decay step.
    pub initial_spawn_interval_ms: f64,
    /// Lower bound of the spawn interval.
    pub min_spawn_interval_ms: f64,
    /// Geometric decay applied to the interval on every spawn step.
    pub spawn_speed_multiplier: f64,
    /// Probability that a spawned digit is a target at the start of the round.
    pub target_probability_start: f64,
    /// Lower bound of the target probability.
    pub target_probability_min: f64,
    /// Countdown length for timed rounds.
    pub round_duration_seconds: u32,
}

impl RoundConfig {
    /// Builds the preset tuning for the provided difficulty and mode.
    #[must_use]
    pub fn preset(difficulty: Difficulty, mode: RoundMode) -> Self {
        let (initial, min, multiplier, start, floor) = match difficulty {
            Difficulty::Easy => (1_200.0, 500.0, 0.985, 0.6, 0.45),
            Difficulty::Medium => (1_000.0, 350.0, 0.98, 0.5, 0.3),
            Difficulty::Hard => (800.0, 250.0, 0.975, 0.4, 0.2),
        };
        Self {
            difficulty,
            mode,
            initial_spawn_interval_ms: initial,
            min_spawn_interval_ms: min,
            spawn_speed_multiplier: multiplier,
            target_probability_start: start,
            target_probability_min: floor,
            round_duration_seconds: DEFAULT_ROUND_SECONDS,
        }
    }

    /// Checks that every field lies within its documented range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let initial = self.initial_spawn_interval_ms;
        let min = self.min_spawn_interval_ms;
        if !(min >= 1.0 && min <= initial && initial.is_finite()) {
            return Err(ConfigError::SpawnInterval {
                initial_ms: initial,
                min_ms: min,
            });
        }

        let multiplier = self.spawn_speed_multiplier;
        if !(multiplier > 0.0 && multiplier < 1.0) {
            return Err(ConfigError::SpeedMultiplier(multiplier));
        }

        let start = self.target_probability_start;
        let floor = self.target_probability_min;
        if !((0.0..=1.0).contains(&start) && (0.0..=1.0).contains(&floor) && floor <= start) {
            return Err(ConfigError::TargetProbability { start, min: floor });
        }

        if self.mode == RoundMode::Timed && self.round_duration_seconds == 0 {
            return Err(ConfigError::ZeroDuration);
        }

        Ok(())
    }

    /// Value the round clock shows when the round starts.
    #[must_use]
    pub const fn initial_time_value(&self) -> u32 {
        match self.mode {
            RoundMode::Timed => self.round_duration_seconds,
            RoundMode::Practice => 0,
        }
    }
}

/// Milliseconds since the Unix epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Creates a timestamp from milliseconds since the Unix epoch.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Milliseconds since the Unix epoch.
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Returns the timestamp shifted forward by the provided duration.
    #[must_use]
    pub fn saturating_add(self, duration: Duration) -> Self {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(millis))
    }
}

/// Single decimal digit shown to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Digit(u8);

impl Digit {
    /// Creates a digit, returning `None` outside `0..=9`.
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value <= 9 {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Numeric value of the digit.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Reports whether tapping this digit scores.
    #[must_use]
    pub const fn is_target(&self) -> bool {
        self.0 == 6 || self.0 == 7
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic identifier assigned to every spawned digit within a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SequenceId(u64);

impl SequenceId {
    /// Creates a sequence identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Identifier that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Timed effects a power-up target can grant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PowerUpKind {
    /// Doubles the points of later hits.
    DoublePoints,
    /// Slows the pace of the round; carries no score effect.
    SlowTime,
    /// Absorbs the next wrong tap.
    Shield,
    /// Quintuples the points of later hits.
    Multiplier,
}

impl PowerUpKind {
    /// Every power-up kind, in draw order.
    pub const ALL: [PowerUpKind; 4] = [
        Self::DoublePoints,
        Self::SlowTime,
        Self::Shield,
        Self::Multiplier,
    ];

    /// Factor applied to hits scored while this power-up is active.
    #[must_use]
    pub const fn score_multiplier(self) -> u64 {
        match self {
            Self::DoublePoints => 2,
            Self::Multiplier => 5,
            Self::SlowTime | Self::Shield => 1,
        }
    }

    /// Short badge describing the active effect.
    #[must_use]
    pub const fn badge(self) -> &'static str {
        match self {
            Self::DoublePoints => "⚡ 2X",
            Self::SlowTime => "🕐 SLOW",
            Self::Shield => "🛡️ SHIELD",
            Self::Multiplier => "✨ 5X",
        }
    }
}

/// Bonus carried by a spawned digit.
///
/// Only targets carry anything other than [`Special::Plain`], and a digit is
/// never golden and a power-up at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Special {
    /// Ordinary digit.
    Plain,
    /// Target worth triple points.
    Golden,
    /// Target that grants a power-up when tapped.
    PowerUp(PowerUpKind),
}

/// Digit spawned into the round along with its bonus, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct SpawnedDigit {
    sequence: SequenceId,
    digit: Digit,
    special: Special,
}

impl SpawnedDigit {
    /// Creates a spawned digit, rejecting bonuses on noise digits.
    #[must_use]
    pub const fn new(sequence: SequenceId, digit: Digit, special: Special) -> Option<Self> {
        if !digit.is_target() && !matches!(special, Special::Plain) {
            return None;
        }
        Some(Self {
            sequence,
            digit,
            special,
        })
    }

    /// Creates a plain digit without any bonus.
    #[must_use]
    pub const fn plain(sequence: SequenceId, digit: Digit) -> Self {
        Self {
            sequence,
            digit,
            special: Special::Plain,
        }
    }

    /// Identifier assigned when the digit spawned.
    #[must_use]
    pub const fn sequence(&self) -> SequenceId {
        self.sequence
    }

    /// Digit displayed to the player.
    #[must_use]
    pub const fn digit(&self) -> Digit {
        self.digit
    }

    /// Bonus carried by the digit.
    #[must_use]
    pub const fn special(&self) -> Special {
        self.special
    }

    /// Reports whether tapping the digit scores.
    #[must_use]
    pub const fn is_target(&self) -> bool {
        self.digit.is_target()
    }

    /// Reports whether the digit is a golden target.
    #[must_use]
    pub const fn is_golden(&self) -> bool {
        matches!(self.special, Special::Golden)
    }

    /// Power-up granted by tapping the digit, if any.
    #[must_use]
    pub const fn power_up(&self) -> Option<PowerUpKind> {
        match self.special {
            Special::PowerUp(kind) => Some(kind),
            _ => None,
        }
    }
}

/// Power-up currently affecting the round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ActivePowerUp {
    kind: PowerUpKind,
    duration: Duration,
    activated_at: Duration,
}

impl ActivePowerUp {
    /// Creates a power-up activated at the provided running round time.
    #[must_use]
    pub const fn new(kind: PowerUpKind, duration: Duration, activated_at: Duration) -> Self {
        Self {
            kind,
            duration,
            activated_at,
        }
    }

    /// Kind of effect.
    #[must_use]
    pub const fn kind(&self) -> PowerUpKind {
        self.kind
    }

    /// Total lifetime of the effect.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Running round time at which the effect started.
    #[must_use]
    pub const fn activated_at(&self) -> Duration {
        self.activated_at
    }

    /// Running round time at which the effect ends.
    #[must_use]
    pub fn expires_at(&self) -> Duration {
        self.activated_at.saturating_add(self.duration)
    }

    /// Lifetime left at the provided running round time.
    #[must_use]
    pub fn remaining(&self, now: Duration) -> Duration {
        self.expires_at().saturating_sub(now)
    }
}

/// Summary of a finished round; immutable once produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameStats {
    /// Final score.
    pub score: u64,
    /// Longest combo reached.
    pub max_combo: u32,
    /// Number of target hits.
    pub hits: u32,
    /// Number of unprotected wrong taps.
    pub misses: u32,
    /// `hits / (hits + misses)`, or zero when nothing was tapped.
    pub accuracy: f64,
    /// Difficulty the round was played at.
    pub difficulty: Difficulty,
    /// Clock behaviour of the round.
    pub mode: RoundMode,
    /// Moment the round ended.
    pub timestamp: Timestamp,
}

impl GameStats {
    /// Computes the accuracy ratio, defined as zero when no taps were counted.
    #[must_use]
    pub fn accuracy(hits: u32, misses: u32) -> f64 {
        let total = u64::from(hits) + u64::from(misses);
        if total == 0 {
            0.0
        } else {
            f64::from(hits) / total as f64
        }
    }
}

/// Lifecycle phase of a round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum RoundPhase {
    /// The round has not started.
    #[default]
    NotStarted,
    /// Timers run and taps resolve.
    Running,
    /// Timers are frozen and taps are discarded.
    Paused,
    /// Terminal phase; no command changes state any more.
    Ended,
}

/// Read-only snapshot of the round used by presentation layers and systems.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RoundView {
    /// Lifecycle phase.
    pub phase: RoundPhase,
    /// Current score.
    pub score: u64,
    /// Current combo streak.
    pub combo: u32,
    /// Longest combo so far.
    pub max_combo: u32,
    /// Target hits so far.
    pub hits: u32,
    /// Unprotected wrong taps so far.
    pub misses: u32,
    /// Remaining seconds (timed) or elapsed seconds (practice).
    pub time_value: u32,
    /// Digit that taps resolve against.
    pub current_number: Option<SpawnedDigit>,
    /// Power-up affecting the round.
    pub active_power_up: Option<PowerUpStatus>,
    /// Current spawn interval in milliseconds.
    pub spawn_interval_ms: f64,
    /// Current probability that a spawn is a target.
    pub target_probability: f64,
    /// Whether the round is paused.
    pub is_paused: bool,
}

/// Presentable state of the active power-up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PowerUpStatus {
    /// Kind of effect.
    pub kind: PowerUpKind,
    /// Lifetime left.
    pub remaining: Duration,
}

/// Discrete sound cues requested by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCue {
    /// A target was hit.
    Hit,
    /// A noise digit was tapped.
    Miss,
    /// The round started.
    Start,
    /// The round ended.
    GameOver,
}

impl AudioCue {
    /// Wire tag of the cue.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::Start => "start",
            Self::GameOver => "gameover",
        }
    }
}

/// Supplies the digits spawned by the round.
///
/// Implementations must honour the generation contract: a target with the
/// provided probability, otherwise a noise digit, with bonuses only on targets.
pub trait DigitSource: fmt::Debug {
    /// Produces the digit for the provided spawn step.
    fn next_digit(&mut self, sequence: SequenceId, target_probability: f64) -> SpawnedDigit;
}
