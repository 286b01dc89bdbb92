//! Seeded stand-in for a human player.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use six_seven_core::{SequenceId, SpawnedDigit};

/// Tuning of the simulated player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct BotProfile {
    /// Delay between a digit appearing and the bot tapping it.
    pub(crate) reaction: Duration,
    /// Chance the bot taps a target in time.
    pub(crate) hit_accuracy: f64,
    /// Chance the bot taps a noise digit by mistake.
    pub(crate) false_tap_rate: f64,
}

/// Decides, frame by frame, whether to tap the live digit.
#[derive(Debug)]
pub(crate) struct Bot {
    profile: BotProfile,
    rng: ChaCha8Rng,
    watching: Option<Intent>,
}

#[derive(Clone, Copy, Debug)]
struct Intent {
    sequence: SequenceId,
    tap_after: Option<Duration>,
    seen_for: Duration,
}

impl Bot {
    pub(crate) fn new(profile: BotProfile, seed: u64) -> Self {
        Self {
            profile,
            rng: ChaCha8Rng::seed_from_u64(seed),
            watching: None,
        }
    }

    /// Observes the live digit after `dt` of play and reports whether to tap now.
    pub(crate) fn observe(&mut self, live: Option<SpawnedDigit>, dt: Duration) -> bool {
        let Some(digit) = live else {
            self.watching = None;
            return false;
        };

        let intent = match self.watching {
            Some(mut intent) if intent.sequence == digit.sequence() => {
                intent.seen_for = intent.seen_for.saturating_add(dt);
                intent
            }
            _ => self.decide(digit),
        };

        let tap = intent
            .tap_after
            .is_some_and(|after| intent.seen_for >= after);
        self.watching = Some(Intent {
            tap_after: if tap { None } else { intent.tap_after },
            ..intent
        });
        tap
    }

    fn decide(&mut self, digit: SpawnedDigit) -> Intent {
        let chance = if digit.is_target() {
            self.profile.hit_accuracy
        } else {
            self.profile.false_tap_rate
        };
        let taps = self.rng.gen_bool(chance.clamp(0.0, 1.0));
        Intent {
            sequence: digit.sequence(),
            tap_after: taps.then_some(self.profile.reaction),
            seen_for: Duration::ZERO,
        }
    }
}
