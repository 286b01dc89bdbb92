#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Digit generation for spawn steps.
//!
//! The world asks a [`DigitSource`] for a digit every time its spawn deadline
//! fires. [`RandomDigits`] draws from a seeded ChaCha stream so a round replays
//! exactly from its seed; [`ScriptedDigits`] plays back a fixed sequence.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use six_seven_core::{
    Digit, DigitSource, PowerUpKind, SequenceId, Special, SpawnedDigit, GOLDEN_CHANCE,
    NOISE_DIGITS, POWER_UP_CHANCE, TARGET_DIGITS,
};

/// Draws a single digit from `rng` for the provided target probability.
///
/// A target is drawn with probability `target_probability` and split evenly
/// between six and seven. Targets are golden with [`GOLDEN_CHANCE`]; the rest
/// carry a uniformly chosen power-up with [`POWER_UP_CHANCE`]. Noise digits are
/// uniform over the remaining eight values and never carry a bonus.
pub fn generate_digit<R>(rng: &mut R, sequence: SequenceId, target_probability: f64) -> SpawnedDigit
where
    R: Rng,
{
    let probability = if target_probability.is_nan() {
        0.0
    } else {
        target_probability.clamp(0.0, 1.0)
    };

    if !rng.gen_bool(probability) {
        let digit = NOISE_DIGITS[rng.gen_range(0..NOISE_DIGITS.len())];
        return SpawnedDigit::plain(sequence, digit);
    }

    let digit = TARGET_DIGITS[rng.gen_range(0..TARGET_DIGITS.len())];
    let special = if rng.gen_bool(GOLDEN_CHANCE) {
        Special::Golden
    } else if rng.gen_bool(POWER_UP_CHANCE) {
        Special::PowerUp(PowerUpKind::ALL[rng.gen_range(0..PowerUpKind::ALL.len())])
    } else {
        Special::Plain
    };

    SpawnedDigit::new(sequence, digit, special)
        .unwrap_or_else(|| SpawnedDigit::plain(sequence, digit))
}

/// Seeded random digit source.
#[derive(Clone, Debug)]
pub struct RandomDigits {
    rng: ChaCha8Rng,
}

impl RandomDigits {
    /// Creates a source whose draws are fully determined by `seed`.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl DigitSource for RandomDigits {
    fn next_digit(&mut self, sequence: SequenceId, target_probability: f64) -> SpawnedDigit {
        generate_digit(&mut self.rng, sequence, target_probability)
    }
}

/// Digit source that replays a fixed script, then falls back to zeros.
///
/// Scripted bonuses on noise digits are dropped. The target probability is
/// ignored.
#[derive(Clone, Debug, Default)]
pub struct ScriptedDigits {
    script: VecDeque<(Digit, Special)>,
}

impl ScriptedDigits {
    /// Script of plain digits; values above nine are skipped.
    #[must_use]
    pub fn plain(values: impl IntoIterator<Item = u8>) -> Self {
        Self {
            script: values
                .into_iter()
                .filter_map(Digit::new)
                .map(|digit| (digit, Special::Plain))
                .collect(),
        }
    }

    /// Appends a digit carrying the provided bonus.
    #[must_use]
    pub fn then(mut self, value: u8, special: Special) -> Self {
        if let Some(digit) = Digit::new(value) {
            self.script.push_back((digit, special));
        }
        self
    }

    /// Appends plain digits.
    #[must_use]
    pub fn then_plain(mut self, values: impl IntoIterator<Item = u8>) -> Self {
        self.script.extend(
            values
                .into_iter()
                .filter_map(Digit::new)
                .map(|digit| (digit, Special::Plain)),
        );
        self
    }

    /// Number of scripted digits not yet spawned.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl DigitSource for ScriptedDigits {
    fn next_digit(&mut self, sequence: SequenceId, _target_probability: f64) -> SpawnedDigit {
        match self.script.pop_front() {
            Some((digit, special)) => SpawnedDigit::new(sequence, digit, special)
                .unwrap_or_else(|| SpawnedDigit::plain(sequence, digit)),
            None => SpawnedDigit::plain(sequence, NOISE_DIGITS[0]),
        }
    }
}
