use std::collections::HashMap;

use six_seven_core::{DigitSource, PowerUpKind, SequenceId, Special, SpawnedDigit};
use six_seven_system_spawning::{RandomDigits, ScriptedDigits};

const SAMPLES: u64 = 200_000;

fn draw(seed: u64, probability: f64, samples: u64) -> Vec<SpawnedDigit> {
    let mut digits = RandomDigits::from_seed(seed);
    (0..samples)
        .map(|step| digits.next_digit(SequenceId::new(step), probability))
        .collect()
}

#[test]
fn target_frequency_converges_to_probability() {
    for probability in [0.2, 0.45, 0.6] {
        let drawn = draw(0x5eed, probability, SAMPLES);
        let targets = drawn.iter().filter(|digit| digit.is_target()).count();
        let observed = targets as f64 / SAMPLES as f64;
        assert!(
            (observed - probability).abs() < 0.01,
            "p = {probability}, observed {observed}"
        );
    }
}

#[test]
fn targets_split_evenly_between_six_and_seven() {
    let drawn = draw(11, 0.5, SAMPLES);
    let sixes = drawn.iter().filter(|digit| digit.digit().get() == 6).count();
    let sevens = drawn.iter().filter(|digit| digit.digit().get() == 7).count();
    let share = sixes as f64 / (sixes + sevens) as f64;
    assert!((share - 0.5).abs() < 0.01, "six share {share}");
}

#[test]
fn bonus_rates_match_golden_then_power_up_draw() {
    let drawn = draw(42, 1.0, SAMPLES);
    let golden = drawn.iter().filter(|digit| digit.is_golden()).count();
    let power_ups = drawn
        .iter()
        .filter(|digit| digit.power_up().is_some())
        .count();

    let golden_rate = golden as f64 / SAMPLES as f64;
    let power_up_rate = power_ups as f64 / SAMPLES as f64;
    assert!((golden_rate - 0.10).abs() < 0.005, "golden {golden_rate}");
    assert!((power_up_rate - 0.045).abs() < 0.004, "power-up {power_up_rate}");
}

#[test]
fn every_power_up_kind_is_drawn() {
    let drawn = draw(7, 1.0, SAMPLES);
    let mut counts: HashMap<PowerUpKind, usize> = HashMap::new();
    for kind in drawn.iter().filter_map(SpawnedDigit::power_up) {
        *counts.entry(kind).or_default() += 1;
    }
    for kind in PowerUpKind::ALL {
        assert!(counts.get(&kind).copied().unwrap_or(0) > 1_000, "{kind:?} too rare");
    }
}

#[test]
fn noise_digits_are_never_targets_and_never_carry_bonuses() {
    let drawn = draw(99, 0.0, SAMPLES / 4);
    for digit in drawn {
        assert!(!matches!(digit.digit().get(), 6 | 7));
        assert_eq!(digit.special(), Special::Plain);
    }
}

#[test]
fn golden_and_power_up_are_mutually_exclusive() {
    for digit in draw(123, 0.8, SAMPLES) {
        assert!(!(digit.is_golden() && digit.power_up().is_some()));
        if !digit.is_target() {
            assert_eq!(digit.special(), Special::Plain);
        }
    }
}

#[test]
fn identical_seeds_replay_identical_digits() {
    assert_eq!(draw(0xabc, 0.5, 1_000), draw(0xabc, 0.5, 1_000));
    assert_ne!(draw(0xabc, 0.5, 1_000), draw(0xabd, 0.5, 1_000));
}

#[test]
fn scripted_digits_play_back_in_order() {
    let mut digits = ScriptedDigits::plain([6, 3])
        .then(7, Special::PowerUp(PowerUpKind::Shield))
        .then_plain([9]);

    let values: Vec<u8> = (0..5)
        .map(|step| digits.next_digit(SequenceId::new(step), 0.5).digit().get())
        .collect();
    assert_eq!(values, vec![6, 3, 7, 9, 0]);
    assert_eq!(digits.remaining(), 0);
}
