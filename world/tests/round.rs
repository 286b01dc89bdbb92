use std::time::Duration;

use six_seven_core::{
    Command, CommandKind, Difficulty, Event, PowerUpKind, RoundConfig, RoundError, RoundMode,
    RoundPhase, Special, Timestamp,
};
use six_seven_system_spawning::ScriptedDigits;
use six_seven_world::{self as world, query, World};

fn start(digits: ScriptedDigits, mode: RoundMode) -> World {
    let mut world = World::new(digits);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::StartRound {
            config: RoundConfig::preset(Difficulty::Easy, mode),
            started_at: Timestamp::from_millis(1_000_000),
        },
        &mut events,
    );
    assert_eq!(query::phase(&world), RoundPhase::Running);
    world
}

fn apply(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn advance_to_next_spawn(world: &mut World) -> Vec<Event> {
    let dt = query::spawn_remaining(world).expect("round started");
    apply(world, Command::Tick { dt })
}

fn rejection(events: &[Event]) -> Option<RoundError> {
    events.iter().find_map(|event| match event {
        Event::CommandRejected { reason, .. } => Some(reason.clone()),
        _ => None,
    })
}

#[test]
fn tapping_forced_six_scores_one_hundred() {
    let mut world = start(ScriptedDigits::plain([6]), RoundMode::Timed);

    let events = apply(&mut world, Command::Tap);
    assert!(matches!(
        events.as_slice(),
        [Event::TargetHit {
            points: 100,
            combo_multiplier: 1,
            combo: 1,
            ..
        }]
    ));

    let view = query::round_view(&world);
    assert_eq!(view.score, 100);
    assert_eq!(view.combo, 1);
    assert_eq!(view.max_combo, 1);
    assert_eq!(view.hits, 1);
    assert!((view.spawn_interval_ms - 1_167.0).abs() < 1e-9);
}

#[test]
fn golden_hit_at_combo_twelve_awards_nine_hundred() {
    let digits = ScriptedDigits::plain([6; 12]).then(7, Special::Golden);
    let mut world = start(digits, RoundMode::Practice);

    for step in 0..12 {
        if step > 0 {
            let _ = advance_to_next_spawn(&mut world);
        }
        let events = apply(&mut world, Command::Tap);
        assert!(matches!(events.as_slice(), [Event::TargetHit { .. }]));
    }
    let before = query::round_view(&world);
    assert_eq!(before.combo, 12);
    assert_eq!(before.score, 2_100);

    let _ = advance_to_next_spawn(&mut world);
    let events = apply(&mut world, Command::Tap);
    assert!(matches!(
        events.as_slice(),
        [Event::TargetHit {
            points: 900,
            combo_multiplier: 3,
            combo: 13,
            ..
        }]
    ));
    assert_eq!(query::round_view(&world).score, 3_000);
}

#[test]
fn shield_absorbs_one_wrong_tap() {
    let digits = ScriptedDigits::default()
        .then(7, Special::PowerUp(PowerUpKind::Shield))
        .then_plain([3, 4]);
    let mut world = start(digits, RoundMode::Timed);

    let events = apply(&mut world, Command::Tap);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::PowerUpActivated { replaced: None, .. })));

    let _ = advance_to_next_spawn(&mut world);
    let events = apply(&mut world, Command::Tap);
    assert!(matches!(events.as_slice(), [Event::ShieldConsumed { .. }]));

    let view = query::round_view(&world);
    assert_eq!(view.score, 100);
    assert_eq!(view.combo, 1);
    assert_eq!(view.misses, 0);
    assert!(view.active_power_up.is_none());

    let _ = advance_to_next_spawn(&mut world);
    let events = apply(&mut world, Command::Tap);
    assert!(matches!(
        events.as_slice(),
        [Event::WrongTap {
            penalty: 50,
            combo_lost: 1,
            ..
        }]
    ));
    let view = query::round_view(&world);
    assert_eq!(view.score, 50);
    assert_eq!(view.combo, 0);
    assert_eq!(view.misses, 1);
}

#[test]
fn wrong_tap_never_drives_score_negative() {
    let mut world = start(ScriptedDigits::plain([2]), RoundMode::Timed);

    let events = apply(&mut world, Command::Tap);
    assert!(matches!(events.as_slice(), [Event::WrongTap { penalty: 0, .. }]));
    let view = query::round_view(&world);
    assert_eq!(view.score, 0);
    assert_eq!(view.misses, 1);
}

#[test]
fn timed_round_ends_exactly_once_after_thirty_seconds() {
    let mut world = start(ScriptedDigits::default(), RoundMode::Timed);
    let mut ended = 0;

    for second in 1..=30 {
        let events = apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
        );
        ended += events
            .iter()
            .filter(|event| matches!(event, Event::RoundEnded { .. }))
            .count();
        if second < 30 {
            assert_eq!(query::round_view(&world).time_value, 30 - second);
        }
    }

    assert_eq!(ended, 1);
    assert_eq!(query::phase(&world), RoundPhase::Ended);
    let view = query::round_view(&world);
    assert_eq!(view.time_value, 0);
    assert!(view.current_number.is_none());

    let stats = query::stats(&world).cloned().expect("stats");
    assert_eq!(stats.timestamp, Timestamp::from_millis(1_030_000));
    assert_eq!(stats.accuracy, 0.0);

    let events = apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_secs(5),
        },
    );
    assert!(events.is_empty());
    let events = apply(&mut world, Command::Tap);
    assert_eq!(rejection(&events), Some(RoundError::Ended));
    let events = apply(&mut world, Command::EndRound);
    assert_eq!(rejection(&events), Some(RoundError::Ended));
    assert_eq!(query::round_view(&world), view);
    assert_eq!(query::stats(&world), Some(&stats));
}

#[test]
fn pause_preserves_remaining_spawn_and_power_up_time() {
    let digits = ScriptedDigits::default().then(6, Special::PowerUp(PowerUpKind::DoublePoints));
    let mut world = start(digits, RoundMode::Timed);
    let _ = apply(&mut world, Command::Tap);
    let _ = apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(400),
        },
    );

    let spawn_before = query::spawn_remaining(&world);
    let clock_before = query::clock_remaining(&world);
    let view_before = query::round_view(&world);
    assert_eq!(
        view_before.active_power_up.map(|status| status.remaining),
        Some(Duration::from_millis(4_600))
    );

    let events = apply(&mut world, Command::Pause);
    assert_eq!(events, vec![Event::Paused]);
    let events = apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_secs(10),
        },
    );
    assert!(events.is_empty());
    let events = apply(&mut world, Command::Tap);
    assert_eq!(rejection(&events), Some(RoundError::Paused));
    assert!(query::round_view(&world).is_paused);

    let events = apply(&mut world, Command::Resume);
    assert_eq!(events, vec![Event::Resumed]);
    assert_eq!(query::spawn_remaining(&world), spawn_before);
    assert_eq!(query::clock_remaining(&world), clock_before);

    let view_after = query::round_view(&world);
    assert_eq!(view_after.active_power_up, view_before.active_power_up);
    assert_eq!(view_after.time_value, view_before.time_value);
    assert_eq!(view_after.current_number, view_before.current_number);
}

#[test]
fn power_up_expires_after_five_seconds_of_running_time() {
    let digits = ScriptedDigits::default().then(7, Special::PowerUp(PowerUpKind::Multiplier));
    let mut world = start(digits, RoundMode::Practice);
    let _ = apply(&mut world, Command::Tap);

    let _ = apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(2_000),
        },
    );
    let _ = apply(&mut world, Command::Pause);
    let _ = apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_secs(60),
        },
    );
    let _ = apply(&mut world, Command::Resume);

    let events = apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(2_999),
        },
    );
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::PowerUpExpired { .. })));

    let events = apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(1),
        },
    );
    assert!(events.contains(&Event::PowerUpExpired {
        kind: PowerUpKind::Multiplier
    }));
    assert!(query::round_view(&world).active_power_up.is_none());
}

#[test]
fn collected_power_up_boosts_only_later_hits() {
    let digits = ScriptedDigits::default()
        .then(7, Special::PowerUp(PowerUpKind::DoublePoints))
        .then_plain([6]);
    let mut world = start(digits, RoundMode::Timed);

    let events = apply(&mut world, Command::Tap);
    assert!(matches!(events[0], Event::TargetHit { points: 100, .. }));

    let _ = advance_to_next_spawn(&mut world);
    let events = apply(&mut world, Command::Tap);
    assert!(matches!(events.as_slice(), [Event::TargetHit { points: 200, .. }]));
    assert_eq!(query::round_view(&world).score, 300);
}

#[test]
fn newer_power_up_replaces_older() {
    let digits = ScriptedDigits::default()
        .then(7, Special::PowerUp(PowerUpKind::Shield))
        .then(6, Special::PowerUp(PowerUpKind::Multiplier));
    let mut world = start(digits, RoundMode::Timed);
    let _ = apply(&mut world, Command::Tap);
    let _ = advance_to_next_spawn(&mut world);

    let events = apply(&mut world, Command::Tap);
    assert!(events.iter().any(|event| matches!(
        event,
        Event::PowerUpActivated {
            replaced: Some(PowerUpKind::Shield),
            ..
        }
    )));
    let status = query::round_view(&world)
        .active_power_up
        .expect("power-up active");
    assert_eq!(status.kind, PowerUpKind::Multiplier);
    assert_eq!(status.remaining, Duration::from_secs(5));
}

#[test]
fn omitted_target_resets_combo_without_counting_a_miss() {
    let mut world = start(ScriptedDigits::plain([6, 7, 1]), RoundMode::Timed);
    let _ = apply(&mut world, Command::Tap);

    let events = advance_to_next_spawn(&mut world);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::TargetOmitted { .. })));

    let events = advance_to_next_spawn(&mut world);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::TargetOmitted { combo_lost: 1, .. })));

    let view = query::round_view(&world);
    assert_eq!(view.combo, 0);
    assert_eq!(view.max_combo, 1);
    assert_eq!(view.misses, 0);
    assert_eq!(view.score, 100);
}

#[test]
fn omission_without_combo_is_silent() {
    let mut world = start(ScriptedDigits::plain([6, 2]), RoundMode::Timed);
    let events = advance_to_next_spawn(&mut world);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::TargetOmitted { .. })));
}

#[test]
fn second_tap_on_same_digit_is_rejected() {
    let mut world = start(ScriptedDigits::plain([6]), RoundMode::Timed);
    let _ = apply(&mut world, Command::Tap);

    let events = apply(&mut world, Command::Tap);
    assert_eq!(
        events,
        vec![Event::CommandRejected {
            command: CommandKind::Tap,
            reason: RoundError::AlreadyActed,
        }]
    );
    assert_eq!(query::round_view(&world).score, 100);
}

#[test]
fn lifecycle_commands_out_of_order_are_rejected() {
    let mut world = World::new(ScriptedDigits::default());
    assert_eq!(
        rejection(&apply(&mut world, Command::Tap)),
        Some(RoundError::NotStarted)
    );
    assert_eq!(
        rejection(&apply(&mut world, Command::Pause)),
        Some(RoundError::NotStarted)
    );
    assert_eq!(
        rejection(&apply(&mut world, Command::EndRound)),
        Some(RoundError::NotStarted)
    );

    let mut world = start(ScriptedDigits::default(), RoundMode::Practice);
    assert_eq!(
        rejection(&apply(&mut world, Command::Resume)),
        Some(RoundError::NotPaused)
    );
    let _ = apply(&mut world, Command::Pause);
    assert_eq!(
        rejection(&apply(&mut world, Command::Pause)),
        Some(RoundError::Paused)
    );
}

#[test]
fn practice_round_ends_on_request_while_paused() {
    let mut world = start(ScriptedDigits::plain([6]), RoundMode::Practice);
    let _ = apply(&mut world, Command::Tap);
    let _ = apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_secs(45),
        },
    );
    assert_eq!(query::round_view(&world).time_value, 45);
    let _ = apply(&mut world, Command::Pause);

    let events = apply(&mut world, Command::EndRound);
    let stats = match events.as_slice() {
        [Event::RoundEnded { stats }] => stats.clone(),
        other => panic!("unexpected events: {other:?}"),
    };
    assert_eq!(stats.score, 100);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.accuracy, 1.0);
    assert_eq!(stats.mode, RoundMode::Practice);
    assert_eq!(stats.difficulty, Difficulty::Easy);
    assert!(!query::round_view(&world).is_paused);
}
