use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use six_seven_core::{Command, Difficulty, RoundConfig, RoundMode, Timestamp};
use six_seven_system_spawning::RandomDigits;
use six_seven_world::{self as world, query, World};

#[test]
fn identical_seeds_replay_identical_rounds() {
    let first = replay(0x67, scripted_commands());
    let second = replay(0x67, scripted_commands());

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(first.log.len() > 40, "expected a busy round");
}

#[test]
fn different_seeds_diverge() {
    let first = replay(1, scripted_commands());
    let second = replay(2, scripted_commands());
    assert_ne!(first.fingerprint(), second.fingerprint());
}

fn replay(seed: u64, commands: Vec<Command>) -> ReplayOutcome {
    let mut world = World::new(RandomDigits::from_seed(seed));
    let mut log = Vec::new();

    for command in commands {
        let mut events = Vec::new();
        world::apply(&mut world, command, &mut events);
        log.extend(events.iter().map(|event| format!("{event:?}")));
    }

    let stats = query::stats(&world).map(|stats| format!("{stats:?}"));
    ReplayOutcome { log, stats }
}

fn scripted_commands() -> Vec<Command> {
    let mut commands = vec![Command::StartRound {
        config: RoundConfig::preset(Difficulty::Medium, RoundMode::Timed),
        started_at: Timestamp::from_millis(0),
    }];
    for frame in 0..2_000_u32 {
        commands.push(Command::Tick {
            dt: Duration::from_millis(16),
        });
        if frame % 7 == 0 {
            commands.push(Command::Tap);
        }
        if frame == 600 {
            commands.push(Command::Pause);
        }
        if frame == 640 {
            commands.push(Command::Resume);
        }
    }
    commands
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    log: Vec<String>,
    stats: Option<String>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}
