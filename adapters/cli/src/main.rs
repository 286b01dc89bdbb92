#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Six-Seven rounds headlessly.

mod bot;
mod round_file;

use std::{
    path::PathBuf,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use six_seven_core::{
    Difficulty, GameStats, RoundConfig, RoundMode, RoundPhase, Timestamp, WELCOME_BANNER,
};
use six_seven_engine::RoundEngine;
use six_seven_system_audio_cues::TracingEmitter;
use six_seven_system_progress::{InMemoryProgressStore, ProgressStore};
use six_seven_system_spawning::RandomDigits;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::{
    bot::{Bot, BotProfile},
    round_file::RoundFile,
};

const DEFAULT_REACTION_MS: u64 = 300;
const DEFAULT_HIT_ACCURACY: f64 = 0.9;
const DEFAULT_FALSE_TAP_RATE: f64 = 0.05;
const BOT_SEED_SALT: u64 = 0x6767_6767_6767_6767;

#[derive(Parser, Debug)]
#[command(name = "six-seven", version, about = WELCOME_BANNER)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(global = true, short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Plays rounds with a seeded bot and prints their statistics.
    Simulate(SimulateArgs),
    /// Prints the tuning of every difficulty preset.
    Presets,
}

#[derive(Args, Debug)]
struct SimulateArgs {
    /// Difficulty preset; defaults to MEDIUM.
    #[arg(long, value_enum)]
    difficulty: Option<DifficultyArg>,

    /// Clock behaviour; defaults to timed.
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Length of timed rounds in seconds.
    #[arg(long)]
    duration: Option<u32>,

    /// Seed for the first round; later rounds add their index.
    #[arg(long, default_value_t = 67)]
    seed: u64,

    /// Number of rounds to play.
    #[arg(long, default_value_t = 1)]
    rounds: u32,

    /// Simulated frame length in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Running time after which practice rounds are ended.
    #[arg(long, default_value_t = 60)]
    practice_seconds: u64,

    /// Bot reaction time in milliseconds.
    #[arg(long)]
    reaction_ms: Option<u64>,

    /// Chance the bot taps a target.
    #[arg(long)]
    hit_accuracy: Option<f64>,

    /// Chance the bot taps a noise digit.
    #[arg(long)]
    false_tap_rate: Option<f64>,

    /// TOML file overriding round tuning and bot behaviour.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Disable audio cues.
    #[arg(long)]
    mute: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DifficultyArg {
    Easy,
    Medium,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(value: DifficultyArg) -> Self {
        match value {
            DifficultyArg::Easy => Self::Easy,
            DifficultyArg::Medium => Self::Medium,
            DifficultyArg::Hard => Self::Hard,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Timed,
    Practice,
}

impl From<ModeArg> for RoundMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Timed => Self::Timed,
            ModeArg::Practice => Self::Practice,
        }
    }
}

/// Settings shared by every simulated round.
#[derive(Clone, Debug)]
struct Session {
    config: RoundConfig,
    profile: BotProfile,
    frame: Duration,
    practice_limit: Duration,
    sound: bool,
}

/// Entry point for the Six-Seven command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Simulate(args) => simulate(args),
        Commands::Presets => {
            print_presets();
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn simulate(args: SimulateArgs) -> Result<()> {
    let rounds = args.rounds;
    let seed = args.seed;
    let session = resolve_session(args)?;

    println!("{WELCOME_BANNER}");
    info!(
        difficulty = %session.config.difficulty,
        mode = %session.config.mode,
        rounds,
        seed,
        "simulation starting"
    );

    let mut store = InMemoryProgressStore::default();
    for round in 0..rounds {
        let round_seed = seed.wrapping_add(u64::from(round));
        let (stats, returned) = play_round(&session, round_seed, store)
            .with_context(|| format!("round {} failed", round + 1))?;
        store = returned;
        print_stats(round + 1, &stats);
    }

    let progress = store.progress().context("failed to read progress")?;
    let summary = store.history().context("failed to read history")?.summary();
    println!(
        "played {} | total score {} | best score {} | best combo {} | golden {} | power-ups {}",
        progress.games_played,
        progress.total_score,
        progress.best_score,
        progress.best_combo,
        progress.golden_numbers_hit,
        progress.power_ups_collected,
    );
    println!(
        "last {} rounds: average score {} | average accuracy {}%",
        summary.rounds, summary.average_score, summary.average_accuracy_percent
    );
    Ok(())
}

fn resolve_session(args: SimulateArgs) -> Result<Session> {
    let file = args
        .config
        .as_deref()
        .map(RoundFile::load)
        .transpose()?
        .unwrap_or_default();

    let difficulty = args
        .difficulty
        .map(Difficulty::from)
        .or(file.difficulty)
        .unwrap_or(Difficulty::Medium);
    let mode = args
        .mode
        .map(RoundMode::from)
        .or(file.mode)
        .unwrap_or(RoundMode::Timed);

    let mut config = file.round.apply(RoundConfig::preset(difficulty, mode));
    if let Some(duration) = args.duration {
        config.round_duration_seconds = duration;
    }
    config.validate().context("round configuration rejected")?;

    let profile = BotProfile {
        reaction: Duration::from_millis(
            args.reaction_ms
                .or(file.bot.reaction_ms)
                .unwrap_or(DEFAULT_REACTION_MS),
        ),
        hit_accuracy: args
            .hit_accuracy
            .or(file.bot.hit_accuracy)
            .unwrap_or(DEFAULT_HIT_ACCURACY),
        false_tap_rate: args
            .false_tap_rate
            .or(file.bot.false_tap_rate)
            .unwrap_or(DEFAULT_FALSE_TAP_RATE),
    };
    for (name, value) in [
        ("hit accuracy", profile.hit_accuracy),
        ("false tap rate", profile.false_tap_rate),
    ] {
        if !(0.0..=1.0).contains(&value) {
            bail!("{name} must lie in [0, 1], found {value}");
        }
    }

    if args.frame_ms == 0 {
        bail!("frame length must be positive");
    }

    Ok(Session {
        config,
        profile,
        frame: Duration::from_millis(args.frame_ms),
        practice_limit: Duration::from_secs(args.practice_seconds),
        sound: !args.mute,
    })
}

fn play_round(
    session: &Session,
    seed: u64,
    store: InMemoryProgressStore,
) -> Result<(GameStats, InMemoryProgressStore)> {
    let mut engine = RoundEngine::new(RandomDigits::from_seed(seed), store, TracingEmitter)
        .with_sound(session.sound);
    engine
        .start(session.config.clone(), now())
        .context("failed to start round")?;

    let mut bot = Bot::new(session.profile, seed ^ BOT_SEED_SALT);
    let mut played = Duration::ZERO;
    let mut tap = bot.observe(engine.snapshot().round.current_number, Duration::ZERO);

    loop {
        if tap {
            if let Err(reason) = engine.tap() {
                debug!(%reason, "bot tap ignored");
            }
        }

        engine.advance(session.frame);
        played = played.saturating_add(session.frame);

        let snapshot = engine.snapshot();
        if snapshot.round.phase == RoundPhase::Ended {
            break;
        }
        if session.config.mode == RoundMode::Practice && played >= session.practice_limit {
            let _ = engine.end().context("failed to end practice round")?;
            break;
        }
        tap = bot.observe(snapshot.round.current_number, session.frame);
    }

    let stats = engine
        .stats()
        .cloned()
        .context("round finished without statistics")?;
    let (store, _) = engine.into_parts();
    Ok((stats, store))
}

fn print_stats(index: u32, stats: &GameStats) {
    println!(
        "round {index}: score {} | max combo {} | hits {} | misses {} | accuracy {:.0}% | {} {}",
        stats.score,
        stats.max_combo,
        stats.hits,
        stats.misses,
        stats.accuracy * 100.0,
        stats.difficulty,
        stats.mode,
    );
}

fn print_presets() {
    println!("difficulty | initial ms | min ms | speed | p start | p min");
    for difficulty in Difficulty::ALL {
        let preset = RoundConfig::preset(difficulty, RoundMode::Timed);
        println!(
            "{:<10} | {:>10} | {:>6} | {:>5} | {:>7} | {:>5}",
            difficulty.label(),
            preset.initial_spawn_interval_ms,
            preset.min_spawn_interval_ms,
            preset.spawn_speed_multiplier,
            preset.target_probability_start,
            preset.target_probability_min,
        );
    }
}

fn now() -> Timestamp {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default();
    Timestamp::from_millis(millis)
}
