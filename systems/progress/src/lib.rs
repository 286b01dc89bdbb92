#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Cumulative player progress and round history.
//!
//! [`ProgressTracker`] watches round events and forwards the relevant ones to
//! a [`ProgressStore`]. Store failures are logged and swallowed so a broken
//! backend never affects the round.

mod store;

use serde::{Deserialize, Serialize};
use six_seven_core::{Event, GameStats};
use tracing::warn;

pub use store::{
    InMemoryProgressStore, KeyValueProgressStore, KeyValueStore, MemoryKeyValue, ProgressError,
    ProgressStore, PROGRESS_KEY,
};

/// Maximum number of rounds retained in [`GameHistory`].
pub const HISTORY_CAPACITY: usize = 50;

/// Number of most recent rounds summarised by [`GameHistory::summary`].
pub const SUMMARY_WINDOW: usize = 10;

/// Aggregates across every completed round.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProgress {
    /// Completed rounds.
    pub games_played: u32,
    /// Sum of final scores.
    pub total_score: u64,
    /// Sum of target hits.
    pub total_hits: u64,
    /// Highest final score.
    pub best_score: u64,
    /// Longest combo in any round.
    pub best_combo: u32,
    /// Golden targets hit.
    pub golden_numbers_hit: u32,
    /// Power-ups collected.
    pub power_ups_collected: u32,
}

impl PlayerProgress {
    /// Folds a finished round into the aggregates.
    pub fn record_round(&mut self, stats: &GameStats) {
        self.games_played = self.games_played.saturating_add(1);
        self.total_score = self.total_score.saturating_add(stats.score);
        self.total_hits = self.total_hits.saturating_add(u64::from(stats.hits));
        self.best_score = self.best_score.max(stats.score);
        self.best_combo = self.best_combo.max(stats.max_combo);
    }
}

/// Completed rounds, newest first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GameHistory {
    games: Vec<GameStats>,
}

impl GameHistory {
    /// Prepends a finished round, dropping the oldest beyond [`HISTORY_CAPACITY`].
    pub fn push(&mut self, stats: GameStats) {
        self.games.insert(0, stats);
        self.games.truncate(HISTORY_CAPACITY);
    }

    /// Recorded rounds, newest first.
    #[must_use]
    pub fn games(&self) -> &[GameStats] {
        &self.games
    }

    /// Averages over the [`SUMMARY_WINDOW`] most recent rounds.
    #[must_use]
    pub fn summary(&self) -> HistorySummary {
        let recent = &self.games[..self.games.len().min(SUMMARY_WINDOW)];
        if recent.is_empty() {
            return HistorySummary::default();
        }

        let count = recent.len() as f64;
        let score_sum: f64 = recent.iter().map(|game| game.score as f64).sum();
        let accuracy_sum: f64 = recent.iter().map(|game| game.accuracy).sum();

        HistorySummary {
            rounds: recent.len(),
            average_score: (score_sum / count).round() as u64,
            average_accuracy_percent: (accuracy_sum / count * 100.0).round() as u32,
        }
    }
}

/// Averages over recent rounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HistorySummary {
    /// Rounds included in the averages.
    pub rounds: usize,
    /// Mean final score, rounded.
    pub average_score: u64,
    /// Mean accuracy in percent, rounded.
    pub average_accuracy_percent: u32,
}

/// Pure system that forwards progress-relevant events to a store.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    failures: usize,
}

impl ProgressTracker {
    /// Creates a tracker with no recorded failures.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store writes that failed so far.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Consumes world events and records golden hits, power-ups and finished rounds.
    pub fn handle<S>(&mut self, events: &[Event], store: &mut S)
    where
        S: ProgressStore + ?Sized,
    {
        for event in events {
            let result = match event {
                Event::TargetHit { digit, .. } if digit.is_golden() => store.record_golden(),
                Event::PowerUpActivated { .. } => store.record_power_up(),
                Event::RoundEnded { stats } => store.record_round(stats),
                _ => continue,
            };

            if let Err(error) = result {
                self.failures += 1;
                warn!(%error, "progress update dropped");
            }
        }
    }
}
