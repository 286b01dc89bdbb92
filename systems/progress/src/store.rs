//! Progress persistence over an external key-value collaborator.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use six_seven_core::GameStats;
use thiserror::Error;

use crate::{GameHistory, PlayerProgress};

/// Key of the single record holding [`PlayerProgress`] and [`GameHistory`].
pub const PROGRESS_KEY: &str = "six_seven.progress";

/// Failures reported by progress stores.
#[derive(Debug, Error)]
pub enum ProgressError {
    /// The backing store could not be read or written.
    #[error("progress backend unavailable: {0}")]
    Backend(String),
    /// A stored record could not be encoded or decoded.
    #[error("stored record `{key}` is malformed")]
    Codec {
        /// Key of the offending record.
        key: &'static str,
        /// Underlying codec failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Durable home for cumulative progress and round history.
pub trait ProgressStore {
    /// Appends a finished round to the history and aggregates.
    fn record_round(&mut self, stats: &GameStats) -> Result<(), ProgressError>;

    /// Counts one golden target hit.
    fn record_golden(&mut self) -> Result<(), ProgressError>;

    /// Counts one collected power-up.
    fn record_power_up(&mut self) -> Result<(), ProgressError>;

    /// Current aggregates.
    fn progress(&self) -> Result<PlayerProgress, ProgressError>;

    /// Recorded rounds, newest first.
    fn history(&self) -> Result<GameHistory, ProgressError>;
}

/// String key-value storage, such as browser local storage or a settings file.
pub trait KeyValueStore {
    /// Reads the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, ProgressError>;

    /// Replaces the value stored under `key`.
    fn set(&mut self, key: &str, value: String) -> Result<(), ProgressError>;
}

/// Key-value storage held in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryKeyValue {
    entries: HashMap<String, String>,
    read_only: bool,
}

impl MemoryKeyValue {
    /// Creates storage that rejects every write.
    #[must_use]
    pub fn read_only() -> Self {
        Self {
            entries: HashMap::new(),
            read_only: true,
        }
    }
}

impl KeyValueStore for MemoryKeyValue {
    fn get(&self, key: &str) -> Result<Option<String>, ProgressError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), ProgressError> {
        if self.read_only {
            return Err(ProgressError::Backend(format!("`{key}` is read-only")));
        }
        let _ = self.entries.insert(key.to_owned(), value);
        Ok(())
    }
}

/// Aggregates and history written together, so one write updates both.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct ProgressRecord {
    progress: PlayerProgress,
    history: GameHistory,
}

/// [`ProgressStore`] that keeps a JSON record in a [`KeyValueStore`].
#[derive(Clone, Debug, Default)]
pub struct KeyValueProgressStore<S> {
    backend: S,
}

/// Progress store backed by process memory.
pub type InMemoryProgressStore = KeyValueProgressStore<MemoryKeyValue>;

impl<S: KeyValueStore> KeyValueProgressStore<S> {
    /// Wraps the provided backend.
    #[must_use]
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Returns the backend.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.backend
    }

    fn load(&self) -> Result<ProgressRecord, ProgressError> {
        let Some(raw) = self.backend.get(PROGRESS_KEY)? else {
            return Ok(ProgressRecord::default());
        };
        serde_json::from_str(&raw).map_err(|source| ProgressError::Codec {
            key: PROGRESS_KEY,
            source,
        })
    }

    fn update(&mut self, update: impl FnOnce(&mut ProgressRecord)) -> Result<(), ProgressError> {
        let mut record = self.load()?;
        update(&mut record);
        let raw = serde_json::to_string(&record).map_err(|source| ProgressError::Codec {
            key: PROGRESS_KEY,
            source,
        })?;
        self.backend.set(PROGRESS_KEY, raw)
    }
}

impl<S: KeyValueStore> ProgressStore for KeyValueProgressStore<S> {
    fn record_round(&mut self, stats: &GameStats) -> Result<(), ProgressError> {
        self.update(|record| {
            record.history.push(stats.clone());
            record.progress.record_round(stats);
        })
    }

    fn record_golden(&mut self) -> Result<(), ProgressError> {
        self.update(|record| {
            let progress = &mut record.progress;
            progress.golden_numbers_hit = progress.golden_numbers_hit.saturating_add(1);
        })
    }

    fn record_power_up(&mut self) -> Result<(), ProgressError> {
        self.update(|record| {
            let progress = &mut record.progress;
            progress.power_ups_collected = progress.power_ups_collected.saturating_add(1);
        })
    }

    fn progress(&self) -> Result<PlayerProgress, ProgressError> {
        self.load().map(|record| record.progress)
    }

    fn history(&self) -> Result<GameHistory, ProgressError> {
        self.load().map(|record| record.history)
    }
}
