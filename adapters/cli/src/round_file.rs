//! TOML overrides for round tuning and the simulated player.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use six_seven_core::{Difficulty, RoundConfig, RoundMode};

/// Contents of a round file; every field is optional.
///
/// ```toml
/// difficulty = "HARD"
/// mode = "practice"
///
/// [round]
/// min_spawn_interval_ms = 300.0
///
/// [bot]
/// reaction_ms = 320
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RoundFile {
    pub(crate) difficulty: Option<Difficulty>,
    pub(crate) mode: Option<RoundMode>,
    #[serde(default)]
    pub(crate) round: RoundOverrides,
    #[serde(default)]
    pub(crate) bot: BotOverrides,
}

/// Field-by-field replacements applied on top of a difficulty preset.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RoundOverrides {
    pub(crate) initial_spawn_interval_ms: Option<f64>,
    pub(crate) min_spawn_interval_ms: Option<f64>,
    pub(crate) spawn_speed_multiplier: Option<f64>,
    pub(crate) target_probability_start: Option<f64>,
    pub(crate) target_probability_min: Option<f64>,
    pub(crate) round_duration_seconds: Option<u32>,
}

/// Replacements for the simulated player's behaviour.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct BotOverrides {
    pub(crate) reaction_ms: Option<u64>,
    pub(crate) hit_accuracy: Option<f64>,
    pub(crate) false_tap_rate: Option<f64>,
}

impl RoundFile {
    /// Reads and parses the round file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read round file at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse round file at {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let file: Self = toml::from_str(contents).context("invalid round file toml")?;
        for (name, value) in [
            ("bot.hit_accuracy", file.bot.hit_accuracy),
            ("bot.false_tap_rate", file.bot.false_tap_rate),
        ] {
            if let Some(value) = value {
                if !(0.0..=1.0).contains(&value) {
                    bail!("{name} must lie in [0, 1], found {value}");
                }
            }
        }
        Ok(file)
    }
}

impl RoundOverrides {
    /// Applies every present override to `config`.
    pub(crate) fn apply(&self, mut config: RoundConfig) -> RoundConfig {
        if let Some(value) = self.initial_spawn_interval_ms {
            config.initial_spawn_interval_ms = value;
        }
        if let Some(value) = self.min_spawn_interval_ms {
            config.min_spawn_interval_ms = value;
        }
        if let Some(value) = self.spawn_speed_multiplier {
            config.spawn_speed_multiplier = value;
        }
        if let Some(value) = self.target_probability_start {
            config.target_probability_start = value;
        }
        if let Some(value) = self.target_probability_min {
            config.target_probability_min = value;
        }
        if let Some(value) = self.round_duration_seconds {
            config.round_duration_seconds = value;
        }
        config
    }
}
