//! TOML configuration for the command-line adapter.

use std::{fs, io::ErrorKind, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use mashimashi_rush_core::ROUND_DURATION;
use mashimashi_rush_system_order_generation::GenerationTuning;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Settings read from the configuration file before command-line overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct CliConfig {
    /// Countdown length for a game in seconds.
    pub(crate) round_seconds: u64,
    /// Seed for reproducible order sequences; entropy is used when absent.
    pub(crate) seed: Option<u64>,
    /// Probability tables and phrases used by the order generator.
    pub(crate) tuning: GenerationTuning,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            round_seconds: ROUND_DURATION.as_secs(),
            seed: None,
            tuning: GenerationTuning::default(),
        }
    }
}

impl CliConfig {
    /// Loads the configuration at `path`, falling back to defaults when the file does not exist.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(error) => {
                return Err(error)
                    .with_context(|| format!("failed to read config {}", path.display()))
            }
        };

        Self::parse(&contents).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Parses and validates configuration text.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse config toml contents")?;
        if config.round_seconds == 0 {
            bail!("round_seconds must be at least 1");
        }
        config
            .tuning
            .validate()
            .context("generation tuning is inconsistent")?;
        Ok(config)
    }

    /// Countdown length as a duration.
    pub(crate) fn round_duration(&self) -> Duration {
        Duration::from_secs(self.round_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = CliConfig::parse("").expect("parse");
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.round_duration(), Duration::from_secs(60));
    }

    #[test]
    fn partial_tuning_overrides_keep_remaining_defaults() {
        let config = CliConfig::parse(
            r#"
            seed = 7
            round_seconds = 30

            [tuning]
            special_chance = 0.25
            "#,
        )
        .expect("parse");

        assert_eq!(config.seed, Some(7));
        assert_eq!(config.round_seconds, 30);
        assert!((config.tuning.special_chance - 0.25).abs() < f64::EPSILON);
        assert_eq!(config.tuning.as_is_phrase, "そのまま");
        assert_eq!(config.tuning.yasai, GenerationTuning::default().yasai);
    }

    #[test]
    fn topping_tables_can_be_replaced() {
        let config = CliConfig::parse(
            r#"
            [[tuning.abura]]
            upper_bound = 0.5
            level = 0

            [[tuning.abura]]
            upper_bound = 1.0
            level = 2
            phrase = "アブラマシ"
            "#,
        )
        .expect("parse");

        let entries = config.tuning.abura.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].phrase.as_deref(), Some("アブラマシ"));
    }

    #[test]
    fn rejects_levels_above_three() {
        let error = CliConfig::parse(
            r#"
            [[tuning.yasai]]
            upper_bound = 1.0
            level = 4
            "#,
        )
        .expect_err("level 4 should be rejected");
        assert!(format!("{error:#}").contains("parse"));
    }

    #[test]
    fn rejects_inconsistent_tuning() {
        let error = CliConfig::parse(
            r#"
            [[tuning.ninniku]]
            upper_bound = 0.6
            level = 1
            phrase = "ニンニク"
            "#,
        )
        .expect_err("incomplete table should be rejected");
        assert!(format!("{error:#}").contains("instead of 1.0"));
    }

    #[test]
    fn rejects_zero_length_rounds() {
        assert!(CliConfig::parse("round_seconds = 0").is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("mashimashi-rush-missing-config.toml");
        let _ = fs::remove_file(&path);
        let config = CliConfig::load(&path).expect("load");
        assert_eq!(config, CliConfig::default());
    }
}
