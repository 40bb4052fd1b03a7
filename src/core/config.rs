//! Router configuration: tier weights, ladder sizes, and data ranges.
//!
//! Every field has a default, so a RON file only needs the values it
//! changes:
//!
//! ```ron
//! (
//!     high_priority_chance: 35,
//!     off_playa: (algorithmic: 10, year_day: 20, time_of_day: 40, playa: 40),
//! )
//! ```

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Upper edges of the weighted tiers on a 1..=100 roll, checked in order.
/// A roll above `playa` produces no tier-2 candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierBands {
    pub algorithmic: u32,
    pub year_day: u32,
    pub time_of_day: u32,
    pub playa: u32,
}

impl TierBands {
    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        let edges = [self.algorithmic, self.year_day, self.time_of_day, self.playa];
        if edges.windows(2).any(|w| w[0] > w[1]) || self.playa > 100 {
            return Err(ConfigError::Invalid(format!(
                "{name} bands must ascend within 0..=100, got {edges:?}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub on_playa: TierBands,
    pub off_playa: TierBands,
    /// Percent chance that a matching high-priority record is taken.
    pub high_priority_chance: u32,
    /// Draws from the conditional pool before the ladder falls back.
    pub conditional_draws: u32,
    /// Total ladder attempts, conditional draws included.
    pub ladder_limit: u32,
    /// Region id of Black Rock City.
    pub playa_region: u32,
    /// Years with a year-day record.
    pub first_year_file: i32,
    pub last_year_file: i32,
    /// Last year with a high-priority source; the first is `first_year_file`.
    pub last_high_priority_year: i32,
    /// A time-of-day pick gets the hourglass image when a 1..=100 roll is
    /// below this.
    pub time_of_day_image_chance: u32,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            on_playa: TierBands {
                algorithmic: 8,
                year_day: 15,
                time_of_day: 30,
                playa: 50,
            },
            off_playa: TierBands {
                algorithmic: 8,
                year_day: 15,
                time_of_day: 35,
                playa: 35,
            },
            high_priority_chance: 20,
            conditional_draws: 5,
            ladder_limit: 25,
            playa_region: 452,
            first_year_file: 2024,
            last_year_file: 2099,
            last_high_priority_year: 2100,
            time_of_day_image_chance: 40,
        }
    }
}

impl RouterConfig {
    /// Load a configuration from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<RouterConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a configuration from a RON string.
    pub fn parse_ron(input: &str) -> Result<RouterConfig, ConfigError> {
        let config: RouterConfig = ron::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.on_playa.validate("on_playa")?;
        self.off_playa.validate("off_playa")?;
        if self.high_priority_chance > 100 || self.time_of_day_image_chance > 100 {
            return Err(ConfigError::Invalid("chances are percentages".to_string()));
        }
        if self.conditional_draws > self.ladder_limit {
            return Err(ConfigError::Invalid(format!(
                "conditional_draws ({}) exceeds ladder_limit ({})",
                self.conditional_draws, self.ladder_limit
            )));
        }
        if self.first_year_file > self.last_year_file
            || self.last_year_file > self.last_high_priority_year
        {
            return Err(ConfigError::Invalid("year ranges out of order".to_string()));
        }
        Ok(())
    }

    pub fn bands(&self, on_playa: bool) -> &TierBands {
        if on_playa {
            &self.on_playa
        } else {
            &self.off_playa
        }
    }

    pub fn year_files(&self) -> RangeInclusive<i32> {
        self.first_year_file..=self.last_year_file
    }

    pub fn high_priority_years(&self) -> RangeInclusive<i32> {
        self.first_year_file..=self.last_high_priority_year
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ron_gives_defaults() {
        let config = RouterConfig::parse_ron("()").unwrap();
        assert_eq!(config, RouterConfig::default());
        assert_eq!(config.bands(true).playa, 50);
        assert_eq!(config.bands(false).time_of_day, 35);
        assert!(config.year_files().contains(&2099));
        assert!(!config.year_files().contains(&2100));
        assert!(config.high_priority_years().contains(&2100));
    }

    #[test]
    fn partial_override() {
        let config = RouterConfig::parse_ron(
            "(high_priority_chance: 100, off_playa: (algorithmic: 0, year_day: 0, time_of_day: 100, playa: 100))",
        )
        .unwrap();
        assert_eq!(config.high_priority_chance, 100);
        assert_eq!(config.off_playa.time_of_day, 100);
        assert_eq!(config.ladder_limit, 25);
    }

    #[test]
    fn rejects_descending_bands() {
        let err = RouterConfig::parse_ron(
            "(on_playa: (algorithmic: 50, year_day: 15, time_of_day: 30, playa: 50))",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_oversized_conditional_run() {
        let err = RouterConfig::parse_ron("(conditional_draws: 30)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_ron_is_an_error() {
        assert!(matches!(
            RouterConfig::parse_ron("(ladder_limit: \"many\")"),
            Err(ConfigError::Ron(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("router.ron");
        std::fs::write(&path, "(playa_region: 7)").unwrap();
        assert_eq!(RouterConfig::load_from_ron(&path).unwrap().playa_region, 7);
        assert!(matches!(
            RouterConfig::load_from_ron(&dir.path().join("missing.ron")),
            Err(ConfigError::Io(_))
        ));
    }
}
