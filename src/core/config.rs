//! Simulation configuration with documented constants
//!
//! All tunable numbers are collected here. A config can be built in code,
//! taken from `Default`, or read from a TOML file where every section is optional.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{ColoniesError, Result};
use crate::core::types::PlayerId;
use crate::net::NetworkRole;

/// Hex lattice dimensions (world units)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Horizontal distance between neighbouring tile centers on one row
    pub tile_width: f32,

    /// Vertical distance between rows (three quarters of a tile sprite height)
    ///
    /// With `row_height = tile_width * sqrt(3) / 2` every neighbour sits exactly one
    /// tile width away, which keeps the straight-line heuristic admissible whenever
    /// terrain costs are at least one tile width.
    pub row_height: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            tile_width: 1.0,
            row_height: 3.0_f32.sqrt() / 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathingConfig {
    /// Expansions each in-flight search performs per tick
    pub steps_per_tick: u32,
}

impl Default for PathingConfig {
    fn default() -> Self {
        Self { steps_per_tick: 1 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Seconds between two damage exchanges
    pub exchange_interval: f32,

    /// Lower bound of the damage roll as a fraction of effective attack
    pub roll_low: f32,

    /// Upper bound of the damage roll as a fraction of effective attack
    pub roll_high: f32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            exchange_interval: 1.0,
            roll_low: 0.5,
            roll_high: 1.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    /// Seconds between two spawn rolls of a food spawner
    pub interval: f32,

    /// Value of each spawned food item
    pub food_value: u32,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            interval: 1.0,
            food_value: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub role: NetworkRole,

    /// Player controlled from this process; used for friendly/enemy wording
    pub local_player: PlayerId,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            role: NetworkRole::Offline,
            local_player: PlayerId::RED,
        }
    }
}

/// Configuration for the simulation systems
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub grid: GridConfig,
    pub pathing: PathingConfig,
    pub battle: BattleConfig,
    pub spawner: SpawnerConfig,
    pub network: NetworkConfig,

    /// Seed for the battle and spawner random streams
    pub seed: u64,
}

impl SimConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if !(self.grid.tile_width > 0.0) || !(self.grid.row_height > 0.0) {
            return Err(ColoniesError::InvalidConfig(format!(
                "tile dimensions must be positive (width {}, row height {})",
                self.grid.tile_width, self.grid.row_height
            )));
        }

        if self.pathing.steps_per_tick == 0 {
            return Err(ColoniesError::InvalidConfig(
                "pathing.steps_per_tick must be at least 1".into(),
            ));
        }

        if !(self.battle.exchange_interval > 0.0) {
            return Err(ColoniesError::InvalidConfig(format!(
                "battle.exchange_interval ({}) must be positive",
                self.battle.exchange_interval
            )));
        }

        if self.battle.roll_low < 0.0 || self.battle.roll_low > self.battle.roll_high {
            return Err(ColoniesError::InvalidConfig(format!(
                "damage roll range [{}, {}] is invalid",
                self.battle.roll_low, self.battle.roll_high
            )));
        }

        if !(self.spawner.interval > 0.0) {
            return Err(ColoniesError::InvalidConfig(
                "spawner.interval must be positive".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_neighbour_spacing_is_one_tile() {
        let grid = GridConfig::default();
        let diagonal = ((grid.tile_width / 2.0).powi(2) + grid.row_height.powi(2)).sqrt();
        assert!((diagonal - grid.tile_width).abs() < 1e-5);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimConfig::from_toml_str(
            r#"
            seed = 7

            [battle]
            exchange_interval = 2.0
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, 7);
        assert_eq!(config.battle.exchange_interval, 2.0);
        assert_eq!(config.battle.roll_low, 0.5);
        assert_eq!(config.pathing.steps_per_tick, 1);
    }

    #[test]
    fn test_network_role_from_toml() {
        let config = SimConfig::from_toml_str(
            r#"
            [network]
            role = "host"
            local_player = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.network.role, NetworkRole::Host);
        assert_eq!(config.network.local_player, PlayerId::RED);
    }

    #[test]
    fn test_rejects_zero_steps() {
        let mut config = SimConfig::default();
        config.pathing.steps_per_tick = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_roll_range() {
        let mut config = SimConfig::default();
        config.battle.roll_low = 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let result = SimConfig::from_toml_str("seed = \"not a number\"");
        assert!(matches!(result, Err(ColoniesError::TomlError(_))));
    }
}
