//! Game settings loaded from `questvale.toml`.

use bracket_lib::prelude::RandomNumberGenerator;
use common::{GameError, GameResult};
use serde::{Deserialize, Serialize};

use crate::input::{InputConfig, KeyBindings};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub name: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            name: "Adventurer".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Fixed RNG seed. Unset means a fresh seed every session.
    pub seed: Option<u64>,
    pub save_path: String,
    /// Number of monsters roaming the map.
    pub monsters: usize,
    pub rest_cost: i32,
    pub colorblind: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            seed: None,
            save_path: crate::SAVE_PATH.to_string(),
            monsters: crate::session::DEFAULT_MONSTERS,
            rest_cost: crate::session::REST_COST,
            colorblind: false,
        }
    }
}

/// Top level configuration file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub player: PlayerConfig,
    pub game: GameSettings,
    pub keys: KeyBindings,
}

impl GameConfig {
    /// Loads configuration from a file if it exists.
    pub fn load(path: &str) -> GameResult<Self> {
        let data = match std::fs::read_to_string(path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no config at {}, using defaults", path);
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        Self::parse(&data)
    }

    /// Parses TOML text, rejecting invalid values.
    pub fn parse(data: &str) -> GameResult<Self> {
        let cfg: Self = toml::from_str(data).map_err(|e| GameError::Config(e.to_string()))?;
        if cfg.game.rest_cost < 0 {
            return Err(GameError::Config("rest_cost must not be negative".into()));
        }
        if cfg.player.name.trim().is_empty() {
            return Err(GameError::Config("player name must not be empty".into()));
        }
        Ok(cfg)
    }

    /// Key codes for the configured bindings.
    pub fn input(&self) -> GameResult<InputConfig> {
        InputConfig::from_bindings(&self.keys)
    }

    /// The session RNG: seeded when a seed is configured.
    pub fn rng(&self) -> RandomNumberGenerator {
        match self.game.seed {
            Some(seed) => RandomNumberGenerator::seeded(seed),
            None => RandomNumberGenerator::new(),
        }
    }
}
