//! Game configuration
//!
//! Every shipped variant plays on a 4x4 grid with 90/10 spawn odds and a 2048
//! win tile; the values stay configurable so hosts can offer other sizes.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{GameError, Result};
use crate::is_tile_value;

/// Tunable rules for a game session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    /// Grid side length (N for an NxN grid)
    pub size: usize,
    /// Merged value that sets the sticky win flag
    pub win_tile: u32,
    /// Chance a spawned tile is a 2 rather than a 4
    pub two_probability: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            win_tile: WIN_TILE,
            two_probability: TWO_PROBABILITY,
        }
    }
}

impl GameConfig {
    /// Default rules on an NxN grid
    pub fn with_size(size: usize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Parse a config from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the rules describe a playable game
    pub fn validate(&self) -> Result<()> {
        if self.size < MIN_SIZE {
            return Err(GameError::GridTooSmall(self.size));
        }
        // A 2+2 merge must be able to reach the win tile
        if !is_tile_value(self.win_tile) || self.win_tile < 4 {
            return Err(GameError::InvalidConfig(format!(
                "win tile {} is not a power of two in 4..={}",
                self.win_tile,
                crate::consts::MAX_TILE
            )));
        }
        if !(0.0..=1.0).contains(&self.two_probability) {
            return Err(GameError::InvalidConfig(format!(
                "two probability {} is outside [0, 1]",
                self.two_probability
            )));
        }
        Ok(())
    }
}
