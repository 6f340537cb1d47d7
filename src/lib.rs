//! Tile Merge - a 2048-style sliding tile game
//!
//! Core modules:
//! - `engine`: Deterministic grid engine (sliding, merging, score, win/game over)
//! - `settings`: Game configuration
//! - `records`: Best-score record persisted to LocalStorage
//! - `input`: Keyboard/swipe translation into move directions
//! - `error`: Error type shared by the modules above

pub mod engine;
pub mod error;
pub mod input;
pub mod records;
pub mod settings;

pub use engine::{Direction, Game, Grid, MoveOutcome, SpawnedTile};
pub use error::{GameError, Result};
pub use records::GameRecord;
pub use settings::GameConfig;

/// Game configuration constants
pub mod consts {
    /// Grid side length used by every shipped variant
    pub const DEFAULT_SIZE: usize = 4;
    /// Smallest grid that can still hold two starting tiles and a move
    pub const MIN_SIZE: usize = 2;

    /// Largest tile a merge may produce; keeps every value and its double in u32
    pub const MAX_TILE: u32 = 1 << 30;

    /// Tile value whose first appearance wins the game
    pub const WIN_TILE: u32 = 2048;

    /// Chance a spawned tile is a 2 (otherwise a 4)
    pub const TWO_PROBABILITY: f64 = 0.9;

    /// Tiles placed on a fresh grid
    pub const STARTING_TILES: usize = 2;

    /// Minimum travel (CSS pixels) before a touch counts as a swipe
    pub const MIN_SWIPE_DISTANCE: f32 = 30.0;
}

/// Returns true for a legal tile value (a power of two in `2..=MAX_TILE`)
#[inline]
pub fn is_tile_value(value: u32) -> bool {
    (2..=consts::MAX_TILE).contains(&value) && value.is_power_of_two()
}
