//! Grid engine
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Randomness only through the injected generator
//! - Stable row-major iteration order
//! - No rendering, input or storage dependencies

pub mod direction;
pub mod grid;
pub mod slide;
pub mod state;

pub use direction::Direction;
pub use grid::{EMPTY, Grid};
pub use slide::{LineSlide, slide_line};
pub use state::{Game, MoveOutcome, SpawnedTile};
