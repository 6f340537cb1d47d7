//! Error type for the engine, configuration and stored records

/// Everything that can go wrong outside a well-typed move
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("invalid direction: {0:?}")]
    InvalidDirection(String),
    #[error("grid size {0} is too small (minimum {min})", min = crate::consts::MIN_SIZE)]
    GridTooSmall(usize),
    #[error("grid size mismatch: expected {expected} cells per line, found {found}")]
    SizeMismatch { expected: usize, found: usize },
    #[error("invalid tile {value} at row {row}, col {col}")]
    InvalidTile { row: usize, col: usize, value: u32 },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
