use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Cell index out of range")]
    InvalidIndex,
    #[error("Mine count must leave at least one safe cell")]
    TooManyMines,
    #[error("Grid dimensions must be positive")]
    EmptyGrid,
}

pub type Result<T> = core::result::Result<T, GameError>;
