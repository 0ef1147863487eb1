use serde::{Deserialize, Serialize};

/// Player-visible state of one grid cell.
///
/// `Exploded`, `Mine`, and `WrongFlag` only appear once the game has ended:
/// the mine that was stepped on, the mines the player never found, and flags
/// placed on safe cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    Hidden,
    Revealed(u8),
    Flagged,
    Exploded,
    Mine,
    WrongFlag,
}

impl CellState {
    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed(_) | Self::Exploded | Self::Mine)
    }

    pub const fn is_flagged(self) -> bool {
        matches!(self, Self::Flagged | Self::WrongFlag)
    }
}

impl Default for CellState {
    fn default() -> Self {
        Self::Hidden
    }
}
