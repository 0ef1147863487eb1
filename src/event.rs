use serde::{Deserialize, Serialize};

use crate::types::{CellCount, CellIndex};

/// Signals emitted by a [`GameSession`](crate::GameSession) for presentation,
/// sound, and score collaborators. Queued per intent and drained by the
/// caller; the engine itself never blocks on them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    CellRevealed {
        index: CellIndex,
        is_mine: bool,
        neighbor_count: u8,
    },
    CellFlagged {
        index: CellIndex,
        flagged: bool,
    },
    MineCounterChanged {
        remaining: CellCount,
    },
    GameWon {
        elapsed_secs: u32,
    },
    GameLost,
}
