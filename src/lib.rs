//! Minesweeper board engine: deferred first-click-safe mine placement,
//! neighbor-mine counting, flood-fill reveal, and the win/loss state machine.
//!
//! Presentation, input translation, and sound are external collaborators;
//! they drive a [`GameSession`] through `reveal`/`toggle_flag` intents and
//! observe the [`GameEvent`] stream it queues in return.

use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use cell::*;
pub use error::*;
pub use event::*;
pub use generator::*;
pub use scores::*;
pub use session::*;
pub use types::*;

mod cell;
mod error;
mod event;
mod generator;
mod scores;
mod session;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub rows: Coord,
    pub cols: Coord,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(rows: Coord, cols: Coord, mines: CellCount) -> Self {
        Self { rows, cols, mines }
    }

    pub fn new(rows: Coord, cols: Coord, mines: CellCount) -> Result<Self> {
        Self::new_unchecked(rows, cols, mines).validate()
    }

    /// Rejects impossible configurations before any placement attempt: the
    /// rejection-sampling loop only terminates when a safe cell exists.
    pub fn validate(self) -> Result<Self> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GameError::EmptyGrid);
        }
        if self.mines >= self.total_cells() {
            return Err(GameError::TooManyMines);
        }
        Ok(self)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.rows, self.cols)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells() - self.mines
    }

    pub const fn size(&self) -> (Coord, Coord) {
        (self.rows, self.cols)
    }
}

/// Standard difficulty tiers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Expert,
}

impl Difficulty {
    pub const fn config(self) -> GameConfig {
        match self {
            Self::Beginner => GameConfig::new_unchecked(9, 9, 10),
            Self::Intermediate => GameConfig::new_unchecked(16, 16, 40),
            Self::Expert => GameConfig::new_unchecked(16, 30, 99),
        }
    }
}

/// Mine positions for one game, with neighbor-mine counts cached for every
/// safe cell at construction time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineField {
    mines: Array2<bool>,
    counts: Array2<u8>,
    mine_count: CellCount,
}

impl MineField {
    pub fn from_mine_mask(mines: Array2<bool>) -> Self {
        let mine_count = mines
            .iter()
            .filter(|&&is_mine| is_mine)
            .count()
            .try_into()
            .unwrap();

        let dim = mines.dim();
        let cols: Coord = dim.1.try_into().unwrap();
        let total: CellCount = mines.len().try_into().unwrap();

        let mut counts: Array2<u8> = Array2::default(dim);
        for index in 0..total {
            if mines[to_nd(index, cols)] {
                continue;
            }
            counts[to_nd(index, cols)] = mines
                .iter_neighbors(index)
                .filter(|&pos| mines[to_nd(pos, cols)])
                .count()
                .try_into()
                .unwrap();
        }

        Self {
            mines,
            counts,
            mine_count,
        }
    }

    pub fn from_mine_indices(rows: Coord, cols: Coord, mine_indices: &[CellIndex]) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(GameError::EmptyGrid);
        }

        let mut mines: Array2<bool> = Array2::default((rows as usize, cols as usize));
        for &index in mine_indices {
            if index >= mult(rows, cols) {
                return Err(GameError::InvalidIndex);
            }
            mines[to_nd(index, cols)] = true;
        }

        Ok(Self::from_mine_mask(mines))
    }

    pub fn game_config(&self) -> GameConfig {
        let (rows, cols) = self.size();
        GameConfig {
            rows,
            cols,
            mines: self.mine_count,
        }
    }

    pub fn validate_index(&self, index: CellIndex) -> Result<CellIndex> {
        if index < self.total_cells() {
            Ok(index)
        } else {
            Err(GameError::InvalidIndex)
        }
    }

    pub fn size(&self) -> (Coord, Coord) {
        let dim = self.mines.dim();
        (dim.0.try_into().unwrap(), dim.1.try_into().unwrap())
    }

    pub fn cols(&self) -> Coord {
        self.size().1
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn total_cells(&self) -> CellCount {
        self.mines.len().try_into().unwrap()
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, index: CellIndex) -> bool {
        self[index]
    }

    /// Cached count of mined neighbors; zero (and meaningless) for mine cells.
    pub fn neighbor_mine_count(&self, index: CellIndex) -> u8 {
        self.counts[to_nd(index, self.cols())]
    }

    pub(crate) fn iter_neighbors(&self, index: CellIndex) -> NeighborIter {
        self.mines.iter_neighbors(index)
    }
}

impl Index<CellIndex> for MineField {
    type Output = bool;

    fn index(&self, index: CellIndex) -> &Self::Output {
        &self.mines[to_nd(index, self.cols())]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlagOutcome {
    NoChange,
    Changed,
}

impl FlagOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    Exploded,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            Exploded => true,
            Won => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_presets_match_standard_tiers() {
        assert_eq!(
            Difficulty::Beginner.config(),
            GameConfig::new_unchecked(9, 9, 10)
        );
        assert_eq!(
            Difficulty::Intermediate.config(),
            GameConfig::new_unchecked(16, 16, 40)
        );
        assert_eq!(
            Difficulty::Expert.config(),
            GameConfig::new_unchecked(16, 30, 99)
        );
        for difficulty in [
            Difficulty::Beginner,
            Difficulty::Intermediate,
            Difficulty::Expert,
        ] {
            assert!(difficulty.config().validate().is_ok());
        }
    }

    #[test]
    fn config_rejects_full_board() {
        assert_eq!(GameConfig::new(5, 5, 25), Err(GameError::TooManyMines));
        assert_eq!(GameConfig::new(5, 5, 30), Err(GameError::TooManyMines));
        assert!(GameConfig::new(5, 5, 24).is_ok());
    }

    #[test]
    fn config_rejects_empty_grid() {
        assert_eq!(GameConfig::new(0, 5, 1), Err(GameError::EmptyGrid));
        assert_eq!(GameConfig::new(5, 0, 1), Err(GameError::EmptyGrid));
    }

    #[test]
    fn neighbor_counts_match_adjacent_mines() {
        // Mines in opposite corners of a 3x3 grid.
        let field = MineField::from_mine_indices(3, 3, &[0, 8]).unwrap();

        assert_eq!(field.mine_count(), 2);
        assert_eq!(field.safe_cell_count(), 7);
        assert_eq!(field.neighbor_mine_count(4), 2);
        assert_eq!(field.neighbor_mine_count(1), 1);
        assert_eq!(field.neighbor_mine_count(3), 1);
        assert_eq!(field.neighbor_mine_count(5), 1);
        assert_eq!(field.neighbor_mine_count(7), 1);
        assert_eq!(field.neighbor_mine_count(2), 0);
        assert_eq!(field.neighbor_mine_count(6), 0);
    }

    #[test]
    fn counts_agree_with_adjacency_on_every_safe_cell() {
        let field = MineField::from_mine_indices(4, 6, &[0, 7, 9, 15, 22]).unwrap();

        for index in 0..field.total_cells() {
            if field.contains_mine(index) {
                continue;
            }
            let expected = field
                .iter_neighbors(index)
                .filter(|&pos| field.contains_mine(pos))
                .count() as u8;
            assert_eq!(field.neighbor_mine_count(index), expected, "cell {index}");
        }
    }

    #[test]
    fn mine_indices_out_of_range_are_rejected() {
        assert_eq!(
            MineField::from_mine_indices(3, 3, &[9]),
            Err(GameError::InvalidIndex)
        );
    }
}
