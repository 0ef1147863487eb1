use ndarray::Array2;
use rand::prelude::*;

use crate::*;

/// Builds the mine layout for one game session.
pub trait MineFieldGenerator {
    fn generate(self, config: GameConfig) -> MineField;
}

/// Rejection-sampling placement: draws uniform cell indices and keeps the
/// ones that are not already mined and not the excluded first-move cell.
///
/// `GameConfig::validate` guarantees at least one safe cell, so the loop
/// always terminates; the expected number of draws stays small for the
/// supported presets.
#[derive(Clone, Debug, PartialEq)]
pub struct RejectionPlacer {
    seed: u64,
    exclude: CellIndex,
}

impl RejectionPlacer {
    pub fn new(seed: u64, exclude: CellIndex) -> Self {
        Self { seed, exclude }
    }
}

impl MineFieldGenerator for RejectionPlacer {
    fn generate(self, config: GameConfig) -> MineField {
        let total = config.total_cells();
        debug_assert!(config.mines < total, "config must be validated up front");

        let mut mines: Array2<bool> =
            Array2::default((config.rows as usize, config.cols as usize));
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut placed: CellCount = 0;

        while placed < config.mines {
            let index: CellIndex = rng.random_range(0..total);
            if index == self.exclude || mines[to_nd(index, config.cols)] {
                continue;
            }
            mines[to_nd(index, config.cols)] = true;
            placed += 1;
        }

        log::debug!("placed {} mines, excluded index {}", placed, self.exclude);
        MineField::from_mine_mask(mines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excluded_index_is_never_a_mine() {
        let config = Difficulty::Beginner.config();
        for seed in 0..64 {
            let field = RejectionPlacer::new(seed, 40).generate(config);
            assert!(!field.contains_mine(40), "seed {seed}");
        }
    }

    #[test]
    fn exactly_the_requested_mines_are_placed() {
        for seed in 0..16 {
            let config = Difficulty::Expert.config();
            let field = RejectionPlacer::new(seed, 0).generate(config);
            assert_eq!(field.mine_count(), config.mines);

            let counted = (0..field.total_cells())
                .filter(|&index| field.contains_mine(index))
                .count() as CellCount;
            assert_eq!(counted, config.mines);
        }
    }

    #[test]
    fn same_seed_reproduces_the_same_field() {
        let config = Difficulty::Intermediate.config();
        let a = RejectionPlacer::new(7, 12).generate(config);
        let b = RejectionPlacer::new(7, 12).generate(config);
        assert_eq!(a, b);
    }

    #[test]
    fn dense_config_with_one_safe_cell_terminates() {
        let config = GameConfig::new(2, 2, 3).unwrap();
        let field = RejectionPlacer::new(3, 2).generate(config);
        assert_eq!(field.mine_count(), 3);
        assert!(!field.contains_mine(2));
    }
}
