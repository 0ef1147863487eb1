use ndarray::Array2;

/// Single board axis, used for row/column positions and grid dimensions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Flat cell index into the grid, `row * cols + col`.
pub type CellIndex = u16;

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Splits a flat index into `(row, col)`.
pub const fn split_index(index: CellIndex, cols: Coord) -> (Coord, Coord) {
    let cols = cols as CellIndex;
    ((index / cols) as Coord, (index % cols) as Coord)
}

/// Joins `(row, col)` back into a flat index.
pub const fn join_index(row: Coord, col: Coord, cols: Coord) -> CellIndex {
    (row as CellIndex) * (cols as CellIndex) + (col as CellIndex)
}

/// Maps a flat index to the `[row, col]` form `ndarray` expects.
pub(crate) const fn to_nd(index: CellIndex, cols: Coord) -> [usize; 2] {
    let (row, col) = split_index(index, cols);
    [row as usize, col as usize]
}

pub trait NeighborIterExt {
    fn iter_neighbors(&self, index: CellIndex) -> NeighborIter;
}

impl<T> NeighborIterExt for Array2<T> {
    fn iter_neighbors(&self, index: CellIndex) -> NeighborIter {
        let dim = self.dim();
        let bounds = (dim.0.try_into().unwrap(), dim.1.try_into().unwrap());
        NeighborIter::new(index, bounds)
    }
}

const DISPLACEMENTS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Applies `delta` to `center`, returning a value only when it remains in bounds.
fn apply_delta(
    (row, col): (Coord, Coord),
    (d_row, d_col): (i8, i8),
    (rows, cols): (Coord, Coord),
) -> Option<(Coord, Coord)> {
    let next_row = row.checked_add_signed(d_row)?;
    if next_row >= rows {
        return None;
    }

    let next_col = col.checked_add_signed(d_col)?;
    if next_col >= cols {
        return None;
    }

    Some((next_row, next_col))
}

/// Iterates the up-to-8 in-bounds neighbor indices of a cell.
///
/// The center index must be in range; that is the caller's responsibility.
#[derive(Debug)]
pub struct NeighborIter {
    center: (Coord, Coord),
    bounds: (Coord, Coord),
    step: u8,
}

impl NeighborIter {
    pub(crate) fn new(index: CellIndex, bounds: (Coord, Coord)) -> Self {
        Self {
            center: split_index(index, bounds.1),
            bounds,
            step: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = CellIndex;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if usize::from(self.step) >= DISPLACEMENTS.len() {
                return None;
            }

            let next_item = apply_delta(self.center, DISPLACEMENTS[self.step as usize], self.bounds);
            self.step += 1;

            if let Some((row, col)) = next_item {
                return Some(join_index(row, col, self.bounds.1));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted_neighbors(index: CellIndex, bounds: (Coord, Coord)) -> Vec<CellIndex> {
        let mut out: Vec<_> = NeighborIter::new(index, bounds).collect();
        out.sort_unstable();
        out
    }

    #[test]
    fn index_mapping_round_trips() {
        let cols = 30;
        for index in [0, 1, 29, 30, 433, 479] {
            let (row, col) = split_index(index, cols);
            assert_eq!(join_index(row, col, cols), index);
        }
    }

    #[test]
    fn center_cell_has_eight_neighbors() {
        assert_eq!(sorted_neighbors(4, (3, 3)), vec![0, 1, 2, 3, 5, 6, 7, 8]);
    }

    #[test]
    fn corner_cells_have_three_neighbors() {
        assert_eq!(sorted_neighbors(0, (3, 3)), vec![1, 3, 4]);
        assert_eq!(sorted_neighbors(8, (3, 3)), vec![4, 5, 7]);
    }

    #[test]
    fn edge_cell_has_five_neighbors() {
        assert_eq!(sorted_neighbors(1, (3, 3)), vec![0, 2, 3, 4, 5]);
    }

    #[test]
    fn single_row_grid_has_linear_neighbors() {
        assert_eq!(sorted_neighbors(0, (1, 5)), vec![1]);
        assert_eq!(sorted_neighbors(2, (1, 5)), vec![1, 3]);
        assert_eq!(sorted_neighbors(4, (1, 5)), vec![3]);
    }
}
