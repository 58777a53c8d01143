use alloc::vec;
use core::ops::{Index, IndexMut};
use ndarray::Array2;
use rand::{Rng, seq::SliceRandom};

use crate::*;

/// Cell matrix owned by a game, indexed by `(row, col)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    cells: Array2<Cell>,
}

impl Grid {
    /// Hidden numeric cells with no adjacent mines, each at its own position.
    pub(crate) fn new(size: Coord2) -> Self {
        let cells = Array2::from_shape_fn(size.to_nd_index(), |(row, col)| {
            Cell::new((row as Coord, col as Coord))
        });
        Self { cells }
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.cells.dim();
        (dim.0 as Coord, dim.1 as Coord)
    }

    pub fn height(&self) -> Coord {
        self.size().0
    }

    pub fn width(&self) -> Coord {
        self.size().1
    }

    pub fn total_cells(&self) -> CellCount {
        let (height, width) = self.size();
        mult(height, width)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if in_bounds(coords, self.size()) {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds {
                row: coords.0,
                col: coords.1,
            })
        }
    }

    pub fn get(&self, coords: Coord2) -> Result<&Cell> {
        let coords = self.validate_coords(coords)?;
        Ok(&self[coords])
    }

    /// Row-major iteration over every cell.
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, self.size())
    }

    pub fn mine_count(&self) -> CellCount {
        self.iter().filter(|cell| cell.is_mine()).count() as CellCount
    }

    /// Scatters `mine_count` mines uniformly at random and fills in adjacency counts.
    ///
    /// A pool with one slot per cell gets its first `mine_count` slots marked, then a full Fisher-Yates shuffle
    /// decides placement. Slot `i` maps to the row-major position `(i / width, i % width)`.
    pub(crate) fn seed_mines<R: Rng + ?Sized>(&mut self, mine_count: CellCount, rng: &mut R) {
        let total = self.total_cells() as usize;
        let mine_count = (mine_count as usize).min(total);

        let mut pool = vec![false; total];
        pool[..mine_count].fill(true);
        pool.shuffle(rng);

        let width = self.width() as usize;
        for (slot, _) in pool.iter().enumerate().filter(|&(_, &is_mine)| is_mine) {
            self.place_mine(((slot / width) as Coord, (slot % width) as Coord));
        }
    }

    /// Turns the cell at `coords` into a mine and bumps its neighbors' counts.
    ///
    /// Placing a mine twice is a no-op, returns whether a mine was added.
    pub(crate) fn place_mine(&mut self, coords: Coord2) -> bool {
        if self[coords].is_mine() {
            return false;
        }
        self[coords].make_mine();
        for pos in self.iter_neighbors(coords) {
            self[pos].add_adjacent_mine();
        }
        true
    }
}

impl Index<Coord2> for Grid {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}

impl IndexMut<Coord2> for Grid {
    fn index_mut(&mut self, coords: Coord2) -> &mut Self::Output {
        &mut self.cells[coords.to_nd_index()]
    }
}
