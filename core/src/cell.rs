use core::fmt;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    Mine,
    Numeric,
}

impl Default for CellKind {
    fn default() -> Self {
        Self::Numeric
    }
}

/// A single board position as stored by the engine, also handed out as a snapshot in change sets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    row: Coord,
    col: Coord,
    revealed: bool,
    flagged: bool,
    kind: CellKind,
    adjacent_mines: u8,
}

impl Cell {
    pub const fn new((row, col): Coord2) -> Self {
        Self {
            row,
            col,
            revealed: false,
            flagged: false,
            kind: CellKind::Numeric,
            adjacent_mines: 0,
        }
    }

    pub const fn row(&self) -> Coord {
        self.row
    }

    pub const fn col(&self) -> Coord {
        self.col
    }

    pub const fn position(&self) -> Coord2 {
        (self.row, self.col)
    }

    pub const fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub const fn is_flagged(&self) -> bool {
        self.flagged
    }

    pub const fn kind(&self) -> CellKind {
        self.kind
    }

    pub const fn is_mine(&self) -> bool {
        matches!(self.kind, CellKind::Mine)
    }

    /// Number of mines among the neighbors, computed for mines too.
    pub const fn adjacent_mines(&self) -> u8 {
        self.adjacent_mines
    }

    /// A numeric cell with no adjacent mines, the seed of a cascade.
    pub const fn is_blank(&self) -> bool {
        matches!(self.kind, CellKind::Numeric) && self.adjacent_mines == 0
    }

    /// Reveals the cell, dropping any flag on it.
    pub fn reveal(&mut self) {
        self.flagged = false;
        self.revealed = true;
    }

    pub fn toggle_flag(&mut self) -> Result<()> {
        self.set_flagged(!self.flagged)
    }

    pub(crate) fn set_flagged(&mut self, flagged: bool) -> Result<()> {
        if self.revealed {
            return Err(InvalidMove::FlagRevealed.into());
        }
        self.flagged = flagged;
        Ok(())
    }

    pub(crate) fn make_mine(&mut self) {
        self.kind = CellKind::Mine;
    }

    pub(crate) fn add_adjacent_mine(&mut self) {
        self.adjacent_mines += 1;
    }

    /// In-bounds neighbors of this cell on `grid`, ordered NW, N, NE, W, E, SW, S, SE.
    pub fn neighbors<'g>(&self, grid: &'g Grid) -> impl Iterator<Item = &'g Cell> + use<'g> {
        grid.iter_neighbors(self.position()).map(move |pos| &grid[pos])
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            CellKind::Mine => f.write_str("*"),
            CellKind::Numeric => write!(f, "{}", self.adjacent_mines),
        }
    }
}
