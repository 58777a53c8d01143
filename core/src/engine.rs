use alloc::collections::{BTreeSet, VecDeque};
use alloc::{vec, vec::Vec};
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use serde::{Deserialize, Serialize};

use crate::*;

static NEXT_GAME_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a round.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GameId(u64);

impl GameId {
    fn next() -> Self {
        Self(NEXT_GAME_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    InProgress,
    Won,
    Lost,
}

impl GameStatus {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for GameStatus {
    fn default() -> Self {
        Self::InProgress
    }
}

/// A round from mine seeding to win or loss.
///
/// Every mutating operation ends with [`Game::refresh_status`], so `status` and `flagged_count` always
/// reflect the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Game {
    id: GameId,
    config: GameConfig,
    grid: Grid,
    status: GameStatus,
    flagged_count: CellCount,
}

impl Game {
    /// Allocates the grid and scatters the configured mines using `rng`.
    pub fn new<R: Rng + ?Sized>(config: GameConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        let mut grid = Grid::new(config.size());
        grid.seed_mines(config.mine_count, rng);
        Ok(Self::from_grid(config, grid))
    }

    /// Same as [`Game::new`] with a reproducible board for `seed`.
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self> {
        let mut rng = SmallRng::seed_from_u64(seed);
        Self::new(config, &mut rng)
    }

    /// Builds a game with mines at exactly `mines`, duplicates count once.
    pub fn from_mine_positions((height, width): Coord2, mines: &[Coord2]) -> Result<Self> {
        let config = GameConfig::new(height, width, 0)?;
        let mut grid = Grid::new(config.size());
        for &coords in mines {
            let coords = grid.validate_coords(coords)?;
            grid.place_mine(coords);
        }
        let config = GameConfig {
            mine_count: grid.mine_count(),
            ..config
        };
        Ok(Self::from_grid(config, grid))
    }

    fn from_grid(config: GameConfig, grid: Grid) -> Self {
        if config.safe_cell_count() == 0 {
            log::warn!(
                "Board is full of mines ({} on {}x{}), nothing is left to reveal",
                config.mine_count,
                config.height,
                config.width
            );
        }

        let mut game = Self {
            id: GameId::next(),
            config,
            grid,
            status: Default::default(),
            flagged_count: 0,
        };
        game.refresh_status();
        log::debug!(
            "Game {} started, {}x{} with {} mines",
            game.id,
            config.height,
            config.width,
            config.mine_count
        );
        game
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn height(&self) -> Coord {
        self.config.height
    }

    pub fn width(&self) -> Coord {
        self.config.width
    }

    pub fn mine_count(&self) -> CellCount {
        self.config.mine_count
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count
    }

    /// How many mines have not been flagged yet, negative when over-flagged
    pub fn mines_left(&self) -> i64 {
        i64::from(self.config.mine_count) - i64::from(self.flagged_count)
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Row-major snapshot of the whole board.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.grid.iter()
    }

    pub fn cell(&self, row: Coord, col: Coord) -> Result<Cell> {
        self.grid.get((row, col)).copied()
    }

    /// Reveals a cell, cascading through blank cells. Returns the revealed cells in reveal order.
    ///
    /// Revealing a mine is not an error, it ends the game with [`GameStatus::Lost`]. An already revealed cell
    /// yields an empty change set.
    pub fn reveal_cell(&mut self, row: Coord, col: Coord) -> Result<Vec<Cell>> {
        let coords = self.grid.validate_coords((row, col))?;
        log::trace!("Game {}: reveal ({}, {})", self.id, row, col);

        if self.grid[coords].is_revealed() {
            return Ok(Vec::new());
        }

        let mut discovered = BTreeSet::new();
        let mut revealed = Vec::new();
        self.cascade_from(coords, &mut discovered, &mut revealed);

        self.refresh_status();
        Ok(revealed)
    }

    /// Chord: reveals every hidden, unflagged neighbor of a revealed cell once enough neighbors are flagged.
    ///
    /// Only the number of flags is checked, a misplaced flag can still lead to a mine being revealed.
    pub fn reveal_adjacent(&mut self, row: Coord, col: Coord) -> Result<Vec<Cell>> {
        let coords = self.grid.validate_coords((row, col))?;
        log::trace!("Game {}: reveal adjacent ({}, {})", self.id, row, col);

        let target = self.grid[coords];
        if !target.is_revealed() {
            return Err(InvalidMove::NotRevealed.into());
        }

        let flagged = self.count_flagged_neighbors(coords);
        let required = target.adjacent_mines();
        if flagged < required {
            return Err(InvalidMove::NotEnoughFlags { flagged, required }.into());
        }

        let mut discovered = BTreeSet::new();
        let mut revealed = Vec::new();
        for pos in self.grid.iter_neighbors(coords) {
            let neighbor = &self.grid[pos];
            if !neighbor.is_revealed() && !neighbor.is_flagged() {
                self.cascade_from(pos, &mut discovered, &mut revealed);
            }
        }

        self.refresh_status();
        Ok(revealed)
    }

    pub fn flag(&mut self, row: Coord, col: Coord) -> Result<Vec<Cell>> {
        self.set_flag((row, col), true)
    }

    pub fn unflag(&mut self, row: Coord, col: Coord) -> Result<Vec<Cell>> {
        self.set_flag((row, col), false)
    }

    pub fn toggle_flag(&mut self, row: Coord, col: Coord) -> Result<Vec<Cell>> {
        let coords = self.grid.validate_coords((row, col))?;
        log::trace!("Game {}: toggle flag ({}, {})", self.id, row, col);

        self.grid[coords].toggle_flag()?;
        let cell = self.grid[coords];

        self.refresh_status();
        Ok(vec![cell])
    }

    /// Recomputes status and flag count from the grid in a single scan.
    pub fn refresh_status(&mut self) -> GameStatus {
        let mut revealed_count: CellCount = 0;
        let mut flagged_count: CellCount = 0;
        let mut hit_mine = false;

        for cell in self.grid.iter() {
            if cell.is_revealed() {
                revealed_count += 1;
                hit_mine |= cell.is_mine();
            } else if cell.is_flagged() {
                flagged_count += 1;
            }
        }

        let status = if hit_mine {
            GameStatus::Lost
        } else if revealed_count + self.config.mine_count == self.grid.total_cells() {
            GameStatus::Won
        } else {
            GameStatus::InProgress
        };

        if status != self.status {
            log::debug!("Game {}: {:?} -> {:?}", self.id, self.status, status);
        }
        self.status = status;
        self.flagged_count = flagged_count;
        status
    }

    fn set_flag(&mut self, coords: Coord2, flagged: bool) -> Result<Vec<Cell>> {
        let coords = self.grid.validate_coords(coords)?;
        log::trace!(
            "Game {}: {} ({}, {})",
            self.id,
            if flagged { "flag" } else { "unflag" },
            coords.0,
            coords.1
        );

        let cell = &mut self.grid[coords];
        if cell.is_flagged() == flagged && !cell.is_revealed() {
            return Ok(Vec::new());
        }
        cell.set_flagged(flagged)?;
        let cell = *cell;

        self.refresh_status();
        Ok(vec![cell])
    }

    /// Breadth-first reveal starting at `start`.
    ///
    /// `start` is revealed unconditionally. Blank cells enqueue their hidden neighbors, flagged cells are never
    /// enqueued. `discovered` may be shared between calls so a chord visits each cell once.
    fn cascade_from(
        &mut self,
        start: Coord2,
        discovered: &mut BTreeSet<Coord2>,
        revealed: &mut Vec<Cell>,
    ) {
        if !discovered.insert(start) {
            return;
        }

        let mut to_visit = VecDeque::from([start]);
        while let Some(coords) = to_visit.pop_front() {
            let cell = &mut self.grid[coords];
            cell.reveal();
            let cell = *cell;
            revealed.push(cell);

            if !cell.is_blank() {
                continue;
            }

            for pos in self.grid.iter_neighbors(coords) {
                let neighbor = &self.grid[pos];
                if !neighbor.is_revealed() && !neighbor.is_flagged() && discovered.insert(pos) {
                    to_visit.push_back(pos);
                }
            }
        }
    }

    fn count_flagged_neighbors(&self, coords: Coord2) -> u8 {
        self.grid
            .iter_neighbors(coords)
            .filter(|&pos| self.grid[pos].is_flagged())
            .count() as u8
    }
}
