use core::fmt;

use crate::*;

/// Two-line summary: identifier, then size and flag/mine counts.
#[derive(Copy, Clone, Debug)]
pub struct Header<'a> {
    game: &'a Game,
}

/// Plain-text board, one line per row and three columns per cell.
///
/// Hidden cells show as `.`, flagged hidden cells as `F`, revealed blanks as a space. With `reveal_all` every
/// cell shows what it holds.
#[derive(Copy, Clone, Debug)]
pub struct BoardView<'a> {
    game: &'a Game,
    reveal_all: bool,
}

impl Game {
    pub fn header(&self) -> Header<'_> {
        Header { game: self }
    }

    pub fn board(&self, reveal_all: bool) -> BoardView<'_> {
        BoardView {
            game: self,
            reveal_all,
        }
    }
}

impl fmt::Display for Header<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let game = self.game;
        writeln!(f, "Game {}", game.id())?;
        writeln!(
            f,
            "{}x{}, {}/{} mines",
            game.height(),
            game.width(),
            game.flagged_count(),
            game.mine_count()
        )
    }
}

impl fmt::Display for BoardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let grid = self.game.grid();
        for row in 0..grid.height() {
            for col in 0..grid.width() {
                let cell = &grid[(row, col)];
                if self.reveal_all || cell.is_revealed() {
                    if cell.is_blank() {
                        f.write_str("   ")?;
                    } else {
                        write!(f, " {cell} ")?;
                    }
                } else if cell.is_flagged() {
                    f.write_str(" F ")?;
                } else {
                    f.write_str(" . ")?;
                }
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.header(), self.board(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::{format, string::ToString};

    #[test]
    fn header_lists_size_and_flags() {
        let mut game = Game::from_mine_positions((2, 3), &[(0, 0)]).unwrap();
        game.flag(0, 0).unwrap();

        let header = game.header().to_string();

        assert_eq!(header, format!("Game {}\n2x3, 1/1 mines\n", game.id()));
    }

    #[test]
    fn board_hides_unrevealed_cells() {
        let mut game = Game::from_mine_positions((2, 3), &[(0, 0)]).unwrap();
        game.reveal_cell(1, 1).unwrap();
        game.flag(0, 0).unwrap();

        assert_eq!(game.board(false).to_string(), " F  .  . \n .  1  . \n");
    }

    #[test]
    fn board_reveal_all_shows_mines_and_blanks() {
        let game = Game::from_mine_positions((2, 3), &[(0, 0)]).unwrap();

        assert_eq!(game.board(true).to_string(), " *  1    \n 1  1    \n");
    }

    #[test]
    fn game_display_is_header_then_board() {
        let game = Game::from_mine_positions((1, 2), &[(0, 1)]).unwrap();

        assert_eq!(
            game.to_string(),
            format!("Game {}\n1x2, 0/1 mines\n\n .  . \n", game.id())
        );
    }
}
