use std::collections::BTreeSet;

use proptest::prelude::*;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use sweeper_core::{Cell, CellCount, Coord, Coord2, Game, GameConfig, GameError, GameStatus};

fn config_strategy() -> impl Strategy<Value = GameConfig> {
    (1 as Coord..12, 1 as Coord..12, 0u32..=100).prop_map(|(height, width, percent)| {
        let total = (height as CellCount) * (width as CellCount);
        GameConfig::new(height, width, total * percent / 100).unwrap()
    })
}

fn all_positions(game: &Game) -> impl Iterator<Item = Coord2> + use<> {
    let (height, width) = (game.height(), game.width());
    (0..height).flat_map(move |row| (0..width).map(move |col| (row, col)))
}

fn brute_force_neighbors(game: &Game, (row, col): Coord2) -> Vec<Coord2> {
    let mut neighbors = Vec::new();
    for r in row - 1..=row + 1 {
        for c in col - 1..=col + 1 {
            if (r, c) != (row, col) && r >= 0 && r < game.height() && c >= 0 && c < game.width() {
                neighbors.push((r, c));
            }
        }
    }
    neighbors
}

fn cell(game: &Game, (row, col): Coord2) -> Cell {
    game.cell(row, col).unwrap()
}

/// Blank region connected to `start` plus its numbered rim, ignoring flags.
fn expected_cascade(game: &Game, start: Coord2) -> BTreeSet<Coord2> {
    let mut region = BTreeSet::from([start]);
    let mut stack = vec![start];
    while let Some(pos) = stack.pop() {
        if !cell(game, pos).is_blank() {
            continue;
        }
        for next in brute_force_neighbors(game, pos) {
            if region.insert(next) {
                stack.push(next);
            }
        }
    }
    region
}

/// Applies a random move and checks that nothing but the returned cells changed.
fn random_move(game: &mut Game, rng: &mut SmallRng) {
    let row = rng.random_range(-1..game.height() + 1);
    let col = rng.random_range(-1..game.width() + 1);
    let before = game.clone();
    let result = match rng.random_range(0..5) {
        0 => game.reveal_cell(row, col),
        1 => game.reveal_adjacent(row, col),
        2 => game.flag(row, col),
        3 => game.unflag(row, col),
        _ => game.toggle_flag(row, col),
    };
    match result {
        Ok(changed) => {
            for pos in all_positions(game) {
                let now = cell(game, pos);
                if now != cell(&before, pos) {
                    assert!(changed.contains(&now), "{pos:?} changed but was not reported");
                }
            }
        }
        Err(_) => assert_eq!(*game, before),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn seeding_places_exact_mines_and_counts(config in config_strategy(), seed in any::<u64>()) {
        let game = Game::with_seed(config, seed).unwrap();

        let mines = game.cells().filter(|cell| cell.is_mine()).count() as CellCount;
        prop_assert_eq!(mines, config.mine_count);
        for pos in all_positions(&game) {
            let expected = brute_force_neighbors(&game, pos)
                .into_iter()
                .filter(|&n| cell(&game, n).is_mine())
                .count() as u8;
            prop_assert_eq!(cell(&game, pos).adjacent_mines(), expected);
            prop_assert_eq!(cell(&game, pos).position(), pos);
        }
    }

    #[test]
    fn revealing_a_mine_loses_with_only_that_cell(config in config_strategy(), seed in any::<u64>()) {
        let mut game = Game::with_seed(config, seed).unwrap();
        let mine = game.cells().find(|cell| cell.is_mine()).map(Cell::position);
        prop_assume!(mine.is_some());
        let (row, col) = mine.unwrap();

        let changed = game.reveal_cell(row, col).unwrap();

        prop_assert_eq!(changed.len(), 1);
        prop_assert_eq!(changed[0].position(), (row, col));
        prop_assert_eq!(game.status(), GameStatus::Lost);
    }

    #[test]
    fn blank_reveal_opens_maximal_region(config in config_strategy(), seed in any::<u64>()) {
        let mut game = Game::with_seed(config, seed).unwrap();
        let blank = game.cells().find(|cell| cell.is_blank()).map(Cell::position);
        prop_assume!(blank.is_some());
        let (row, col) = blank.unwrap();
        let expected = expected_cascade(&game, (row, col));

        let changed = game.reveal_cell(row, col).unwrap();

        let revealed: BTreeSet<_> = changed.iter().map(Cell::position).collect();
        prop_assert_eq!(revealed.len(), changed.len());
        prop_assert_eq!(&revealed, &expected);
        prop_assert!(changed.iter().all(|cell| !cell.is_mine()));
        prop_assert_ne!(game.status(), GameStatus::Lost);

        let status = game.status();
        prop_assert!(game.reveal_cell(row, col).unwrap().is_empty());
        prop_assert_eq!(game.status(), status);
    }

    #[test]
    fn revealing_every_safe_cell_wins(config in config_strategy(), seed in any::<u64>()) {
        let mut game = Game::with_seed(config, seed).unwrap();
        let safe: Vec<_> = game.cells().filter(|cell| !cell.is_mine()).map(Cell::position).collect();

        for (row, col) in safe {
            game.reveal_cell(row, col).unwrap();
        }

        prop_assert_eq!(game.status(), GameStatus::Won);
        prop_assert!(game.cells().all(|cell| cell.is_revealed() != cell.is_mine()));
    }

    #[test]
    fn out_of_range_moves_change_nothing(
        config in config_strategy(),
        seed in any::<u64>(),
        row_offset in 0 as Coord..4,
        col in -4 as Coord..20,
    ) {
        let mut game = Game::with_seed(config, seed).unwrap();
        let before = game.clone();
        let row = game.height() + row_offset;

        for (row, col) in [(row, col), (-1 - row_offset, col)] {
            let expected = Err(GameError::OutOfBounds { row, col });
            prop_assert_eq!(game.reveal_cell(row, col), expected.clone());
            prop_assert_eq!(game.reveal_adjacent(row, col), expected.clone());
            prop_assert_eq!(game.flag(row, col), expected.clone());
            prop_assert_eq!(game.unflag(row, col), expected);
        }
        prop_assert_eq!(game, before);
    }

    #[test]
    fn random_play_keeps_derived_state_consistent(
        config in config_strategy(),
        seed in any::<u64>(),
        moves in 1usize..60,
    ) {
        let mut game = Game::with_seed(config, seed).unwrap();
        let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(1));

        for _ in 0..moves {
            random_move(&mut game, &mut rng);

            prop_assert!(game.cells().all(|cell| !(cell.is_revealed() && cell.is_flagged())));
            let flagged = game.cells().filter(|cell| cell.is_flagged()).count() as CellCount;
            prop_assert_eq!(game.flagged_count(), flagged);

            let revealed = game.cells().filter(|cell| cell.is_revealed()).count() as CellCount;
            let expected = if game.cells().any(|cell| cell.is_revealed() && cell.is_mine()) {
                GameStatus::Lost
            } else if revealed + game.mine_count() == config.total_cells() {
                GameStatus::Won
            } else {
                GameStatus::InProgress
            };
            prop_assert_eq!(game.status(), expected);

            let snapshot = (game.status(), game.flagged_count());
            prop_assert_eq!(game.refresh_status(), snapshot.0);
            prop_assert_eq!((game.status(), game.flagged_count()), snapshot);
        }
    }
}
