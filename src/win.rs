//! Five-in-a-row detection.
//!
//! Every stone of the player who just moved is used as a walk start, in
//! the four forward directions only. The first stone of any run has no
//! same-colour predecessor in that direction, so walking forward from every
//! stone always covers each run from its first cell.

use crate::game::{Player, Position, Snapshot, WIN_LENGTH};

/// Forward direction vectors: right, down, down-right, down-left
pub const DIRECTIONS: [(isize, isize); 4] = [(1, 0), (0, 1), (1, 1), (-1, 1)];

/// Count consecutive `player` stones starting at `start` (inclusive) and
/// stepping by `dir` until a different cell or the board edge.
pub fn run_length(
    snapshot: &Snapshot,
    start: Position,
    dir: (isize, isize),
    player: Player,
) -> usize {
    let (dx, dy) = dir;
    let mut x = start.x as isize;
    let mut y = start.y as isize;
    let mut count = 0;

    while snapshot.cell_at(x, y) == Some(Some(player)) {
        count += 1;
        x += dx;
        y += dy;
    }

    count
}

/// True if `player` has at least five in a row anywhere on the board
pub fn has_five(snapshot: &Snapshot, player: Player) -> bool {
    snapshot
        .positions()
        .filter(|&pos| snapshot.get(pos) == Some(player))
        .any(|pos| {
            DIRECTIONS
                .iter()
                .any(|&dir| run_length(snapshot, pos, dir, player) >= WIN_LENGTH)
        })
}

/// Check whether the player who made the last move has won.
///
/// Returns `None` for a board without a last move or when the game goes on.
pub fn check_winner(snapshot: &Snapshot) -> Option<Player> {
    let player = snapshot.last_mover()?;
    has_five(snapshot, player).then_some(player)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GridSize;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn play(mut snapshot: Snapshot, moves: &[(Player, usize, usize)]) -> Snapshot {
        for &(player, x, y) in moves {
            snapshot = snapshot.place(Position::new(x, y), player).unwrap();
        }
        snapshot
    }

    fn line(player: Player, cells: &[(usize, usize)]) -> Vec<(Player, usize, usize)> {
        cells.iter().map(|&(x, y)| (player, x, y)).collect()
    }

    /// Window check: five cells along one direction, independent of `run_length`
    fn brute_force_five(snapshot: &Snapshot, player: Player) -> bool {
        snapshot.positions().any(|pos| {
            DIRECTIONS.iter().any(|&(dx, dy)| {
                (0..WIN_LENGTH as isize).all(|k| {
                    snapshot.cell_at(pos.x as isize + dx * k, pos.y as isize + dy * k)
                        == Some(Some(player))
                })
            })
        })
    }

    #[test]
    fn test_single_stone_is_not_a_win() {
        let board = play(Snapshot::empty(GridSize::WIDE), &[(Player::One, 7, 7)]);
        assert_eq!(check_winner(&board), None);
    }

    #[test]
    fn test_empty_board_has_no_winner() {
        assert_eq!(check_winner(&Snapshot::empty(GridSize::WIDE)), None);
    }

    #[test]
    fn test_fifth_stone_completes_line() {
        let board = play(
            Snapshot::empty(GridSize::WIDE),
            &line(Player::One, &[(5, 5), (5, 6), (5, 7), (5, 8)]),
        );
        assert_eq!(check_winner(&board), None);

        let board = board.place(Position::new(5, 9), Player::One).unwrap();
        assert_eq!(check_winner(&board), Some(Player::One));
    }

    #[test]
    fn test_all_four_axes() {
        let lines: [&[(usize, usize)]; 4] = [
            &[(2, 3), (3, 3), (4, 3), (5, 3), (6, 3)],
            &[(8, 0), (8, 1), (8, 2), (8, 3), (8, 4)],
            &[(1, 1), (2, 2), (3, 3), (4, 4), (5, 5)],
            &[(10, 2), (9, 3), (8, 4), (7, 5), (6, 6)],
        ];

        for cells in lines {
            let board = play(Snapshot::empty(GridSize::WIDE), &line(Player::Two, cells));
            assert_eq!(check_winner(&board), Some(Player::Two), "line {:?}", cells);
        }
    }

    #[test]
    fn test_four_is_not_enough() {
        let board = play(
            Snapshot::empty(GridSize::WIDE),
            &line(Player::One, &[(0, 0), (1, 1), (2, 2), (3, 3)]),
        );
        assert_eq!(check_winner(&board), None);
    }

    #[test]
    fn test_overline_also_wins() {
        let board = play(
            Snapshot::empty(GridSize::WIDE),
            &line(Player::One, &[(0, 9), (1, 9), (2, 9), (3, 9), (4, 9), (5, 9)]),
        );
        assert_eq!(check_winner(&board), Some(Player::One));
    }

    #[test]
    fn test_broken_line_does_not_win() {
        let board = play(
            Snapshot::empty(GridSize::WIDE),
            &[
                (Player::One, 3, 0),
                (Player::One, 3, 1),
                (Player::Two, 3, 2),
                (Player::One, 3, 3),
                (Player::One, 3, 4),
                (Player::One, 3, 5),
            ],
        );
        assert_eq!(check_winner(&board), None);
    }

    #[test]
    fn test_line_on_board_edge() {
        let size = GridSize::NARROW;
        let max = size.max_index();
        let board = play(
            Snapshot::empty(size),
            &line(
                Player::Two,
                &[(max, max), (max - 1, max), (max - 2, max), (max - 3, max), (max - 4, max)],
            ),
        );
        assert_eq!(check_winner(&board), Some(Player::Two));
    }

    #[test]
    fn test_only_last_mover_is_checked() {
        // Player One has five, but Player Two moved last
        let mut moves = line(Player::One, &[(0, 0), (0, 1), (0, 2), (0, 3), (0, 4)]);
        moves.push((Player::Two, 9, 9));
        let board = play(Snapshot::empty(GridSize::WIDE), &moves);

        assert_eq!(check_winner(&board), None);
        assert!(has_five(&board, Player::One));
    }

    #[test]
    fn test_any_cell_of_the_run_can_complete_it() {
        let cells = [(4, 10), (5, 9), (6, 8), (7, 7), (8, 6)];

        for last in 0..cells.len() {
            let mut order: Vec<_> = cells
                .iter()
                .copied()
                .enumerate()
                .filter(|&(i, _)| i != last)
                .map(|(_, c)| c)
                .collect();
            order.push(cells[last]);
            let board = play(Snapshot::empty(GridSize::WIDE), &line(Player::One, &order));

            assert_eq!(board.last_move(), Some(Position::new(cells[last].0, cells[last].1)));
            assert_eq!(check_winner(&board), Some(Player::One));
        }
    }

    #[test]
    fn test_run_length_counts_start_cell() {
        let board = play(
            Snapshot::empty(GridSize::WIDE),
            &line(Player::One, &[(2, 2), (3, 2), (4, 2)]),
        );

        assert_eq!(run_length(&board, Position::new(2, 2), (1, 0), Player::One), 3);
        assert_eq!(run_length(&board, Position::new(3, 2), (1, 0), Player::One), 2);
        assert_eq!(run_length(&board, Position::new(2, 2), (0, 1), Player::One), 1);
        assert_eq!(run_length(&board, Position::new(2, 2), (1, 0), Player::Two), 0);
    }

    #[test]
    fn test_matches_window_search_on_random_boards() {
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for _ in 0..300 {
            let size = if rng.gen_bool(0.5) { GridSize::NARROW } else { GridSize::WIDE };
            let mut board = Snapshot::empty(size);
            let stones = rng.gen_range(1..=60);
            let mut player = Player::One;

            for _ in 0..stones {
                let pos = Position::new(
                    rng.gen_range(0..size.side()),
                    rng.gen_range(0..size.side()),
                );
                if let Ok(next) = board.place(pos, player) {
                    board = next;
                    player = player.opponent();
                }
            }

            let mover = board.last_mover().unwrap();
            let expected = brute_force_five(&board, mover).then_some(mover);
            assert_eq!(check_winner(&board), expected, "\n{}", board.display_board());
        }
    }
}
