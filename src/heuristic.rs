//! Heuristic move selection for the automated opponent.
//!
//! Each empty cell is scored once per player by walking outward in all
//! eight directions over that player's adjacent stones. The first stone in
//! a direction is worth 1, the second 10, the third 100 and so on, so a
//! cell touching a long run outweighs any number of scattered neighbours.
//! The combined score favours blocking the opponent over extending one's
//! own lines.

use crate::game::{Player, Position, Snapshot};
use serde::Serialize;

/// The four forward directions and their negations
pub const ALL_DIRECTIONS: [(isize, isize); 8] = [
    (1, 0),
    (0, 1),
    (-1, 0),
    (0, -1),
    (1, 1),
    (-1, 1),
    (1, -1),
    (-1, -1),
];

/// Multiplier on the opponent's score at a cell (blocking)
pub const BLOCK_WEIGHT: u64 = 5;
/// Multiplier on the automated player's own score at a cell (extending)
pub const EXTEND_WEIGHT: u64 = 2;

const RUN_GROWTH: u64 = 10;

/// Score an empty cell for `player`. Occupied cells score 0.
pub fn line_score(snapshot: &Snapshot, pos: Position, player: Player) -> u64 {
    if !snapshot.is_empty_at(pos) {
        return 0;
    }

    let mut score: u64 = 0;
    for &(dx, dy) in &ALL_DIRECTIONS {
        let mut x = pos.x as isize + dx;
        let mut y = pos.y as isize + dy;
        let mut weight: u64 = 1;

        while snapshot.cell_at(x, y) == Some(Some(player)) {
            score = score.saturating_add(weight);
            weight = weight.saturating_mul(RUN_GROWTH);
            x += dx;
            y += dy;
        }
    }

    score
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub position: Position,
    pub score: u64,
}

/// Per-turn scoring tables for both players plus the best cell found.
/// Rebuilt from scratch for every automated move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeuristicState {
    automated: Player,
    /// `scores[ordinal - 1][x][y]`
    scores: [Vec<Vec<u64>>; 2],
    best: Candidate,
}

impl HeuristicState {
    pub fn evaluate(snapshot: &Snapshot, automated: Player) -> Self {
        let side = snapshot.grid_size().side();
        let mut scores = [vec![vec![0; side]; side], vec![vec![0; side]; side]];

        for pos in snapshot.positions() {
            for player in [Player::One, Player::Two] {
                scores[index(player)][pos.x][pos.y] = line_score(snapshot, pos, player);
            }
        }

        let mut state = HeuristicState {
            automated,
            scores,
            best: Candidate {
                position: Position::new(0, 0),
                score: 0,
            },
        };
        state.best = state.search_best(snapshot);
        state
    }

    /// Row-major scan keeping the first strict maximum. An all-zero table
    /// leaves the initial (0, 0) in place.
    fn search_best(&self, snapshot: &Snapshot) -> Candidate {
        let mut best = Candidate {
            position: Position::new(0, 0),
            score: 0,
        };

        for pos in snapshot.positions() {
            let score = self.combined_score(pos);
            if score > best.score {
                best = Candidate {
                    position: pos,
                    score,
                };
            }
        }

        best
    }

    pub fn automated(&self) -> Player {
        self.automated
    }

    pub fn score(&self, player: Player, pos: Position) -> u64 {
        self.scores[index(player)]
            .get(pos.x)
            .and_then(|column| column.get(pos.y))
            .copied()
            .unwrap_or(0)
    }

    pub fn combined_score(&self, pos: Position) -> u64 {
        let blocking = self.score(self.automated.opponent(), pos);
        let extending = self.score(self.automated, pos);
        blocking
            .saturating_mul(BLOCK_WEIGHT)
            .saturating_add(extending.saturating_mul(EXTEND_WEIGHT))
    }

    pub fn best(&self) -> Candidate {
        self.best
    }
}

fn index(player: Player) -> usize {
    usize::from(player.ordinal() - 1)
}

/// Pick the automated player's move. `None` only when the arg-max cell is
/// taken, which happens once the board is full.
pub fn choose_move(snapshot: &Snapshot, automated: Player) -> Option<Candidate> {
    let best = HeuristicState::evaluate(snapshot, automated).best();
    snapshot.is_empty_at(best.position).then_some(best)
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

    #[test]
    fn test_run_scores_grow_by_powers_of_ten() {
        let board = play(
            Snapshot::empty(GridSize::WIDE),
            &[(Player::One, 1, 0), (Player::One, 2, 0), (Player::One, 3, 0)],
        );

        // (0, 0) sees the whole run to its right
        assert_eq!(line_score(&board, Position::new(0, 0), Player::One), 111);
        // (4, 0) sees it to its left
        assert_eq!(line_score(&board, Position::new(4, 0), Player::One), 111);
        // (2, 1) touches (2, 0) straight up and both neighbours diagonally
        assert_eq!(line_score(&board, Position::new(2, 1), Player::One), 3);
        assert_eq!(line_score(&board, Position::new(0, 0), Player::Two), 0);
    }

    #[test]
    fn test_two_run_scores_eleven() {
        let board = play(
            Snapshot::empty(GridSize::WIDE),
            &[(Player::Two, 6, 6), (Player::Two, 7, 7)],
        );
        assert_eq!(line_score(&board, Position::new(5, 5), Player::Two), 11);
    }

    #[test]
    fn test_opponent_stone_stops_walk() {
        let board = play(
            Snapshot::empty(GridSize::WIDE),
            &[(Player::One, 1, 0), (Player::Two, 2, 0), (Player::One, 3, 0)],
        );
        assert_eq!(line_score(&board, Position::new(0, 0), Player::One), 1);
    }

    #[test]
    fn test_occupied_cells_score_zero() {
        let board = play(
            Snapshot::empty(GridSize::WIDE),
            &[(Player::One, 4, 4), (Player::One, 4, 5)],
        );
        let state = HeuristicState::evaluate(&board, Player::Two);

        assert_eq!(state.score(Player::One, Position::new(4, 4)), 0);
        assert_eq!(state.score(Player::Two, Position::new(4, 4)), 0);
        assert_eq!(state.combined_score(Position::new(4, 5)), 0);
    }

    #[test]
    fn test_empty_board_picks_origin() {
        let board = Snapshot::empty(GridSize::WIDE);
        let best = choose_move(&board, Player::Two).unwrap();

        assert_eq!(best.position, Position::new(0, 0));
        assert_eq!(best.score, 0);
    }

    #[test]
    fn test_blocks_open_three() {
        let board = play(
            Snapshot::empty(GridSize::WIDE),
            &[(Player::One, 4, 4), (Player::One, 4, 5), (Player::One, 4, 6)],
        );
        let best = choose_move(&board, Player::Two).unwrap();

        assert!([Position::new(4, 3), Position::new(4, 7)].contains(&best.position));
        // Both ends tie at 111 * 5; the earlier scanned one wins
        assert_eq!(best.position, Position::new(4, 3));
        assert_eq!(best.score, 555);
    }

    #[test]
    fn test_blocking_outweighs_extending() {
        let board = play(
            Snapshot::empty(GridSize::WIDE),
            &[
                (Player::One, 2, 2),
                (Player::Two, 10, 10),
                (Player::One, 2, 3),
                (Player::Two, 10, 11),
            ],
        );
        let state = HeuristicState::evaluate(&board, Player::Two);

        assert_eq!(state.combined_score(Position::new(2, 1)), 55);
        assert_eq!(state.combined_score(Position::new(10, 9)), 22);
        assert_eq!(state.best().position, Position::new(2, 1));
    }

    #[test]
    fn test_ties_keep_earliest_cell() {
        let board = play(Snapshot::empty(GridSize::WIDE), &[(Player::One, 5, 5)]);
        let state = HeuristicState::evaluate(&board, Player::Two);

        for pos in [Position::new(4, 4), Position::new(4, 5), Position::new(6, 6)] {
            assert_eq!(state.combined_score(pos), 5);
        }
        assert_eq!(state.best().position, Position::new(4, 4));
    }

    #[test]
    fn test_last_row_is_considered() {
        let size = GridSize::NARROW;
        let max = size.max_index();
        let board = play(
            Snapshot::empty(size),
            &[(Player::One, max, 0), (Player::One, max, 1), (Player::One, max, 2)],
        );

        assert_eq!(choose_move(&board, Player::Two).unwrap().position, Position::new(max, 3));
    }

    #[test]
    fn test_full_board_yields_no_move() {
        let size = GridSize::new(5).unwrap();
        let mut board = Snapshot::empty(size);
        let mut player = Player::One;
        for pos in Snapshot::empty(size).positions() {
            board = board.place(pos, player).unwrap();
            player = player.opponent();
        }

        assert!(board.is_full());
        assert_eq!(choose_move(&board, Player::Two), None);
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..50 {
            let mut board = Snapshot::empty(GridSize::WIDE);
            let mut player = Player::One;
            for _ in 0..rng.gen_range(0..40) {
                let pos = Position::new(rng.gen_range(0..16), rng.gen_range(0..16));
                if let Ok(next) = board.place(pos, player) {
                    board = next;
                    player = player.opponent();
                }
            }

            let first = HeuristicState::evaluate(&board, Player::Two);
            let second = HeuristicState::evaluate(&board.clone(), Player::Two);
            assert_eq!(first, second);

            // The chosen cell is the first maximum in scan order
            let max = board.positions().map(|p| first.combined_score(p)).max().unwrap();
            let expected = board
                .positions()
                .find(|&p| first.combined_score(p) == max)
                .unwrap();
            assert_eq!(first.best().position, expected);
        }
    }
}
