use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stones in an unbroken line needed to win
pub const WIN_LENGTH: usize = 5;

/// Viewports narrower than this (in pixels) get the small board
pub const NARROW_VIEWPORT_THRESHOLD: u32 = 478;

/// Number of line intervals per axis. A board has `GridSize + 1`
/// intersections per axis, indexed `0..=GridSize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct GridSize(usize);

impl GridSize {
    pub const NARROW: GridSize = GridSize(9);
    pub const WIDE: GridSize = GridSize(15);

    pub fn new(intervals: usize) -> Result<Self, GameError> {
        if intervals < WIN_LENGTH {
            return Err(GameError::GridTooSmall(intervals));
        }
        Ok(GridSize(intervals))
    }

    pub fn from_viewport_width(width_px: u32) -> Self {
        if width_px < NARROW_VIEWPORT_THRESHOLD {
            Self::NARROW
        } else {
            Self::WIDE
        }
    }

    /// Largest valid coordinate on either axis
    pub fn max_index(&self) -> usize {
        self.0
    }

    /// Intersections per axis
    pub fn side(&self) -> usize {
        self.0 + 1
    }

    /// Turn raw signed coordinates, such as a click left of the first
    /// line, into a position on this grid
    pub fn position(&self, x: i64, y: i64) -> Result<Position, GameError> {
        let out_of_bounds = GameError::OutOfBounds { x, y, max: self.0 };
        let x = usize::try_from(x).map_err(|_| out_of_bounds.clone())?;
        let y = usize::try_from(y).map_err(|_| out_of_bounds.clone())?;
        if x > self.0 || y > self.0 {
            return Err(out_of_bounds);
        }
        Ok(Position::new(x, y))
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::WIDE
    }
}

impl TryFrom<usize> for GridSize {
    type Error = GameError;

    fn try_from(intervals: usize) -> Result<Self, Self::Error> {
        GridSize::new(intervals)
    }
}

impl From<GridSize> for usize {
    fn from(size: GridSize) -> usize {
        size.0
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.side(), self.side())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn opponent(&self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    pub fn ordinal(&self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }

    pub fn identity(&self) -> PlayerIdentity {
        match self {
            Player::One => BLACK,
            Player::Two => WHITE,
        }
    }
}

/// Fixed presentation data for a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayerIdentity {
    pub ordinal: u8,
    pub name: &'static str,
    pub class_name: &'static str,
    pub color1: &'static str,
    pub color2: &'static str,
}

pub const BLACK: PlayerIdentity = PlayerIdentity {
    ordinal: 1,
    name: "Black",
    class_name: "black",
    color1: "#020202",
    color2: "#686d6c",
};

pub const WHITE: PlayerIdentity = PlayerIdentity {
    ordinal: 2,
    name: "White",
    class_name: "white",
    color1: "#d0d0d0",
    color2: "#f5f4f4",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Position ({x}, {y}) is outside the board (0..={max})")]
    OutOfBounds { x: i64, y: i64, max: usize },
    #[error("Cell {0} is already occupied")]
    CellOccupied(Position),
    #[error("Nothing further to undo")]
    HistoryExhausted,
    #[error("Cannot {command} while {phase}")]
    InvalidTransition {
        command: &'static str,
        phase: &'static str,
    },
    #[error("Grid size {0} cannot hold five in a row")]
    GridTooSmall(usize),
}

/// One immutable board state plus the move that produced it.
///
/// Cells are addressed as `grid[x][y]`. A child snapshot is always a
/// fresh copy of its parent with exactly one cell filled in, so older
/// snapshots held by the history are never touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    grid: Vec<Vec<Option<Player>>>,
    grid_size: GridSize,
    last_move: Option<Position>,
}

impl Snapshot {
    /// An empty board with no last move
    pub fn empty(grid_size: GridSize) -> Self {
        Snapshot {
            grid: vec![vec![None; grid_size.side()]; grid_size.side()],
            grid_size,
            last_move: None,
        }
    }

    pub fn grid_size(&self) -> GridSize {
        self.grid_size
    }

    pub fn last_move(&self) -> Option<Position> {
        self.last_move
    }

    /// The player occupying the last-moved cell
    pub fn last_mover(&self) -> Option<Player> {
        self.last_move.and_then(|pos| self.get(pos))
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x <= self.grid_size.max_index() && pos.y <= self.grid_size.max_index()
    }

    /// Signed-coordinate lookup used by line walks; `None` off the board
    pub(crate) fn cell_at(&self, x: isize, y: isize) -> Option<Option<Player>> {
        if x < 0 || y < 0 {
            return None;
        }
        self.grid.get(x as usize)?.get(y as usize).copied()
    }

    pub fn get(&self, pos: Position) -> Option<Player> {
        if self.contains(pos) {
            self.grid[pos.x][pos.y]
        } else {
            None
        }
    }

    pub fn is_empty_at(&self, pos: Position) -> bool {
        self.contains(pos) && self.grid[pos.x][pos.y].is_none()
    }

    pub fn check_bounds(&self, pos: Position) -> Result<(), GameError> {
        if self.contains(pos) {
            Ok(())
        } else {
            Err(GameError::OutOfBounds {
                x: i64::try_from(pos.x).unwrap_or(i64::MAX),
                y: i64::try_from(pos.y).unwrap_or(i64::MAX),
                max: self.grid_size.max_index(),
            })
        }
    }

    /// Derive the child snapshot with `player` at `pos`. `self` is left as is.
    pub fn place(&self, pos: Position, player: Player) -> Result<Snapshot, GameError> {
        self.check_bounds(pos)?;
        if self.grid[pos.x][pos.y].is_some() {
            return Err(GameError::CellOccupied(pos));
        }

        let mut child = self.clone();
        child.grid[pos.x][pos.y] = Some(player);
        child.last_move = Some(pos);
        Ok(child)
    }

    /// All positions in scan order: `x` ascending, then `y` ascending
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let side = self.grid_size.side();
        (0..side).flat_map(move |x| (0..side).map(move |y| Position::new(x, y)))
    }

    pub fn stone_count(&self) -> usize {
        self.grid.iter().flatten().filter(|cell| cell.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        self.stone_count() == self.grid_size.side() * self.grid_size.side()
    }

    /// Cell values as ordinals (0 empty, 1 or 2 for a player), `grid[x][y]`
    pub fn ordinals(&self) -> Vec<Vec<u8>> {
        self.grid
            .iter()
            .map(|column| {
                column
                    .iter()
                    .map(|cell| cell.map_or(0, |p| p.ordinal()))
                    .collect()
            })
            .collect()
    }

    /// Get a string representation of the board, last move in brackets
    pub fn display_board(&self) -> String {
        let side = self.grid_size.side();
        let mut result = String::new();
        result.push_str(&format!("[{} board]\n", self.grid_size));
        result.push_str("   ");
        for x in 0..side {
            result.push_str(&format!("{:2} ", x));
        }
        result.push('\n');

        for y in 0..side {
            result.push_str(&format!("{:2} ", y));
            for x in 0..side {
                let c = match self.grid[x][y] {
                    Some(Player::One) => 'X',
                    Some(Player::Two) => 'O',
                    None => '.',
                };
                if self.last_move == Some(Position::new(x, y)) {
                    result.push_str(&format!("[{}]", c));
                } else {
                    result.push_str(&format!(" {} ", c));
                }
            }
            result.push('\n');
        }

        result
    }
}
