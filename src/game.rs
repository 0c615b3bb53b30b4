use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Board size constants
pub const BOARD_HEIGHT: usize = 16;
pub const BOARD_WIDTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opponent(&self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Color::Black => "Black",
            Color::White => "White",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Circle,
    Square,
    Triangle,
    Composite,
}

impl Shape {
    /// Fixed movement distance of the shape.
    pub fn movement(&self) -> usize {
        match self {
            Shape::Circle => 1,
            Shape::Triangle => 2,
            Shape::Square | Shape::Composite => 3,
        }
    }

    /// Glyph used on the text board, filled for white and hollow for black.
    pub fn glyph(&self, color: Color) -> &'static str {
        match (self, color) {
            (Shape::Circle, Color::White) => "●",
            (Shape::Circle, Color::Black) => "○",
            (Shape::Triangle, Color::White) => "▲",
            (Shape::Triangle, Color::Black) => "△",
            (Shape::Square, Color::White) => "■",
            (Shape::Square, Color::Black) => "□",
            (Shape::Composite, Color::White) => "WP",
            (Shape::Composite, Color::Black) => "BP",
        }
    }
}

/// Internal board coordinate: row 0 is black's back rank at the top,
/// row 15 is white's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    /// Build a position from signed coordinates, `None` when off the board.
    pub fn checked(row: i32, col: i32) -> Option<Self> {
        if row < 0 || col < 0 || row >= BOARD_HEIGHT as i32 || col >= BOARD_WIDTH as i32 {
            None
        } else {
            Some(Position::new(row as usize, col as usize))
        }
    }

    pub fn in_bounds(&self) -> bool {
        self.row < BOARD_HEIGHT && self.col < BOARD_WIDTH
    }

    pub fn is_corner(&self) -> bool {
        (self.row == 0 || self.row == BOARD_HEIGHT - 1)
            && (self.col == 0 || self.col == BOARD_WIDTH - 1)
    }

    /// On the outer ring of the board but not a corner.
    pub fn is_edge(&self) -> bool {
        let on_rank = self.row == 0 || self.row == BOARD_HEIGHT - 1;
        let on_file = self.col == 0 || self.col == BOARD_WIDTH - 1;
        on_rank != on_file
    }

    /// Absolute row and column distance to `other`.
    pub fn distance(&self, other: Position) -> (usize, usize) {
        (self.row.abs_diff(other.row), self.col.abs_diff(other.col))
    }

    /// Step `amount` squares in `direction`, `None` when that leaves the board.
    pub fn offset(&self, direction: Direction, amount: usize) -> Option<Position> {
        let (dr, dc) = direction.delta();
        let amount = amount as i32;
        Position::checked(
            self.row as i32 + dr * amount,
            self.col as i32 + dc * amount,
        )
    }

    /// The in-bounds squares directly above, below, left and right.
    pub fn orthogonal_neighbors(&self) -> Vec<Position> {
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
            .iter()
            .filter_map(|&direction| self.offset(direction, 1))
            .collect()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Coordinate as a player reads it: 1-indexed, column first, rows counted
/// from the bottom of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayCoord {
    pub col: i32,
    pub row: i32,
}

impl DisplayCoord {
    pub fn new(col: i32, row: i32) -> Self {
        DisplayCoord { col, row }
    }

    pub fn to_position(self) -> Result<Position, GameError> {
        let row = BOARD_HEIGHT as i32 - self.row;
        let col = self.col - 1;
        Position::checked(row, col).ok_or(GameError::DisplayOutOfBounds(self))
    }
}

impl From<Position> for DisplayCoord {
    fn from(pos: Position) -> Self {
        DisplayCoord {
            col: pos.col as i32 + 1,
            row: (BOARD_HEIGHT - pos.row) as i32,
        }
    }
}

impl fmt::Display for DisplayCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.col, self.row)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    DiagonalUpLeft,
    DiagonalUpRight,
    DiagonalDownLeft,
    DiagonalDownRight,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
        Direction::DiagonalUpLeft,
        Direction::DiagonalUpRight,
        Direction::DiagonalDownLeft,
        Direction::DiagonalDownRight,
    ];

    /// Row and column step in internal coordinates ("up" is towards row 0).
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
            Direction::DiagonalUpLeft => (-1, -1),
            Direction::DiagonalUpRight => (-1, 1),
            Direction::DiagonalDownLeft => (1, -1),
            Direction::DiagonalDownRight => (1, 1),
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::DiagonalUpLeft => Direction::DiagonalDownRight,
            Direction::DiagonalUpRight => Direction::DiagonalDownLeft,
            Direction::DiagonalDownLeft => Direction::DiagonalUpRight,
            Direction::DiagonalDownRight => Direction::DiagonalUpLeft,
        }
    }
}

impl FromStr for Direction {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            "diagonalupleft" => Ok(Direction::DiagonalUpLeft),
            "diagonalupright" => Ok(Direction::DiagonalUpRight),
            "diagonaldownleft" => Ok(Direction::DiagonalDownLeft),
            "diagonaldownright" => Ok(Direction::DiagonalDownRight),
            _ => Err(GameError::UnknownDirection(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Coordinate {0} is out of bounds")]
    OutOfBounds(Position),
    #[error("Coordinate {0} is out of bounds")]
    DisplayOutOfBounds(DisplayCoord),
    #[error("There is no piece at {0}")]
    NoPiece(Position),
    #[error("The piece at {position} does not belong to {color}")]
    WrongColor { position: Position, color: Color },
    #[error("A {shape:?} cannot move {amount} spaces")]
    IllegalDistance { shape: Shape, amount: usize },
    #[error("There is not enough board space to move {amount} {direction:?} from {from}")]
    NotEnoughSpace {
        from: Position,
        amount: usize,
        direction: Direction,
    },
    #[error("The path is blocked at {0}")]
    PathBlocked(Position),
    #[error("Cannot capture with nothing")]
    NoAttackers,
    #[error("Cannot capture with {0} pieces")]
    UnsupportedAttackerCount(usize),
    #[error("The piece at {0} is listed more than once")]
    DuplicateAttacker(Position),
    #[error("Cannot capture your own piece at {0}")]
    SelfCapture(Position),
    #[error("No capture rule allows taking the piece at {0}")]
    NotEligible(Position),
    #[error("Sub-piece index {index} is out of range for {len} sub-pieces")]
    InvalidSubPiece { index: usize, len: usize },
    #[error("The piece at {0} is not a composite")]
    NotComposite(Position),
    #[error("{0:?} is not the shape of a simple piece")]
    NotSimpleShape(Shape),
    #[error("Invalid ransom: {0}")]
    InvalidRansom(String),
    #[error("The pending capture no longer matches the board")]
    StaleRansom,
    #[error("The square {0} is already occupied")]
    SquareOccupied(Position),
    #[error("Unknown direction '{0}'")]
    UnknownDirection(String),
}
