use crate::game::{Color, GameError, Position, Shape};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One numbered member of a composite piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubPiece {
    pub shape: Shape,
    pub value: u32,
}

impl SubPiece {
    pub fn new(shape: Shape, value: u32) -> Self {
        SubPiece { shape, value }
    }
}

const BLACK_COMPOSITE: [(Shape, u32); 6] = [
    (Shape::Circle, 1),
    (Shape::Circle, 4),
    (Shape::Triangle, 9),
    (Shape::Triangle, 16),
    (Shape::Square, 25),
    (Shape::Square, 36),
];

const WHITE_COMPOSITE: [(Shape, u32); 5] = [
    (Shape::Circle, 16),
    (Shape::Circle, 25),
    (Shape::Triangle, 36),
    (Shape::Triangle, 49),
    (Shape::Square, 64),
];

/// Ordered set of sub-pieces that only ever shrinks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composite {
    sub_pieces: Vec<SubPiece>,
}

impl Composite {
    /// The starting set for `color`: six sub-pieces for black, five for white.
    pub fn new(color: Color) -> Self {
        let layout: &[(Shape, u32)] = match color {
            Color::Black => &BLACK_COMPOSITE,
            Color::White => &WHITE_COMPOSITE,
        };
        Composite {
            sub_pieces: layout
                .iter()
                .map(|&(shape, value)| SubPiece::new(shape, value))
                .collect(),
        }
    }

    pub fn from_sub_pieces(sub_pieces: Vec<SubPiece>) -> Self {
        Composite { sub_pieces }
    }

    pub fn sub_pieces(&self) -> &[SubPiece] {
        &self.sub_pieces
    }

    pub fn len(&self) -> usize {
        self.sub_pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sub_pieces.is_empty()
    }

    /// Sum of the remaining sub-piece values.
    pub fn value(&self) -> u32 {
        self.sub_pieces.iter().map(|sub| sub.value).sum()
    }

    pub fn valid_movement(&self, amount: usize) -> bool {
        self.sub_pieces
            .iter()
            .any(|sub| sub.shape.movement() == amount)
    }

    pub fn remove(&mut self, index: usize) -> Result<SubPiece, GameError> {
        if index >= self.sub_pieces.len() {
            return Err(GameError::InvalidSubPiece {
                index,
                len: self.sub_pieces.len(),
            });
        }
        Ok(self.sub_pieces.remove(index))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PieceKind {
    Simple(Shape),
    Composite(Composite),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    kind: PieceKind,
    color: Color,
    value: u32,
    position: Position,
}

impl Piece {
    /// Create a simple piece. Composites carry no value of their own and
    /// are built with [`Piece::composite`] instead.
    pub fn new(
        value: u32,
        shape: Shape,
        color: Color,
        position: Position,
    ) -> Result<Self, GameError> {
        match shape {
            Shape::Composite => Err(GameError::NotSimpleShape(shape)),
            _ => Ok(Piece::simple(value, shape, color, position)),
        }
    }

    /// Standard layout tables only hold simple shapes.
    pub(crate) fn simple(value: u32, shape: Shape, color: Color, position: Position) -> Self {
        Piece {
            kind: PieceKind::Simple(shape),
            color,
            value,
            position,
        }
    }

    pub fn composite(color: Color, position: Position) -> Self {
        Piece::with_composite(Composite::new(color), color, position)
    }

    pub fn with_composite(composite: Composite, color: Color, position: Position) -> Self {
        Piece {
            value: composite.value(),
            kind: PieceKind::Composite(composite),
            color,
            position,
        }
    }

    pub fn kind(&self) -> &PieceKind {
        &self.kind
    }

    pub fn shape(&self) -> Shape {
        match &self.kind {
            PieceKind::Simple(shape) => *shape,
            PieceKind::Composite(_) => Shape::Composite,
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.kind, PieceKind::Composite(_))
    }

    pub fn as_composite(&self) -> Option<&Composite> {
        match &self.kind {
            PieceKind::Composite(composite) => Some(composite),
            PieceKind::Simple(_) => None,
        }
    }

    /// Values that take part in capture arithmetic: the piece's own value,
    /// or every remaining sub-piece value of a composite, in order.
    pub fn capture_values(&self) -> Vec<u32> {
        match &self.kind {
            PieceKind::Simple(_) => vec![self.value],
            PieceKind::Composite(composite) => {
                composite.sub_pieces().iter().map(|sub| sub.value).collect()
            }
        }
    }

    pub fn valid_movement(&self, amount: usize) -> bool {
        match &self.kind {
            PieceKind::Simple(shape) => shape.movement() == amount,
            PieceKind::Composite(composite) => composite.valid_movement(amount),
        }
    }

    /// Take one sub-piece out of a composite and recompute its value.
    pub fn remove_sub_piece(&mut self, index: usize) -> Result<SubPiece, GameError> {
        match &mut self.kind {
            PieceKind::Composite(composite) => {
                let removed = composite.remove(index)?;
                self.value = composite.value();
                Ok(removed)
            }
            PieceKind::Simple(_) => Err(GameError::NotComposite(self.position)),
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            PieceKind::Simple(shape) => write!(f, "{}{}", shape.glyph(self.color), self.value),
            PieceKind::Composite(_) => f.write_str(Shape::Composite.glyph(self.color)),
        }
    }
}
