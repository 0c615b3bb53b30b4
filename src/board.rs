use crate::capture::{self, CaptureKind, Eligibility, Occupancy};
use crate::game::{
    BOARD_HEIGHT, BOARD_WIDTH, Color, DisplayCoord, Direction, GameError, Position, Shape,
};
use crate::piece::{Piece, SubPiece};
use log::debug;

/// Index of a piece in the board's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceId(usize);

/// What a finished capture took off the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    /// The target left the board.
    Piece(Piece),
    /// One sub-piece left the composite target.
    SubPiece { index: usize, sub_piece: SubPiece },
    /// The defender gave up this piece instead of the composite.
    Ransom(Piece),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureReport {
    pub kind: CaptureKind,
    pub target: Position,
    pub removal: Removal,
}

/// A capture against a composite that waits for its owner to pay or refuse
/// a ransom. It is only valid on the board revision that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCapture {
    kind: CaptureKind,
    target: Position,
    owner: Color,
    eligibility: Eligibility,
    revision: u64,
}

impl PendingCapture {
    pub fn kind(&self) -> CaptureKind {
        self.kind
    }

    pub fn target(&self) -> Position {
        self.target
    }

    /// Colour of the composite's owner, who decides on the ransom.
    pub fn owner(&self) -> Color {
        self.owner
    }

    pub fn eligibility(&self) -> Eligibility {
        self.eligibility
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Completed(CaptureReport),
    RansomRequired(PendingCapture),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RansomDecision {
    Decline,
    /// Sacrifice the piece on this square instead.
    Pay(Position),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    grid: [[Option<PieceId>; BOARD_WIDTH]; BOARD_HEIGHT],
    pieces: Vec<Option<Piece>>,
    win_threshold: u32,
    black_captured: u32,
    white_captured: u32,
    revision: u64,
}

impl Board {
    /// Create a board with the standard starting layout
    pub fn new(win_threshold: u32) -> Self {
        let mut board = Board::empty(win_threshold);
        board.setup_standard();
        board
    }

    /// Create a board with no pieces on it
    pub fn empty(win_threshold: u32) -> Self {
        Board {
            grid: [[None; BOARD_WIDTH]; BOARD_HEIGHT],
            pieces: Vec::new(),
            win_threshold,
            black_captured: 0,
            white_captured: 0,
            revision: 0,
        }
    }

    fn setup_standard(&mut self) {
        use Shape::{Circle, Square, Triangle};

        let black: [(usize, usize, u32, Shape); 23] = [
            (0, 0, 49, Square),
            (0, 1, 121, Square),
            (0, 6, 225, Square),
            (0, 7, 361, Square),
            (1, 0, 28, Square),
            (1, 1, 66, Square),
            (1, 2, 36, Triangle),
            (1, 3, 30, Triangle),
            (1, 4, 56, Triangle),
            (1, 5, 64, Triangle),
            (1, 6, 120, Square),
            (2, 0, 16, Triangle),
            (2, 1, 12, Triangle),
            (2, 2, 9, Circle),
            (2, 3, 25, Circle),
            (2, 4, 49, Circle),
            (2, 5, 81, Circle),
            (2, 6, 90, Triangle),
            (2, 7, 100, Triangle),
            (3, 2, 3, Circle),
            (3, 3, 5, Circle),
            (3, 4, 7, Circle),
            (3, 5, 9, Circle),
        ];

        let white: [(usize, usize, u32, Shape); 23] = [
            (15, 0, 289, Square),
            (15, 1, 169, Square),
            (15, 6, 81, Square),
            (15, 7, 25, Square),
            (14, 0, 153, Square),
            (14, 2, 49, Triangle),
            (14, 3, 42, Triangle),
            (14, 4, 20, Triangle),
            (14, 5, 25, Triangle),
            (14, 6, 45, Square),
            (14, 7, 15, Square),
            (13, 0, 81, Triangle),
            (13, 1, 72, Triangle),
            (13, 2, 64, Circle),
            (13, 3, 36, Circle),
            (13, 4, 16, Circle),
            (13, 5, 4, Circle),
            (13, 6, 6, Triangle),
            (13, 7, 9, Triangle),
            (12, 2, 8, Circle),
            (12, 3, 6, Circle),
            (12, 4, 4, Circle),
            (12, 5, 2, Circle),
        ];

        for (color, layout) in [(Color::Black, black), (Color::White, white)] {
            for (row, col, value, shape) in layout {
                let pos = Position::new(row, col);
                self.insert(pos, Piece::simple(value, shape, color, pos));
            }
        }

        let black_composite = Position::new(1, 7);
        let white_composite = Position::new(14, 1);
        self.insert(black_composite, Piece::composite(Color::Black, black_composite));
        self.insert(white_composite, Piece::composite(Color::White, white_composite));
    }

    fn insert(&mut self, pos: Position, mut piece: Piece) {
        piece.set_position(pos);
        let id = PieceId(self.pieces.len());
        self.pieces.push(Some(piece));
        self.grid[pos.row][pos.col] = Some(id);
    }

    /// Put a piece on an empty square. The piece takes the square's position.
    pub fn place(&mut self, pos: Position, piece: Piece) -> Result<(), GameError> {
        if !pos.in_bounds() {
            return Err(GameError::OutOfBounds(pos));
        }
        if self.is_occupied(pos) {
            return Err(GameError::SquareOccupied(pos));
        }
        self.insert(pos, piece);
        self.revision += 1;
        Ok(())
    }

    fn id_at(&self, pos: Position) -> Option<PieceId> {
        if pos.in_bounds() {
            self.grid[pos.row][pos.col]
        } else {
            None
        }
    }

    pub fn get_piece(&self, pos: Position) -> Option<&Piece> {
        self.id_at(pos)
            .and_then(|PieceId(index)| self.pieces[index].as_ref())
    }

    /// Look a piece up by the coordinates a player reads off the board.
    pub fn get_piece_display(&self, coord: DisplayCoord) -> Option<&Piece> {
        coord.to_position().ok().and_then(|pos| self.get_piece(pos))
    }

    fn piece_mut(&mut self, pos: Position) -> Option<&mut Piece> {
        self.id_at(pos)
            .and_then(|PieceId(index)| self.pieces[index].as_mut())
    }

    fn take_piece(&mut self, pos: Position) -> Option<Piece> {
        let PieceId(index) = self.grid[pos.row][pos.col].take()?;
        self.pieces[index].take()
    }

    /// All pieces on the board, top row first.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.grid
            .iter()
            .flatten()
            .filter_map(|id| id.and_then(|PieceId(index)| self.pieces[index].as_ref()))
    }

    pub fn count(&self, color: Color) -> usize {
        self.pieces().filter(|piece| piece.color() == color).count()
    }

    /// Move the piece on `from` by `amount` squares. Nothing changes unless
    /// every check passes.
    pub fn move_piece(
        &mut self,
        from: Position,
        amount: usize,
        direction: Direction,
        color: Color,
    ) -> Result<Position, GameError> {
        let result = self.validate_move(from, amount, direction, color);
        let (id, to) = match result {
            Ok(found) => found,
            Err(e) => {
                debug!("Rejected move from {}: {}", from, e);
                return Err(e);
            }
        };

        self.grid[from.row][from.col] = None;
        self.grid[to.row][to.col] = Some(id);
        if let Some(piece) = self.piece_mut(to) {
            piece.set_position(to);
        }
        self.revision += 1;

        debug!("{} moved {} {:?} from {} to {}", color, amount, direction, from, to);
        Ok(to)
    }

    fn validate_move(
        &self,
        from: Position,
        amount: usize,
        direction: Direction,
        color: Color,
    ) -> Result<(PieceId, Position), GameError> {
        if !from.in_bounds() {
            return Err(GameError::OutOfBounds(from));
        }
        let id = self.id_at(from).ok_or(GameError::NoPiece(from))?;
        let piece = self.get_piece(from).ok_or(GameError::NoPiece(from))?;

        if piece.color() != color {
            return Err(GameError::WrongColor {
                position: from,
                color,
            });
        }
        if !piece.valid_movement(amount) {
            return Err(GameError::IllegalDistance {
                shape: piece.shape(),
                amount,
            });
        }

        let to = from
            .offset(direction, amount)
            .ok_or(GameError::NotEnoughSpace {
                from,
                amount,
                direction,
            })?;

        if let Some(blocked) = (1..=amount)
            .filter_map(|step| from.offset(direction, step))
            .find(|&pos| self.is_occupied(pos))
        {
            return Err(GameError::PathBlocked(blocked));
        }

        Ok((id, to))
    }

    /// Take the piece on `target` with the pieces on `attackers`.
    ///
    /// Rules are tried in order for the attacker count: Encounter then
    /// Eruption for one, Deceit then 2-Sided Siege for two, 3-Sided Siege
    /// for three and 4-Sided Siege for four. A capture that lands on a
    /// composite is suspended until its owner decides on a ransom; see
    /// [`Board::resolve_ransom`].
    pub fn capture(
        &mut self,
        attackers: &[Position],
        target: Position,
        color: Color,
    ) -> Result<CaptureOutcome, GameError> {
        let (kind, eligibility, owner, composite) =
            match self.evaluate_capture(attackers, target, color) {
                Ok(found) => found,
                Err(e) => {
                    debug!("Rejected capture of {}: {}", target, e);
                    return Err(e);
                }
            };

        if composite {
            debug!("{} threatens the composite at {} by {}", color, target, kind);
            return Ok(CaptureOutcome::RansomRequired(PendingCapture {
                kind,
                target,
                owner,
                eligibility,
                revision: self.revision,
            }));
        }

        let removal = self.remove_target(target, eligibility)?;
        self.revision += 1;
        debug!("{} captured {} by {}", color, target, kind);
        Ok(CaptureOutcome::Completed(CaptureReport {
            kind,
            target,
            removal,
        }))
    }

    fn evaluate_capture(
        &self,
        attackers: &[Position],
        target: Position,
        color: Color,
    ) -> Result<(CaptureKind, Eligibility, Color, bool), GameError> {
        if attackers.is_empty() {
            return Err(GameError::NoAttackers);
        }

        let mut attacking = Vec::with_capacity(attackers.len());
        for (i, &pos) in attackers.iter().enumerate() {
            if !pos.in_bounds() {
                return Err(GameError::OutOfBounds(pos));
            }
            let piece = self.get_piece(pos).ok_or(GameError::NoPiece(pos))?;
            if piece.color() != color {
                return Err(GameError::WrongColor {
                    position: pos,
                    color,
                });
            }
            if attackers[..i].contains(&pos) {
                return Err(GameError::DuplicateAttacker(pos));
            }
            attacking.push(piece);
        }

        if !target.in_bounds() {
            return Err(GameError::OutOfBounds(target));
        }
        let defender = self.get_piece(target).ok_or(GameError::NoPiece(target))?;
        if defender.color() == color {
            return Err(GameError::SelfCapture(target));
        }

        let rules = CaptureKind::for_attackers(attacking.len());
        if rules.is_empty() {
            return Err(GameError::UnsupportedAttackerCount(attacking.len()));
        }

        rules
            .iter()
            .map(|&kind| (kind, capture::check(kind, defender, &attacking, self)))
            .find(|(_, eligibility)| eligibility.is_eligible())
            .map(|(kind, eligibility)| {
                (kind, eligibility, defender.color(), defender.is_composite())
            })
            .ok_or(GameError::NotEligible(target))
    }

    fn remove_target(
        &mut self,
        target: Position,
        eligibility: Eligibility,
    ) -> Result<Removal, GameError> {
        match eligibility {
            Eligibility::Eligible => self
                .take_piece(target)
                .map(Removal::Piece)
                .ok_or(GameError::NoPiece(target)),
            Eligibility::Partial(index) => {
                let piece = self.piece_mut(target).ok_or(GameError::NoPiece(target))?;
                let sub_piece = piece.remove_sub_piece(index)?;
                Ok(Removal::SubPiece { index, sub_piece })
            }
            Eligibility::NotEligible => Err(GameError::NotEligible(target)),
        }
    }

    /// Finish a capture suspended on a composite. Declining lets the capture
    /// proceed; paying removes the named piece of the owner's colour instead
    /// and leaves the composite untouched. An unacceptable payment is
    /// rejected without consuming `pending`, so the owner can choose again.
    pub fn resolve_ransom(
        &mut self,
        pending: &PendingCapture,
        decision: RansomDecision,
    ) -> Result<CaptureReport, GameError> {
        if pending.revision != self.revision {
            return Err(GameError::StaleRansom);
        }

        let removal = match decision {
            RansomDecision::Decline => self.remove_target(pending.target, pending.eligibility)?,
            RansomDecision::Pay(pos) => {
                self.validate_ransom(pending, pos)?;
                self.take_piece(pos)
                    .map(Removal::Ransom)
                    .ok_or(GameError::NoPiece(pos))?
            }
        };
        self.revision += 1;

        debug!("Ransom for {} resolved: {:?}", pending.target, decision);
        Ok(CaptureReport {
            kind: pending.kind,
            target: pending.target,
            removal,
        })
    }

    fn validate_ransom(&self, pending: &PendingCapture, pos: Position) -> Result<(), GameError> {
        if !pos.in_bounds() {
            return Err(GameError::InvalidRansom(format!("{} is off the board", pos)));
        }
        let piece = self
            .get_piece(pos)
            .ok_or_else(|| GameError::InvalidRansom(format!("there is no piece at {}", pos)))?;
        if pos == pending.target {
            return Err(GameError::InvalidRansom(
                "the composite cannot ransom itself".to_string(),
            ));
        }
        if piece.color() != pending.owner {
            return Err(GameError::InvalidRansom(format!(
                "the piece at {} does not belong to {}",
                pos, pending.owner
            )));
        }
        Ok(())
    }

    pub fn increment_captured(&mut self, color: Color) {
        match color {
            Color::Black => self.black_captured += 1,
            Color::White => self.white_captured += 1,
        }
    }

    pub fn increment_black_captured(&mut self) {
        self.increment_captured(Color::Black);
    }

    pub fn increment_white_captured(&mut self) {
        self.increment_captured(Color::White);
    }

    /// Number of captures credited to `color`.
    pub fn captures_by(&self, color: Color) -> u32 {
        match color {
            Color::Black => self.black_captured,
            Color::White => self.white_captured,
        }
    }

    pub fn win_threshold(&self) -> u32 {
        self.win_threshold
    }

    pub fn winner(&self) -> Option<Color> {
        if self.black_captured >= self.win_threshold {
            Some(Color::Black)
        } else if self.white_captured >= self.win_threshold {
            Some(Color::White)
        } else {
            None
        }
    }

    pub fn game_ended(&self) -> bool {
        self.winner().is_some()
    }

    /// Get a string representation of the board, as a player reads it
    pub fn display_board(&self) -> String {
        let mut result = String::new();

        for row in 0..BOARD_HEIGHT {
            result.push_str(&format!("{:2} ", BOARD_HEIGHT - row));
            for col in 0..BOARD_WIDTH {
                let cell = match self.get_piece(Position::new(row, col)) {
                    Some(piece) => piece.to_string(),
                    None => ".".to_string(),
                };
                result.push_str(&format!("{:>5}", cell));
            }
            result.push('\n');
        }

        result.push_str("   ");
        for col in 1..=BOARD_WIDTH {
            result.push_str(&format!("{:>5}", col));
        }
        result.push('\n');

        for piece in self.pieces() {
            if let Some(composite) = piece.as_composite() {
                let members = composite
                    .sub_pieces()
                    .iter()
                    .map(|sub| format!("{}{}", sub.shape.glyph(piece.color()), sub.value))
                    .collect::<Vec<_>>();
                result.push_str(&format!(
                    "{} composite: [{}]\n",
                    piece.color(),
                    members.join(", ")
                ));
            }
        }

        result
    }
}

impl Occupancy for Board {
    fn is_occupied(&self, pos: Position) -> bool {
        self.get_piece(pos).is_some()
    }
}
