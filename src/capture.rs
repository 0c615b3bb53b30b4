//! Eligibility rules for the six ways of taking a piece.
//!
//! Every rule is a pure function of the defending piece, the attacking
//! pieces and (for Encounter) the occupancy of the squares between them.
//! Attackers are assumed to be on the board, of one colour, and opposed to
//! the defender; the board checks that before asking.

use crate::game::Position;
use crate::piece::Piece;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureKind {
    Encounter,
    Eruption,
    Deceit,
    TwoSidedSiege,
    ThreeSidedSiege,
    FourSidedSiege,
}

impl CaptureKind {
    /// Rules that apply to a given number of attackers, in the order they
    /// are tried.
    pub fn for_attackers(count: usize) -> &'static [CaptureKind] {
        match count {
            1 => &[CaptureKind::Encounter, CaptureKind::Eruption],
            2 => &[CaptureKind::Deceit, CaptureKind::TwoSidedSiege],
            3 => &[CaptureKind::ThreeSidedSiege],
            4 => &[CaptureKind::FourSidedSiege],
            _ => &[],
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CaptureKind::Encounter => "Encounter",
            CaptureKind::Eruption => "Eruption",
            CaptureKind::Deceit => "Deceit",
            CaptureKind::TwoSidedSiege => "2-Sided Siege",
            CaptureKind::ThreeSidedSiege => "3-Sided Siege",
            CaptureKind::FourSidedSiege => "4-Sided Siege",
        }
    }
}

impl fmt::Display for CaptureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    NotEligible,
    /// The defender leaves the board.
    Eligible,
    /// Only the sub-piece at this index leaves the composite defender.
    Partial(usize),
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        !matches!(self, Eligibility::NotEligible)
    }
}

/// Read access to which squares hold a piece.
pub trait Occupancy {
    fn is_occupied(&self, pos: Position) -> bool;
}

/// Apply `kind` to the defender. A wrong number of attackers for the rule
/// is never eligible.
pub fn check(
    kind: CaptureKind,
    defender: &Piece,
    attackers: &[&Piece],
    board: &impl Occupancy,
) -> Eligibility {
    match (kind, attackers) {
        (CaptureKind::Encounter, [attacker]) => encounter(defender, attacker, board),
        (CaptureKind::Eruption, [attacker]) => eruption(defender, attacker),
        (CaptureKind::Deceit, [first, second]) => deceit(defender, first, second),
        (CaptureKind::TwoSidedSiege, [first, second]) => two_sided_siege(defender, first, second),
        (CaptureKind::ThreeSidedSiege, [_, _, _]) => three_sided_siege(defender, attackers),
        (CaptureKind::FourSidedSiege, [_, _, _, _]) => four_sided_siege(defender, attackers),
        _ => Eligibility::NotEligible,
    }
}

/// Scan attacker-side candidate values against every defender value. The
/// first hit decides; a composite defender only loses the matched sub-piece.
fn match_values(
    defender: &Piece,
    candidates: impl IntoIterator<Item = u64>,
    matches: impl Fn(u64, u64) -> bool,
) -> Eligibility {
    let defender_values = defender.capture_values();
    for candidate in candidates {
        for (index, &value) in defender_values.iter().enumerate() {
            if matches(candidate, value as u64) {
                return if defender.is_composite() {
                    Eligibility::Partial(index)
                } else {
                    Eligibility::Eligible
                };
            }
        }
    }
    Eligibility::NotEligible
}

fn values(piece: &Piece) -> Vec<u64> {
    piece.capture_values().into_iter().map(u64::from).collect()
}

/// Every square strictly between `from` and `to` is empty. Pairs that do not
/// share a rank, file or true diagonal never have a clear path.
pub fn path_is_clear(from: Position, to: Position, board: &impl Occupancy) -> bool {
    let dr = to.row as i32 - from.row as i32;
    let dc = to.col as i32 - from.col as i32;

    if dr != 0 && dc != 0 && dr.abs() != dc.abs() {
        return false;
    }

    let steps = dr.abs().max(dc.abs());
    (1..steps).all(|step| {
        match Position::checked(
            from.row as i32 + dr.signum() * step,
            from.col as i32 + dc.signum() * step,
        ) {
            Some(pos) => !board.is_occupied(pos),
            None => false,
        }
    })
}

/// Same value across a clear straight line.
pub fn encounter(defender: &Piece, attacker: &Piece, board: &impl Occupancy) -> Eligibility {
    if !path_is_clear(attacker.position(), defender.position(), board) {
        return Eligibility::NotEligible;
    }
    match_values(defender, values(attacker), |a, d| a == d)
}

/// The defender's value is the attacker's value scaled by the number of
/// squares spanned along either axis, endpoints included.
pub fn eruption(defender: &Piece, attacker: &Piece) -> Eligibility {
    let (rows, cols) = attacker.position().distance(defender.position());
    let spans = [rows as u64 + 1, cols as u64 + 1];

    match_values(defender, values(attacker), |a, d| {
        spans.iter().any(|&s| {
            // a * s, a / s and s / a, with the divisions required to be exact
            a * s == d || d * s == a || (a != 0 && d * a == s)
        })
    })
}

/// Both attackers sit one step from the defender as a mirrored pair: above
/// and below, left and right, or both on diagonals.
fn flanks(defender: Position, first: Position, second: Position) -> bool {
    let (r1, c1) = first.distance(defender);
    let (r2, c2) = second.distance(defender);

    (r1 == 1 && r2 == 1 && c1 == 0 && c2 == 0)
        || (r1 == 1 && r2 == 1 && c1 == 1 && c2 == 1)
        || (r1 == 0 && r2 == 0 && c1 == 1 && c2 == 1)
}

/// Two flanking attackers whose values add up to the defender's.
pub fn deceit(defender: &Piece, first: &Piece, second: &Piece) -> Eligibility {
    if !flanks(defender.position(), first.position(), second.position()) {
        return Eligibility::NotEligible;
    }

    let seconds = values(second);
    let sums = values(first)
        .into_iter()
        .flat_map(|a| seconds.iter().map(move |&b| a + b))
        .collect::<Vec<_>>();

    match_values(defender, sums, |sum, d| sum == d)
}

/// A cornered defender with one attacker beside it on its rank and one on
/// its file.
pub fn two_sided_siege(defender: &Piece, first: &Piece, second: &Piece) -> Eligibility {
    let target = defender.position();
    if !target.is_corner() {
        return Eligibility::NotEligible;
    }

    let d1 = first.position().distance(target);
    let d2 = second.position().distance(target);
    if (d1 == (0, 1) && d2 == (1, 0)) || (d1 == (1, 0) && d2 == (0, 1)) {
        Eligibility::Eligible
    } else {
        Eligibility::NotEligible
    }
}

/// A defender on a non-corner edge with three attackers each one step away
/// along exactly one axis.
pub fn three_sided_siege(defender: &Piece, attackers: &[&Piece]) -> Eligibility {
    let target = defender.position();
    if attackers.len() != 3 || !target.is_edge() {
        return Eligibility::NotEligible;
    }

    let distances = attackers
        .iter()
        .map(|attacker| attacker.position().distance(target))
        .collect::<Vec<_>>();
    let total: usize = distances.iter().map(|(r, c)| r + c).sum();
    let each_adjacent = distances.iter().all(|&(r, c)| (r == 1) ^ (c == 1));

    if total <= 6 && each_adjacent {
        Eligibility::Eligible
    } else {
        Eligibility::NotEligible
    }
}

/// All four orthogonal neighbours are the attackers, in any order.
pub fn four_sided_siege(defender: &Piece, attackers: &[&Piece]) -> Eligibility {
    let mut neighbors = defender.position().orthogonal_neighbors();
    if attackers.len() != 4 || neighbors.len() != 4 {
        return Eligibility::NotEligible;
    }

    let mut positions = attackers
        .iter()
        .map(|attacker| attacker.position())
        .collect::<Vec<_>>();
    neighbors.sort();
    positions.sort();

    if neighbors == positions {
        Eligibility::Eligible
    } else {
        Eligibility::NotEligible
    }
}
