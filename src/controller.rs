use crate::board::{Board, PendingCapture};
use crate::game::{Color, DisplayCoord, Direction, GameError};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Move the piece on `from` by `amount` squares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveOrder {
    pub from: DisplayCoord,
    pub amount: usize,
    pub direction: Direction,
}

/// Take the piece on `target` with the pieces on `attackers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureOrder {
    pub attackers: Vec<DisplayCoord>,
    pub target: DisplayCoord,
}

/// One turn: a move, optionally followed by a capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    #[serde(rename = "move")]
    pub mv: MoveOrder,
    #[serde(default)]
    pub capture: Option<CaptureOrder>,
}

impl Turn {
    pub fn new(mv: MoveOrder) -> Self {
        Turn { mv, capture: None }
    }

    pub fn with_capture(mut self, capture: CaptureOrder) -> Self {
        self.capture = Some(capture);
        self
    }
}

/// Answer to a ransom demand on the controller's composite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RansomOrder {
    Decline,
    Pay(DisplayCoord),
}

/// Trait for whatever sits on one side of the board and issues orders
pub trait Controller {
    /// Get the name of the controller
    fn name(&self) -> &str;

    /// Get the next turn for `color`, `None` to give up
    fn next_turn(&mut self, board: &Board, color: Color) -> Option<Turn>;

    /// Decide whether to ransom the composite threatened by `pending`.
    /// Asked again until the answer is acceptable.
    fn ransom(&mut self, board: &Board, pending: &PendingCapture) -> RansomOrder;

    /// Notified when the game starts
    fn game_start(&mut self, _color: Color) {}

    /// Notified when an order was refused
    fn rejected(&mut self, _error: &GameError) {}

    /// Notified when the game ends
    fn game_end(&mut self) {}
}

fn default_name() -> String {
    "Scripted".to_string()
}

/// Plays back a fixed list of turns and ransom answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedController {
    #[serde(default = "default_name")]
    name: String,
    #[serde(default)]
    turns: VecDeque<Turn>,
    /// Declines once this runs out.
    #[serde(default)]
    ransoms: VecDeque<RansomOrder>,
    #[serde(skip)]
    rejections: Vec<GameError>,
}

impl ScriptedController {
    pub fn new(name: String) -> Self {
        ScriptedController {
            name,
            turns: VecDeque::new(),
            ransoms: VecDeque::new(),
            rejections: Vec::new(),
        }
    }

    pub fn with_turns(mut self, turns: impl IntoIterator<Item = Turn>) -> Self {
        self.turns.extend(turns);
        self
    }

    pub fn with_ransoms(mut self, ransoms: impl IntoIterator<Item = RansomOrder>) -> Self {
        self.ransoms.extend(ransoms);
        self
    }

    pub fn remaining_turns(&self) -> usize {
        self.turns.len()
    }

    /// Every refusal reported so far, oldest first.
    pub fn rejections(&self) -> &[GameError] {
        &self.rejections
    }
}

impl Controller for ScriptedController {
    fn name(&self) -> &str {
        &self.name
    }

    fn next_turn(&mut self, _board: &Board, _color: Color) -> Option<Turn> {
        self.turns.pop_front()
    }

    fn ransom(&mut self, _board: &Board, _pending: &PendingCapture) -> RansomOrder {
        self.ransoms.pop_front().unwrap_or(RansomOrder::Decline)
    }

    fn rejected(&mut self, error: &GameError) {
        self.rejections.push(error.clone());
    }
}
