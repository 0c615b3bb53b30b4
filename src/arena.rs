use crate::board::{Board, CaptureOutcome, CaptureReport, RansomDecision};
use crate::controller::{CaptureOrder, Controller, MoveOrder, RansomOrder, ScriptedController};
use crate::game::{Color, GameError, Position};
use log::{info, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Captures a side needs to win
    pub win_threshold: u32,
    pub max_turns: usize,
    /// Rejected moves allowed in one turn before the side forfeits
    pub max_rejections: usize,
    /// Log the board after every turn
    pub show_board: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            win_threshold: 5,
            max_turns: 200,
            max_rejections: 3,
            show_board: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    Win {
        winner: Color,
        winner_name: String,
        turns: usize,
    },
    Draw {
        turns: usize,
    },
    Forfeit {
        violator: String,
        winner: String,
    },
}

impl MatchResult {
    pub fn winner(&self) -> Option<&str> {
        match self {
            MatchResult::Win { winner_name, .. } => Some(winner_name),
            MatchResult::Forfeit { winner, .. } => Some(winner),
            MatchResult::Draw { .. } => None,
        }
    }
}

/// A full match description: configuration plus both sides' orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchScript {
    #[serde(default)]
    pub config: MatchConfig,
    pub black: ScriptedController,
    pub white: ScriptedController,
}

impl MatchScript {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn into_match(self) -> Match {
        Match::new(Box::new(self.black), Box::new(self.white), self.config)
    }
}

pub struct Match {
    config: MatchConfig,
    board: Board,
    black: Box<dyn Controller>,
    white: Box<dyn Controller>,
    turn: Color,
    turns: usize,
}

impl Match {
    pub fn new(black: Box<dyn Controller>, white: Box<dyn Controller>, config: MatchConfig) -> Self {
        let board = Board::new(config.win_threshold);
        Self::with_board(black, white, config, board)
    }

    /// Play from a prepared position. The board keeps its own win threshold.
    pub fn with_board(
        black: Box<dyn Controller>,
        white: Box<dyn Controller>,
        config: MatchConfig,
        board: Board,
    ) -> Self {
        Match {
            config,
            board,
            black,
            white,
            turn: Color::Black,
            turns: 0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turns(&self) -> usize {
        self.turns
    }

    fn controller(&mut self, color: Color) -> &mut Box<dyn Controller> {
        match color {
            Color::Black => &mut self.black,
            Color::White => &mut self.white,
        }
    }

    pub fn play(&mut self) -> MatchResult {
        self.black.game_start(Color::Black);
        self.white.game_start(Color::White);

        info!("Match starting:");
        info!("  Black: {}", self.black.name());
        info!("  White: {}", self.white.name());
        info!("  Captures to win: {}", self.board.win_threshold());

        while !self.board.game_ended() && self.turns < self.config.max_turns {
            if let Some(result) = self.play_turn() {
                self.black.game_end();
                self.white.game_end();
                return result;
            }
        }

        self.black.game_end();
        self.white.game_end();

        match self.board.winner() {
            Some(winner) => {
                let winner_name = self.controller(winner).name().to_string();
                info!("{} wins as {} after {} turns!", winner_name, winner, self.turns);
                MatchResult::Win {
                    winner,
                    winner_name,
                    turns: self.turns,
                }
            }
            None => {
                info!("Max turns ({}) reached - Draw!", self.config.max_turns);
                MatchResult::Draw { turns: self.turns }
            }
        }
    }

    fn play_turn(&mut self) -> Option<MatchResult> {
        let mover = self.turn;
        let mut rejections = 0;

        loop {
            let (controller, board) = match mover {
                Color::Black => (&mut self.black, &self.board),
                Color::White => (&mut self.white, &self.board),
            };

            info!("Turn {}: {} ({}) to play", self.turns + 1, controller.name(), mover);

            let turn = match controller.next_turn(board, mover) {
                Some(turn) => turn,
                None => {
                    let violator = controller.name().to_string();
                    let winner = self.controller(mover.opponent()).name().to_string();
                    info!("{} has no more orders and forfeits", violator);
                    return Some(MatchResult::Forfeit { violator, winner });
                }
            };

            match self.apply_move(&turn.mv, mover) {
                Ok(to) => {
                    info!("{} moved {} {:?} to {}", mover, turn.mv.amount, turn.mv.direction, to);
                    if let Some(order) = &turn.capture {
                        self.apply_capture(order, mover);
                    }
                    break;
                }
                Err(e) => {
                    warn!("Invalid move: {}", e);
                    self.controller(mover).rejected(&e);
                    rejections += 1;
                    if rejections >= self.config.max_rejections {
                        let violator = self.controller(mover).name().to_string();
                        let winner = self.controller(mover.opponent()).name().to_string();
                        info!("{} forfeits after {} rejected moves", violator, rejections);
                        return Some(MatchResult::Forfeit { violator, winner });
                    }
                }
            }
        }

        if self.config.show_board {
            info!("\n{}", self.board.display_board());
        }

        self.turn = mover.opponent();
        self.turns += 1;
        None
    }

    fn apply_move(&mut self, order: &MoveOrder, mover: Color) -> Result<Position, GameError> {
        let from = order.from.to_position()?;
        self.board
            .move_piece(from, order.amount, order.direction, mover)
    }

    fn apply_capture(&mut self, order: &CaptureOrder, mover: Color) {
        let outcome = order
            .attackers
            .iter()
            .map(|coord| coord.to_position())
            .collect::<Result<Vec<_>, _>>()
            .and_then(|attackers| {
                let target = order.target.to_position()?;
                self.board.capture(&attackers, target, mover)
            });

        let report = match outcome {
            Ok(CaptureOutcome::Completed(report)) => report,
            Ok(CaptureOutcome::RansomRequired(pending)) => {
                let owner = pending.owner();
                info!("{}'s composite is threatened, asking for ransom", owner);

                loop {
                    let (controller, board) = match owner {
                        Color::Black => (&mut self.black, &self.board),
                        Color::White => (&mut self.white, &self.board),
                    };

                    let decision = match controller.ransom(board, &pending) {
                        RansomOrder::Decline => Ok(RansomDecision::Decline),
                        RansomOrder::Pay(coord) => coord
                            .to_position()
                            .map(RansomDecision::Pay)
                            .map_err(|_| GameError::InvalidRansom(format!("{} is off the board", coord))),
                    };

                    match decision.and_then(|decision| self.board.resolve_ransom(&pending, decision)) {
                        Ok(report) => break report,
                        Err(e @ GameError::InvalidRansom(_)) => {
                            warn!("{}", e);
                            self.controller(owner).rejected(&e);
                        }
                        Err(e) => {
                            warn!("Capture abandoned: {}", e);
                            return;
                        }
                    }
                }
            }
            Err(e) => {
                warn!("Invalid capture: {}", e);
                self.controller(mover).rejected(&e);
                return;
            }
        };

        self.record_capture(&report, mover);
    }

    fn record_capture(&mut self, report: &CaptureReport, mover: Color) {
        self.board.increment_captured(mover);
        info!(
            "{} captured at {} by {} ({} of {})",
            mover,
            report.target,
            report.kind,
            self.board.captures_by(mover),
            self.board.win_threshold()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Turn;
    use crate::game::{DisplayCoord, Direction, Shape};
    use crate::piece::Piece;

    fn step(col: i32, row: i32, amount: usize, direction: Direction) -> Turn {
        Turn::new(MoveOrder {
            from: DisplayCoord::new(col, row),
            amount,
            direction,
        })
    }

    fn take(attackers: &[(i32, i32)], target: (i32, i32)) -> CaptureOrder {
        CaptureOrder {
            attackers: attackers
                .iter()
                .map(|&(col, row)| DisplayCoord::new(col, row))
                .collect(),
            target: DisplayCoord::new(target.0, target.1),
        }
    }

    fn place(board: &mut Board, col: i32, row: i32, piece: (u32, Shape, Color)) {
        let pos = DisplayCoord::new(col, row).to_position().unwrap();
        board
            .place(pos, Piece::new(piece.0, piece.1, piece.2, pos).unwrap())
            .unwrap();
    }

    fn scripted(name: &str, turns: Vec<Turn>) -> ScriptedController {
        ScriptedController::new(name.to_string()).with_turns(turns)
    }

    #[test]
    fn test_capture_reaching_threshold_wins() {
        let mut board = Board::empty(1);
        place(&mut board, 6, 8, (9, Shape::Circle, Color::Black));
        place(&mut board, 6, 5, (9, Shape::Triangle, Color::White));

        let black = scripted(
            "Black",
            vec![step(6, 8, 1, Direction::Down).with_capture(take(&[(6, 7)], (6, 5)))],
        );
        let white = scripted("White", vec![]);

        let mut game = Match::with_board(
            Box::new(black),
            Box::new(white),
            MatchConfig::default(),
            board,
        );
        let result = game.play();

        assert_eq!(
            result,
            MatchResult::Win {
                winner: Color::Black,
                winner_name: "Black".to_string(),
                turns: 1,
            }
        );
        assert_eq!(game.board().count(Color::White), 0);
        assert_eq!(game.board().captures_by(Color::Black), 1);
    }

    #[test]
    fn test_rejected_move_is_asked_again() {
        let mut board = Board::empty(3);
        place(&mut board, 1, 1, (4, Shape::Triangle, Color::Black));
        place(&mut board, 8, 16, (4, Shape::Circle, Color::White));

        let black = scripted(
            "Black",
            vec![
                // Triangles move two squares
                step(1, 1, 1, Direction::Up),
                step(1, 1, 2, Direction::Up),
            ],
        );
        let white = scripted("White", vec![step(8, 16, 1, Direction::Down)]);

        let mut game = Match::with_board(
            Box::new(black),
            Box::new(white),
            MatchConfig::default(),
            board,
        );
        let result = game.play();

        // Black forfeits on the third turn with nothing left to play
        assert_eq!(
            result,
            MatchResult::Forfeit {
                violator: "Black".to_string(),
                winner: "White".to_string(),
            }
        );
        assert_eq!(game.turns(), 2);
        let moved = DisplayCoord::new(1, 3).to_position().unwrap();
        assert_eq!(game.board().get_piece(moved).unwrap().value(), 4);
    }

    #[test]
    fn test_repeated_illegal_moves_forfeit() {
        let mut board = Board::empty(3);
        place(&mut board, 1, 1, (4, Shape::Circle, Color::Black));
        place(&mut board, 8, 16, (4, Shape::Circle, Color::White));
        let before = board.clone();

        let black = scripted(
            "Black",
            vec![
                step(1, 1, 2, Direction::Up),
                step(1, 1, 2, Direction::Up),
                step(1, 1, 1, Direction::Up),
            ],
        );
        let white = scripted("White", vec![step(8, 16, 1, Direction::Down)]);
        let config = MatchConfig {
            max_rejections: 2,
            ..MatchConfig::default()
        };

        let mut game = Match::with_board(Box::new(black), Box::new(white), config, board);

        assert_eq!(
            game.play(),
            MatchResult::Forfeit {
                violator: "Black".to_string(),
                winner: "White".to_string(),
            }
        );
        assert_eq!(game.turns(), 0);
        assert_eq!(game.board(), &before);
    }

    #[test]
    fn test_max_turns_is_a_draw() {
        let mut board = Board::empty(3);
        place(&mut board, 1, 1, (4, Shape::Circle, Color::Black));
        place(&mut board, 8, 16, (4, Shape::Circle, Color::White));

        let black = scripted(
            "Black",
            vec![step(1, 1, 1, Direction::Up), step(1, 2, 1, Direction::Down)],
        );
        let white = scripted(
            "White",
            vec![step(8, 16, 1, Direction::Down), step(8, 15, 1, Direction::Up)],
        );
        let config = MatchConfig {
            max_turns: 4,
            ..MatchConfig::default()
        };

        let mut game = Match::with_board(Box::new(black), Box::new(white), config, board);

        assert_eq!(game.play(), MatchResult::Draw { turns: 4 });
        assert_eq!(game.board().captures_by(Color::Black), 0);
    }

    #[test]
    fn test_failed_capture_still_passes_turn() {
        let mut board = Board::empty(3);
        place(&mut board, 4, 8, (3, Shape::Circle, Color::Black));
        place(&mut board, 4, 5, (10, Shape::Circle, Color::White));

        let black = scripted(
            "Black",
            vec![step(4, 8, 1, Direction::Down).with_capture(take(&[(4, 7)], (4, 5)))],
        );
        let white = scripted("White", vec![]);

        let mut game = Match::with_board(
            Box::new(black),
            Box::new(white),
            MatchConfig::default(),
            board,
        );

        assert_eq!(
            game.play(),
            MatchResult::Forfeit {
                violator: "White".to_string(),
                winner: "Black".to_string(),
            }
        );
        assert_eq!(game.board().count(Color::White), 1);
        assert_eq!(game.board().captures_by(Color::Black), 0);
    }

    #[test]
    fn test_ransom_is_asked_until_valid() {
        let mut board = Board::empty(1);
        place(&mut board, 6, 8, (25, Shape::Circle, Color::Black));
        let composite = DisplayCoord::new(6, 5).to_position().unwrap();
        board
            .place(composite, Piece::composite(Color::White, composite))
            .unwrap();
        place(&mut board, 1, 1, (289, Shape::Square, Color::White));

        let black = scripted(
            "Black",
            vec![step(6, 8, 1, Direction::Down).with_capture(take(&[(6, 7)], (6, 5)))],
        );
        let white = scripted("White", vec![]).with_ransoms([
            RansomOrder::Pay(DisplayCoord::new(9, 1)),
            RansomOrder::Pay(DisplayCoord::new(2, 2)),
            RansomOrder::Pay(DisplayCoord::new(1, 1)),
        ]);

        let mut game = Match::with_board(
            Box::new(black),
            Box::new(white),
            MatchConfig::default(),
            board,
        );
        let result = game.play();

        assert_eq!(result.winner(), Some("Black"));
        let spared = game.board().get_piece(composite).unwrap();
        assert_eq!(spared.as_composite().unwrap().len(), 5);
        assert_eq!(game.board().get_piece_display(DisplayCoord::new(1, 1)), None);
    }

    #[test]
    fn test_declined_ransom_takes_sub_piece() {
        let mut board = Board::empty(1);
        place(&mut board, 6, 8, (25, Shape::Circle, Color::Black));
        let composite = DisplayCoord::new(6, 5).to_position().unwrap();
        board
            .place(composite, Piece::composite(Color::White, composite))
            .unwrap();

        let black = scripted(
            "Black",
            vec![step(6, 8, 1, Direction::Down).with_capture(take(&[(6, 7)], (6, 5)))],
        );
        let white = scripted("White", vec![]);

        let mut game = Match::with_board(
            Box::new(black),
            Box::new(white),
            MatchConfig::default(),
            board,
        );
        game.play();

        let remaining = game.board().get_piece(composite).unwrap();
        assert_eq!(remaining.capture_values(), vec![16, 36, 49, 64]);
        assert_eq!(game.board().captures_by(Color::Black), 1);
    }

    #[test]
    fn test_script_from_json() {
        let script = MatchScript::from_json(
            r#"{
                "config": { "win_threshold": 2 },
                "black": {
                    "name": "Opening",
                    "turns": [
                        { "move": { "from": { "col": 3, "row": 13 }, "amount": 1, "direction": "down" } }
                    ]
                },
                "white": { "turns": [] }
            }"#,
        )
        .unwrap();

        assert_eq!(script.config.win_threshold, 2);
        assert_eq!(script.config.max_turns, 200);

        let mut game = script.into_match();
        assert_eq!(game.board().win_threshold(), 2);
        assert_eq!(
            game.play(),
            MatchResult::Forfeit {
                violator: "Scripted".to_string(),
                winner: "Opening".to_string(),
            }
        );
    }
}
