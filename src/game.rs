//! Game session: turn progression on top of the rules engine.
//!
//! A [`Game`] owns the board, the side to move and the live capture tree.
//! Turn flow:
//!
//! ```text
//! awaiting move -> apply -> { chained capture (same piece) | turn switch }
//! ```
//!
//! When the side to move has a capture, only moves matching a child of the
//! current capture tree node are accepted. A capture whose node still has
//! children keeps the turn with the same piece. At the end of a turn the moved
//! piece may be crowned, the side switches and the capture tree is rebuilt.
//!
//! In challenge mode the game follows a scripted list of moves instead: the
//! player must find each expected move, and the opponent's replies are
//! played with [`Game::auto_play`].

use thiserror::Error;

use crate::board::{Board, CellId, Team, str_cell};
use crate::capture_tree::{CaptureNode, build_capture_tree};
use crate::movegen::{Move, apply_move, has_any_legal_move, is_simple_move_legal, team_simple_moves};
use crate::rules::Rules;

/// Why a move was rejected. A rejected move never changes the game state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("game is over")]
    GameOver,
    #[error("no piece on cell {}", .0 + 1)]
    NoPiece(CellId),
    #[error("it is {0}'s turn")]
    WrongTeam(Team),
    #[error("cell {} is occupied", .0 + 1)]
    Occupied(CellId),
    #[error("the piece on cell {} must keep capturing", .0 + 1)]
    MustContinueChain(CellId),
    #[error("a capture is mandatory")]
    CaptureRequired,
    #[error("illegal move")]
    Illegal,
    #[error("not the expected move")]
    UnexpectedMove,
    #[error("moves of {0} are played automatically")]
    ScriptedTurn(Team),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ongoing,
    /// The other side has no legal move left.
    Won(Team),
    ChallengeCompleted,
}

/// Result of an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The piece now on this cell must capture again.
    Chained(CellId),
    /// The turn passed to the other side.
    TurnEnded { promoted: bool },
}

#[derive(Debug, Clone)]
struct Challenge {
    player: Team,
    moves: Vec<Move>,
    next: usize,
}

#[derive(Debug, Clone)]
pub struct Game {
    rules: Rules,
    board: Board,
    to_move: Team,
    capture_tree: CaptureNode,
    /// Path of child indices from the root to the current capture node.
    cursor: Vec<usize>,
    chaining_piece: Option<CellId>,
    last_move: Option<Move>,
    status: Status,
    challenge: Option<Challenge>,
}

impl Game {
    /// A new game from the opening position.
    pub fn new(rules: Rules) -> Self {
        Self::with_board(rules, rules.opening_board())
    }

    /// A new game from an arbitrary position, `rules.starting_team` to move.
    pub fn with_board(rules: Rules, board: Board) -> Self {
        let mut game = Game {
            rules,
            board,
            to_move: rules.starting_team,
            capture_tree: CaptureNode::root(),
            cursor: Vec::new(),
            chaining_piece: None,
            last_move: None,
            status: Status::Ongoing,
            challenge: None,
        };
        game.start_turn();
        game
    }

    /// A puzzle where `player` must reproduce the scripted `moves`.
    pub fn challenge(rules: Rules, board: Board, player: Team, moves: Vec<Move>) -> Self {
        let mut game = Self::with_board(rules, board);
        game.challenge = Some(Challenge {
            player,
            moves,
            next: 0,
        });
        game.update_status();
        game
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_move(&self) -> Team {
        self.to_move
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    pub fn chaining_piece(&self) -> Option<CellId> {
        self.chaining_piece
    }

    pub fn capture_tree(&self) -> &CaptureNode {
        &self.capture_tree
    }

    /// Capture tree node reached by the captures played so far this turn.
    pub fn current_node(&self) -> &CaptureNode {
        self.capture_tree
            .descend(&self.cursor)
            .unwrap_or(&self.capture_tree)
    }

    pub fn is_capture_forced(&self) -> bool {
        !self.current_node().is_leaf()
    }

    pub fn is_challenge(&self) -> bool {
        self.challenge.is_some()
    }

    /// Every move the side to move may play right now.
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.status != Status::Ongoing {
            return Vec::new();
        }
        if self.is_capture_forced() {
            return self
                .current_node()
                .children
                .iter()
                .filter_map(CaptureNode::mv)
                .collect();
        }
        team_simple_moves(&self.board, &self.rules, self.to_move)
    }

    /// Destinations reachable by the piece on `source` right now.
    pub fn legal_destinations(&self, source: CellId) -> Vec<CellId> {
        self.legal_moves()
            .into_iter()
            .filter(|m| m.source == source)
            .map(|m| m.destination)
            .collect()
    }

    /// Whether `source -> destination` would be accepted by [`Game::play`].
    pub fn is_move_valid(&self, source: CellId, destination: CellId) -> bool {
        self.check_move(source, destination).is_ok()
    }

    /// Play a move for the side to move.
    pub fn play(&mut self, source: CellId, destination: CellId) -> Result<MoveOutcome, MoveError> {
        let mv = match self.check_move(source, destination) {
            Ok(mv) => mv,
            Err(err) => {
                tracing::debug!(
                    source = %str_cell(source),
                    destination = %str_cell(destination),
                    %err,
                    "rejected move"
                );
                return Err(err);
            }
        };
        if self.challenge.is_some() {
            return Ok(self.advance_script(mv));
        }

        apply_move(&mut self.board, mv);
        if mv.is_capture() {
            if let Some(idx) = self.current_node().find_child(source, destination) {
                self.cursor.push(idx);
            }
            if self.is_capture_forced() {
                self.chaining_piece = Some(destination);
                return Ok(MoveOutcome::Chained(destination));
            }
        }
        Ok(self.end_turn(mv))
    }

    /// Play the next scripted move of the non-player side in challenge mode.
    /// Returns `None` when it is not the script's turn.
    pub fn auto_play(&mut self) -> Option<MoveOutcome> {
        let challenge = self.challenge.as_ref()?;
        if self.status != Status::Ongoing || self.to_move == challenge.player {
            return None;
        }
        let mv = *challenge.moves.get(challenge.next)?;
        Some(self.advance_script(mv))
    }

    /// Validate a move and resolve it to a complete move record.
    fn check_move(&self, source: CellId, destination: CellId) -> Result<Move, MoveError> {
        if self.status != Status::Ongoing {
            return Err(MoveError::GameOver);
        }
        let piece = self.board.get(source).ok_or(MoveError::NoPiece(source))?;
        if piece.team() != self.to_move {
            return Err(MoveError::WrongTeam(self.to_move));
        }
        if !self.board.is_empty(destination) {
            return Err(MoveError::Occupied(destination));
        }

        if let Some(challenge) = &self.challenge {
            if self.to_move != challenge.player {
                return Err(MoveError::ScriptedTurn(self.to_move));
            }
            return match challenge.moves.get(challenge.next) {
                Some(&mv) if mv.source == source && mv.destination == destination => Ok(mv),
                _ => Err(MoveError::UnexpectedMove),
            };
        }

        if let Some(piece_cell) = self.chaining_piece {
            if piece_cell != source {
                return Err(MoveError::MustContinueChain(piece_cell));
            }
        }
        let node = self.current_node();
        if !node.is_leaf() {
            return node
                .find_child(source, destination)
                .and_then(|idx| node.children[idx].mv())
                .ok_or(MoveError::CaptureRequired);
        }
        if is_simple_move_legal(&self.board, &self.rules, source, destination) {
            Ok(Move::simple(source, destination))
        } else {
            Err(MoveError::Illegal)
        }
    }

    fn advance_script(&mut self, mv: Move) -> MoveOutcome {
        apply_move(&mut self.board, mv);
        let Some(challenge) = self.challenge.as_mut() else {
            return self.end_turn(mv);
        };
        challenge.next += 1;
        let chained = challenge
            .moves
            .get(challenge.next)
            .is_some_and(|next| next.source == mv.destination);
        if challenge.next == challenge.moves.len() {
            self.last_move = Some(mv);
            self.update_status();
            return MoveOutcome::TurnEnded { promoted: false };
        }
        if chained {
            self.chaining_piece = Some(mv.destination);
            return MoveOutcome::Chained(mv.destination);
        }
        self.end_turn(mv)
    }

    fn end_turn(&mut self, mv: Move) -> MoveOutcome {
        let promoted = self.rules.promote_if_crowned(&mut self.board, mv.destination);
        self.last_move = Some(mv);
        self.to_move = self.to_move.opponent();
        self.start_turn();
        MoveOutcome::TurnEnded { promoted }
    }

    /// Drop the old capture tree and build the one for the side to move.
    fn start_turn(&mut self) {
        self.chaining_piece = None;
        self.cursor.clear();
        self.capture_tree = build_capture_tree(&self.board, &self.rules, self.to_move);
        self.update_status();
    }

    fn update_status(&mut self) {
        if self.status != Status::Ongoing {
            return;
        }
        if let Some(challenge) = &self.challenge {
            if challenge.next == challenge.moves.len() {
                self.status = Status::ChallengeCompleted;
                tracing::info!("challenge completed");
                return;
            }
        }
        if !has_any_legal_move(&self.board, &self.rules, self.to_move) {
            let winner = self.to_move.opponent();
            self.status = Status::Won(winner);
            tracing::info!(%winner, "game over");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Coord, Piece};

    fn at(rules: &Rules, x: i16, y: i16) -> CellId {
        rules
            .geometry()
            .position_to_cell(Coord::new(x, y))
            .expect("dark square")
    }

    fn board_with(rules: &Rules, pieces: &[(i16, i16, Piece)]) -> Board {
        let mut board = Board::empty(rules.geometry());
        for &(x, y, piece) in pieces {
            board.set(at(rules, x, y), Some(piece));
        }
        board
    }

    #[test]
    fn test_new_game() {
        let game = Game::new(Rules::default());
        assert_eq!(game.to_move(), Team::White);
        assert_eq!(game.status(), Status::Ongoing);
        assert!(!game.is_capture_forced());
        // 4 front-row peons; the edge one has a single move
        assert_eq!(game.legal_moves().len(), 7);
    }

    #[test]
    fn test_simple_move_switches_turn() {
        let rules = Rules::default();
        let mut game = Game::new(rules);
        let (src, dst) = (at(&rules, 1, 2), at(&rules, 0, 3));
        assert!(game.is_move_valid(src, dst));
        assert_eq!(game.play(src, dst), Ok(MoveOutcome::TurnEnded { promoted: false }));
        assert_eq!(game.to_move(), Team::Black);
        assert_eq!(game.last_move(), Some(Move::simple(src, dst)));
    }

    #[test]
    fn test_rejections_leave_state_unchanged() {
        let rules = Rules::default();
        let mut game = Game::new(rules);
        let before = *game.board();
        assert_eq!(game.play(at(&rules, 0, 3), at(&rules, 1, 4)), Err(MoveError::NoPiece(at(&rules, 0, 3))));
        assert_eq!(
            game.play(at(&rules, 0, 5), at(&rules, 1, 4)),
            Err(MoveError::WrongTeam(Team::White))
        );
        assert_eq!(game.play(at(&rules, 1, 0), at(&rules, 0, 1)), Err(MoveError::Occupied(at(&rules, 0, 1))));
        assert_eq!(game.play(at(&rules, 1, 2), at(&rules, 3, 4)), Err(MoveError::Illegal));
        assert_eq!(*game.board(), before);
        assert_eq!(game.to_move(), Team::White);
    }

    #[test]
    fn test_capture_is_mandatory() {
        let rules = Rules::default();
        let board = board_with(
            &rules,
            &[
                (2, 1, Piece::WhitePeon),
                (3, 2, Piece::BlackPeon),
                (6, 1, Piece::WhitePeon),
                (0, 7, Piece::BlackPeon),
            ],
        );
        let mut game = Game::with_board(rules, board);
        assert!(game.is_capture_forced());
        assert_eq!(game.play(at(&rules, 6, 1), at(&rules, 7, 2)), Err(MoveError::CaptureRequired));
        assert_eq!(game.legal_destinations(at(&rules, 2, 1)), vec![at(&rules, 4, 3)]);
        assert_eq!(
            game.play(at(&rules, 2, 1), at(&rules, 4, 3)),
            Ok(MoveOutcome::TurnEnded { promoted: false })
        );
        assert!(game.board().is_empty(at(&rules, 3, 2)));
    }

    #[test]
    fn test_chained_capture_keeps_turn() {
        let rules = Rules::default();
        let board = board_with(
            &rules,
            &[
                (0, 1, Piece::WhitePeon),
                (1, 2, Piece::BlackPeon),
                (3, 4, Piece::BlackPeon),
                (6, 1, Piece::WhitePeon),
                (7, 0, Piece::BlackPeon),
            ],
        );
        let mut game = Game::with_board(rules, board);
        assert_eq!(
            game.play(at(&rules, 0, 1), at(&rules, 2, 3)),
            Ok(MoveOutcome::Chained(at(&rules, 2, 3)))
        );
        assert_eq!(game.to_move(), Team::White);
        assert_eq!(
            game.play(at(&rules, 6, 1), at(&rules, 5, 2)),
            Err(MoveError::MustContinueChain(at(&rules, 2, 3)))
        );
        assert_eq!(
            game.play(at(&rules, 2, 3), at(&rules, 4, 5)),
            Ok(MoveOutcome::TurnEnded { promoted: false })
        );
        assert_eq!(game.to_move(), Team::Black);
        assert_eq!(game.board().count(Team::Black), 1);
    }

    #[test]
    fn test_promotion_at_end_of_turn() {
        let rules = Rules::default();
        let board = board_with(&rules, &[(1, 6, Piece::WhitePeon), (7, 0, Piece::BlackPeon), (4, 1, Piece::BlackPeon)]);
        let mut game = Game::with_board(rules, board);
        let dst = at(&rules, 0, 7);
        assert_eq!(game.play(at(&rules, 1, 6), dst), Ok(MoveOutcome::TurnEnded { promoted: true }));
        assert_eq!(game.board().get(dst), Some(Piece::WhiteQueen));
    }

    #[test]
    fn test_win_when_opponent_is_stuck() {
        let rules = Rules::default();
        let board = board_with(&rules, &[(2, 5, Piece::WhitePeon), (3, 6, Piece::BlackPeon)]);
        let mut game = Game::with_board(rules, board);
        assert_eq!(
            game.play(at(&rules, 2, 5), at(&rules, 4, 7)),
            Ok(MoveOutcome::TurnEnded { promoted: true })
        );
        assert_eq!(game.status(), Status::Won(Team::White));
        assert!(game.legal_moves().is_empty());
        assert_eq!(game.play(at(&rules, 4, 7), at(&rules, 3, 6)), Err(MoveError::GameOver));
    }

    #[test]
    fn test_challenge_flow() {
        let rules = Rules::default();
        let board = board_with(
            &rules,
            &[
                (0, 1, Piece::WhitePeon),
                (1, 2, Piece::BlackPeon),
                (3, 4, Piece::BlackPeon),
                (7, 6, Piece::BlackPeon),
            ],
        );
        let moves = vec![
            Move::capture(at(&rules, 0, 1), at(&rules, 2, 3), at(&rules, 1, 2)),
            Move::capture(at(&rules, 2, 3), at(&rules, 4, 5), at(&rules, 3, 4)),
            Move::simple(at(&rules, 7, 6), at(&rules, 6, 5)),
            Move::simple(at(&rules, 4, 5), at(&rules, 5, 6)),
        ];
        let mut game = Game::challenge(rules, board, Team::White, moves);
        assert!(game.is_challenge());
        assert_eq!(game.auto_play(), None);
        assert_eq!(game.play(at(&rules, 0, 1), at(&rules, 1, 2)), Err(MoveError::Occupied(at(&rules, 1, 2))));
        assert_eq!(game.play(at(&rules, 0, 1), at(&rules, 1, 0)), Err(MoveError::UnexpectedMove));
        assert_eq!(
            game.play(at(&rules, 0, 1), at(&rules, 2, 3)),
            Ok(MoveOutcome::Chained(at(&rules, 2, 3)))
        );
        assert_eq!(
            game.play(at(&rules, 2, 3), at(&rules, 4, 5)),
            Ok(MoveOutcome::TurnEnded { promoted: false })
        );
        assert_eq!(
            game.play(at(&rules, 7, 6), at(&rules, 6, 5)),
            Err(MoveError::ScriptedTurn(Team::Black))
        );
        assert_eq!(game.auto_play(), Some(MoveOutcome::TurnEnded { promoted: false }));
        assert_eq!(game.status(), Status::Ongoing);
        game.play(at(&rules, 4, 5), at(&rules, 5, 6)).expect("scripted move");
        assert_eq!(game.status(), Status::ChallengeCompleted);
    }
}
