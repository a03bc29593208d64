//! Move representation, move application and move generation.
//!
//! Two families of moves exist:
//! - simple moves, one diagonal step (or a free slide for flying queens);
//! - captures, which jump over exactly one opposing piece.
//!
//! Generation order is stable: by source cell id, then by direction index
//! (see [`DIRECTIONS`]), then by increasing landing distance.

use crate::board::{Board, CellId, Coord, Geometry, Team};
use crate::constants::DIRECTIONS;
use crate::rules::Rules;

/// A move record. `capture` holds the cell of the captured piece, which for a
/// flying queen is not necessarily adjacent to either end of the move.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub source: CellId,
    pub destination: CellId,
    pub capture: Option<CellId>,
}

impl Move {
    pub fn simple(source: CellId, destination: CellId) -> Self {
        Self {
            source,
            destination,
            capture: None,
        }
    }

    pub fn capture(source: CellId, destination: CellId, captured: CellId) -> Self {
        Self {
            source,
            destination,
            capture: Some(captured),
        }
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        self.capture.is_some()
    }

    /// Unit diagonal direction from source to destination.
    pub fn direction(&self, geometry: &Geometry) -> Coord {
        let from = geometry.cell_to_position(self.source);
        let to = geometry.cell_to_position(self.destination);
        Coord::new((to.x - from.x).signum(), (to.y - from.y).signum())
    }
}

#[inline]
fn directions() -> impl Iterator<Item = Coord> {
    DIRECTIONS.iter().map(|&(dx, dy)| Coord::new(dx, dy))
}

/// Apply a move to a board: relocate the piece and remove the captured one.
/// Promotion is not applied here.
pub fn apply_move(board: &mut Board, mv: Move) {
    let piece = board.get(mv.source);
    board.set(mv.destination, piece);
    board.set(mv.source, None);
    if let Some(captured) = mv.capture {
        board.set(captured, None);
    }
}

// =============================================================================
// Captures
// =============================================================================

/// All captures available to the piece on `cell`.
pub fn piece_capture_moves(board: &Board, rules: &Rules, cell: CellId) -> Vec<Move> {
    let mut moves = Vec::new();
    push_piece_captures(board, rules, cell, &mut moves);
    moves
}

/// All captures available to `team`.
pub fn team_capture_moves(board: &Board, rules: &Rules, team: Team) -> Vec<Move> {
    let mut moves = Vec::new();
    for cell in board.pieces_of(team) {
        push_piece_captures(board, rules, cell, &mut moves);
    }
    moves
}

fn push_piece_captures(board: &Board, rules: &Rules, cell: CellId, out: &mut Vec<Move>) {
    let Some(piece) = board.get(cell) else {
        return;
    };
    if piece.is_queen() && rules.flying_kings {
        push_flying_captures(board, cell, out);
        return;
    }

    let geometry = board.geometry();
    for dir in directions() {
        if !rules.peons_capture_backwards
            && piece.is_peon()
            && !rules.is_peon_moving_forward(piece, dir)
        {
            continue;
        }
        let Some(landing) = geometry.neighbor(cell, dir, 2) else {
            continue;
        };
        if !board.is_empty(landing) {
            continue;
        }
        let Some(jumped) = geometry.neighbor(cell, dir, 1) else {
            continue;
        };
        match board.get(jumped) {
            Some(target) if !target.is_same_team(piece) => {
                out.push(Move::capture(cell, landing, jumped));
            }
            _ => {}
        }
    }
}

/// Flying queen: the first piece met on a ray can be captured if it is an
/// opponent, landing on any empty cell behind it up to the next obstruction.
fn push_flying_captures(board: &Board, cell: CellId, out: &mut Vec<Move>) {
    let Some(piece) = board.get(cell) else {
        return;
    };
    let geometry = board.geometry();
    for dir in directions() {
        let mut distance = 1;
        let target = loop {
            match geometry.neighbor(cell, dir, distance) {
                None => break None,
                Some(id) if board.is_empty(id) => distance += 1,
                Some(id) => break Some(id),
            }
        };
        let Some(target) = target else {
            continue;
        };
        if board.get(target).is_some_and(|t| t.is_same_team(piece)) {
            continue;
        }
        distance += 1;
        while let Some(landing) = geometry.neighbor(cell, dir, distance) {
            if !board.is_empty(landing) {
                break;
            }
            out.push(Move::capture(cell, landing, target));
            distance += 1;
        }
    }
}

// =============================================================================
// Simple moves
// =============================================================================

/// Whether `source -> destination` is a legal non-capturing move on `board`.
///
/// Peons move one step forward. Queens move one step in any direction, or any
/// distance over empty cells when kings fly.
pub fn is_simple_move_legal(
    board: &Board,
    rules: &Rules,
    source: CellId,
    destination: CellId,
) -> bool {
    let Some(piece) = board.get(source) else {
        return false;
    };
    if !board.is_empty(destination) {
        return false;
    }
    let geometry = board.geometry();
    let from = geometry.cell_to_position(source);
    let to = geometry.cell_to_position(destination);
    let Some((dir, distance)) = Coord::diagonal_direction(from, to) else {
        return false;
    };

    if piece.is_peon() {
        return distance == 1 && rules.is_peon_moving_forward(piece, dir);
    }
    if distance > 1 && !rules.flying_kings {
        return false;
    }
    (1..distance).all(|i| {
        geometry
            .neighbor(source, dir, i)
            .is_some_and(|id| board.is_empty(id))
    })
}

/// Non-capturing moves of the piece on `cell`.
pub fn piece_simple_moves(board: &Board, rules: &Rules, cell: CellId) -> Vec<Move> {
    let mut moves = Vec::new();
    push_piece_simple_moves(board, rules, cell, &mut moves);
    moves
}

/// Non-capturing moves of `team`. Does not look at mandatory captures.
pub fn team_simple_moves(board: &Board, rules: &Rules, team: Team) -> Vec<Move> {
    let mut moves = Vec::new();
    for cell in board.pieces_of(team) {
        push_piece_simple_moves(board, rules, cell, &mut moves);
    }
    moves
}

fn push_piece_simple_moves(board: &Board, rules: &Rules, cell: CellId, out: &mut Vec<Move>) {
    let Some(piece) = board.get(cell) else {
        return;
    };
    let geometry = board.geometry();
    let max_distance = if piece.is_queen() && rules.flying_kings {
        geometry.side() as i16
    } else {
        1
    };
    for dir in directions() {
        if piece.is_peon() && !rules.is_peon_moving_forward(piece, dir) {
            continue;
        }
        for distance in 1..=max_distance {
            match geometry.neighbor(cell, dir, distance) {
                Some(id) if board.is_empty(id) => out.push(Move::simple(cell, id)),
                _ => break,
            }
        }
    }
}

// =============================================================================
// Existence check
// =============================================================================

/// Whether `team` has at least one legal move, simple or capturing.
///
/// Simple moves are probed one step away; captures go through the full
/// capture generator so that long-range queen captures are not missed.
pub fn has_any_legal_move(board: &Board, rules: &Rules, team: Team) -> bool {
    let geometry = board.geometry();
    board.pieces_of(team).any(|cell| {
        let Some(piece) = board.get(cell) else {
            return false;
        };
        let can_step = directions().any(|dir| {
            (piece.is_queen() || rules.is_peon_moving_forward(piece, dir))
                && geometry
                    .neighbor(cell, dir, 1)
                    .is_some_and(|id| board.is_empty(id))
        });
        can_step || !piece_capture_moves(board, rules, cell).is_empty()
    })
}
