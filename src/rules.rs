//! Rule set of a draughts variant.
//!
//! A [`Rules`] value is read-only for the duration of a move generation or a
//! capture tree build. The defaults match the classic scenario setup: 8x8,
//! white starts and moves top to bottom, flying kings, no backward peon
//! captures, law of quantity only.

use thiserror::Error;

use crate::board::{Board, CellId, Coord, Geometry, Piece, Team};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    #[error("unsupported board side {0} (expected one of 8, 10, 12)")]
    UnsupportedSide(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    /// Validated board shape, kept with the double corner on the right.
    geometry: Geometry,
    /// Team that moves first.
    pub starting_team: Team,
    pub double_corner_on_right: bool,
    /// Queens slide any distance and capture from afar.
    pub flying_kings: bool,
    pub peons_capture_backwards: bool,
    /// White peons advance towards increasing `y`; black the other way.
    pub white_forward_top_to_bottom: bool,
    /// Only the longest capture sequences are allowed.
    pub law_of_quantity: bool,
    /// Only the most valuable capture sequences are allowed.
    pub law_of_quality: bool,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            geometry: Geometry::default(),
            starting_team: Team::White,
            double_corner_on_right: true,
            flying_kings: true,
            peons_capture_backwards: false,
            white_forward_top_to_bottom: true,
            law_of_quantity: true,
            law_of_quality: false,
        }
    }
}

impl Rules {
    /// Default rules on a board of the given side.
    pub fn new(side: usize) -> Result<Self, RulesError> {
        let mut rules = Rules::default();
        rules.set_side(side)?;
        Ok(rules)
    }

    pub fn side(&self) -> usize {
        self.geometry.side()
    }

    pub fn set_side(&mut self, side: usize) -> Result<(), RulesError> {
        self.geometry = Geometry::new(side, true)?;
        Ok(())
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry.oriented(self.double_corner_on_right)
    }

    /// Team whose peons start on the top rows.
    pub fn top_team(&self) -> Team {
        if self.white_forward_top_to_bottom {
            Team::White
        } else {
            Team::Black
        }
    }

    /// Standard opening position for these rules.
    pub fn opening_board(&self) -> Board {
        Board::opening(self.geometry(), self.top_team())
    }

    /// Whether `dir` points forward for `team`'s peons.
    pub fn is_forward(&self, team: Team, dir: Coord) -> bool {
        let down = (team == Team::White) == self.white_forward_top_to_bottom;
        if down { dir.y > 0 } else { dir.y < 0 }
    }

    /// Peon-only forward check; queens have no forward direction.
    pub fn is_peon_moving_forward(&self, piece: Piece, dir: Coord) -> bool {
        piece.is_peon() && self.is_forward(piece.team(), dir)
    }

    /// Whether `cell` lies on the far row for `team`'s peons.
    pub fn is_crowning_cell(&self, team: Team, cell: CellId) -> bool {
        let geometry = self.geometry();
        let last_row = geometry.side() - 1;
        let row = geometry.row_of(cell);
        if self.is_forward(team, Coord::new(0, 1)) {
            row == last_row
        } else {
            row == 0
        }
    }

    /// Crown the piece on `cell` if it is a peon standing on its crowning row.
    /// Returns whether a promotion happened.
    pub fn promote_if_crowned(&self, board: &mut Board, cell: CellId) -> bool {
        match board.get(cell) {
            Some(piece) if piece.is_peon() && self.is_crowning_cell(piece.team(), cell) => {
                board.set(cell, Some(piece.promoted()));
                true
            }
            _ => false,
        }
    }
}
