//! Board model: pieces, teams and the dark-square cell geometry.
//!
//! Only dark squares are addressable. A cell is named by a dense id in
//! `0..side*side/2`, counted row by row from the top-left. Whether the first
//! dark square of row 0 sits in column 0 or column 1 depends on which side the
//! double corner is on.

use std::fmt;
use std::ops::Range;

use crate::constants::{DEFAULT_SIDE, MAX_PLAYABLE_CELLS, SUPPORTED_SIDES};
use crate::rules::RulesError;

/// A playable cell, as an index into the board array.
pub type CellId = usize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Team {
    White,
    Black,
}

impl Team {
    pub fn opponent(self) -> Team {
        match self {
            Team::White => Team::Black,
            Team::Black => Team::White,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::White => write!(f, "white"),
            Team::Black => write!(f, "black"),
        }
    }
}

/// A piece on the board.
///
/// The discriminants keep the classic encoding where a queen is the negated
/// peon value of its team, so two pieces are teammates iff `a == b || a == -b`.
#[repr(i8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Piece {
    BlackQueen = -2,
    WhiteQueen = -1,
    WhitePeon = 1,
    BlackPeon = 2,
}

impl Piece {
    pub fn peon(team: Team) -> Piece {
        match team {
            Team::White => Piece::WhitePeon,
            Team::Black => Piece::BlackPeon,
        }
    }

    pub fn queen(team: Team) -> Piece {
        match team {
            Team::White => Piece::WhiteQueen,
            Team::Black => Piece::BlackQueen,
        }
    }

    #[inline]
    pub fn value(self) -> i8 {
        self as i8
    }

    pub fn team(self) -> Team {
        match self {
            Piece::WhitePeon | Piece::WhiteQueen => Team::White,
            Piece::BlackPeon | Piece::BlackQueen => Team::Black,
        }
    }

    #[inline]
    pub fn is_queen(self) -> bool {
        self.value() < 0
    }

    #[inline]
    pub fn is_peon(self) -> bool {
        self.value() > 0
    }

    pub fn is_same_team(self, other: Piece) -> bool {
        self.value() == other.value() || self.value() == -other.value()
    }

    /// The queen of the same team. Queens stay queens.
    pub fn promoted(self) -> Piece {
        Piece::queen(self.team())
    }

    pub fn to_char(self) -> char {
        match self {
            Piece::WhitePeon => 'w',
            Piece::WhiteQueen => 'W',
            Piece::BlackPeon => 'b',
            Piece::BlackQueen => 'B',
        }
    }
}

/// Team owning the content of a cell, if any.
pub fn team_of(cell: Option<Piece>) -> Option<Team> {
    cell.map(Piece::team)
}

/// A coordinate in full-board space (light and dark squares).
/// Also used for displacement and direction vectors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Coord {
    pub x: i16,
    pub y: i16,
}

impl Coord {
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// `self + dir * distance`.
    #[inline]
    pub fn step(self, dir: Coord, distance: i16) -> Coord {
        Coord::new(self.x + dir.x * distance, self.y + dir.y * distance)
    }

    /// Unit direction of a diagonal displacement, or `None` if it is not diagonal.
    pub fn diagonal_direction(from: Coord, to: Coord) -> Option<(Coord, i16)> {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        if dx == 0 || dx.abs() != dy.abs() {
            return None;
        }
        let distance = dx.abs();
        Some((Coord::new(dx / distance, dy / distance), distance))
    }
}

/// Mapping between cell ids and coordinates for one board shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Geometry {
    side: usize,
    double_corner_on_right: bool,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            side: DEFAULT_SIDE,
            double_corner_on_right: true,
        }
    }
}

impl Geometry {
    /// Geometry of a board of the given side, one of [`SUPPORTED_SIDES`].
    pub fn new(side: usize, double_corner_on_right: bool) -> Result<Self, RulesError> {
        if !SUPPORTED_SIDES.contains(&side) {
            return Err(RulesError::UnsupportedSide(side));
        }
        Ok(Self {
            side,
            double_corner_on_right,
        })
    }

    /// Same board side, double corner on the given side.
    pub fn oriented(self, double_corner_on_right: bool) -> Self {
        Self {
            double_corner_on_right,
            ..self
        }
    }

    #[inline]
    pub fn side(&self) -> usize {
        self.side
    }

    pub fn double_corner_on_right(&self) -> bool {
        self.double_corner_on_right
    }

    #[inline]
    pub fn cells_per_row(&self) -> usize {
        self.side / 2
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.side * self.side / 2
    }

    pub fn cells(&self) -> Range<CellId> {
        0..self.cell_count()
    }

    /// Column offset of the first dark square in row `y`.
    #[inline]
    fn row_shift(&self, y: i16) -> i16 {
        let odd = y % 2 != 0;
        if odd != self.double_corner_on_right { 1 } else { 0 }
    }

    pub fn contains(&self, pos: Coord) -> bool {
        let side = self.side as i16;
        (0..side).contains(&pos.x) && (0..side).contains(&pos.y)
    }

    pub fn cell_to_position(&self, id: CellId) -> Coord {
        let per_row = self.cells_per_row();
        let y = (id / per_row) as i16;
        let x = (id % per_row) as i16 * 2 + self.row_shift(y);
        Coord::new(x, y)
    }

    /// Cell id of a coordinate; `None` off the board or on a light square.
    pub fn position_to_cell(&self, pos: Coord) -> Option<CellId> {
        if !self.contains(pos) {
            return None;
        }
        let shift = self.row_shift(pos.y);
        if pos.x % 2 != shift {
            return None;
        }
        Some(pos.y as usize * self.cells_per_row() + ((pos.x - shift) / 2) as usize)
    }

    /// Cell reached from `id` after `distance` steps along `dir`.
    #[inline]
    pub fn neighbor(&self, id: CellId, dir: Coord, distance: i16) -> Option<CellId> {
        self.position_to_cell(self.cell_to_position(id).step(dir, distance))
    }

    /// Row index of a cell (0 is the top row).
    pub fn row_of(&self, id: CellId) -> usize {
        id / self.cells_per_row()
    }
}

/// A board snapshot. Copying a board is cheap and gives an independent value.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Board {
    geometry: Geometry,
    cells: [Option<Piece>; MAX_PLAYABLE_CELLS],
}

impl Board {
    pub fn empty(geometry: Geometry) -> Self {
        Self {
            geometry,
            cells: [None; MAX_PLAYABLE_CELLS],
        }
    }

    /// Standard starting position: `side/2 - 1` rows per team, with `top`
    /// occupying the first rows.
    pub fn opening(geometry: Geometry, top: Team) -> Self {
        let mut board = Board::empty(geometry);
        let rows = geometry.side() / 2 - 1;
        let per_row = geometry.cells_per_row();
        let count = geometry.cell_count();
        for id in 0..rows * per_row {
            board.cells[id] = Some(Piece::peon(top));
            board.cells[count - 1 - id] = Some(Piece::peon(top.opponent()));
        }
        board
    }

    #[inline]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    #[inline]
    pub fn get(&self, id: CellId) -> Option<Piece> {
        self.cells[id]
    }

    #[inline]
    pub fn set(&mut self, id: CellId, cell: Option<Piece>) {
        self.cells[id] = cell;
    }

    #[inline]
    pub fn is_empty(&self, id: CellId) -> bool {
        self.cells[id].is_none()
    }

    /// Cells holding a piece of `team`, in increasing id order.
    pub fn pieces_of(&self, team: Team) -> impl Iterator<Item = CellId> + '_ {
        self.geometry
            .cells()
            .filter(move |&id| team_of(self.cells[id]) == Some(team))
    }

    pub fn count(&self, team: Team) -> usize {
        self.pieces_of(team).count()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board({}x{})", self.geometry.side, self.geometry.side)?;
        write!(f, "{self}")
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = self.geometry.side as i16;
        for y in 0..side {
            for x in 0..side {
                let ch = match self.geometry.position_to_cell(Coord::new(x, y)) {
                    Some(id) => self.cells[id].map_or('-', Piece::to_char),
                    None => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Parse a 1-based cell number (e.g. `"12"`) into a cell id.
pub fn parse_cell(geometry: &Geometry, s: &str) -> Option<CellId> {
    let n: usize = s.trim().parse().ok()?;
    (1..=geometry.cell_count()).contains(&n).then(|| n - 1)
}

/// Format a cell id as a 1-based cell number.
pub fn str_cell(id: CellId) -> String {
    (id + 1).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_position_roundtrip() {
        for side in SUPPORTED_SIDES {
            for dcr in [false, true] {
                let g = Geometry::new(side, dcr).expect("supported side");
                for id in g.cells() {
                    let pos = g.cell_to_position(id);
                    assert!(g.contains(pos));
                    assert_eq!(g.position_to_cell(pos), Some(id), "side {side} dcr {dcr} id {id}");
                }
            }
        }
    }

    #[test]
    fn test_geometry_rejects_unsupported_side() {
        for side in [0, 7, 9, 14, 16] {
            assert_eq!(Geometry::new(side, true), Err(RulesError::UnsupportedSide(side)));
        }
        let g = Geometry::new(10, true).expect("supported side");
        assert_eq!(g.oriented(false).side(), 10);
        assert!(!g.oriented(false).double_corner_on_right());
        assert_eq!(Geometry::default().side(), DEFAULT_SIDE);
    }

    #[test]
    fn test_light_squares_have_no_cell() {
        let g = Geometry::new(8, true).expect("supported side");
        let dark = (0..8)
            .flat_map(|y| (0..8).map(move |x| Coord::new(x, y)))
            .filter(|&p| g.position_to_cell(p).is_some())
            .count();
        assert_eq!(dark, g.cell_count());
    }

    #[test]
    fn test_double_corner_orientation() {
        let right = Geometry::new(8, true).expect("supported side");
        let left = Geometry::new(8, false).expect("supported side");
        assert_eq!(right.cell_to_position(0), Coord::new(1, 0));
        assert_eq!(left.cell_to_position(0), Coord::new(0, 0));
        assert_eq!(right.cell_to_position(4), Coord::new(0, 1));
        assert_eq!(left.cell_to_position(4), Coord::new(1, 1));
    }

    #[test]
    fn test_off_board_positions() {
        let g = Geometry::new(10, false).expect("supported side");
        assert_eq!(g.position_to_cell(Coord::new(-1, 1)), None);
        assert_eq!(g.position_to_cell(Coord::new(10, 0)), None);
        assert_eq!(g.neighbor(0, Coord::new(-1, -1), 1), None);
    }

    #[test]
    fn test_piece_team_invariant() {
        let all = [Piece::WhitePeon, Piece::WhiteQueen, Piece::BlackPeon, Piece::BlackQueen];
        for a in all {
            for b in all {
                assert_eq!(a.is_same_team(b), a.team() == b.team(), "{a:?} {b:?}");
            }
            assert_eq!(a.promoted().value(), -a.value().abs());
        }
        assert_eq!(team_of(None), None);
        assert_eq!(team_of(Some(Piece::BlackQueen)), Some(Team::Black));
    }

    #[test]
    fn test_opening_position() {
        let g = Geometry::new(8, true).expect("supported side");
        let board = Board::opening(g, Team::White);
        assert_eq!(board.count(Team::White), 12);
        assert_eq!(board.count(Team::Black), 12);
        assert_eq!(board.get(0), Some(Piece::WhitePeon));
        assert_eq!(board.get(31), Some(Piece::BlackPeon));
        assert!(board.is_empty(12) && board.is_empty(19));

        let big = Board::opening(Geometry::new(12, false).expect("supported side"), Team::Black);
        assert_eq!(big.count(Team::White), 30);
        assert_eq!(big.get(0), Some(Piece::BlackPeon));
    }

    #[test]
    fn test_parse_str_cell() {
        let g = Geometry::new(8, true).expect("supported side");
        assert_eq!(parse_cell(&g, "1"), Some(0));
        assert_eq!(parse_cell(&g, "32"), Some(31));
        assert_eq!(parse_cell(&g, "33"), None);
        assert_eq!(parse_cell(&g, "0"), None);
        assert_eq!(parse_cell(&g, "x"), None);
        assert_eq!(str_cell(5), "6");
    }

    #[test]
    fn test_display() {
        let g = Geometry::new(8, true).expect("supported side");
        let mut board = Board::empty(g);
        board.set(0, Some(Piece::WhiteQueen));
        let text = board.to_string();
        let first = text.lines().next().unwrap_or_default();
        assert_eq!(first, ". W . - . - . - ");
    }
}
