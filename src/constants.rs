//! Board dimensions, direction tables and rule defaults.
//!
//! Only the dark squares of a draughts board are stored. A board of side `S`
//! has `S * S / 2` playable cells, `S / 2` per row.

// =============================================================================
// Board Geometry
// =============================================================================

/// Supported board side lengths.
pub const SUPPORTED_SIDES: [usize; 3] = [8, 10, 12];

/// Largest supported board side.
pub const MAX_SIDE: usize = 12;

/// Capacity of the playable cell array (enough for the largest board).
pub const MAX_PLAYABLE_CELLS: usize = MAX_SIDE * MAX_SIDE / 2;

// =============================================================================
// Directions
// =============================================================================

/// The four diagonal unit directions as `(dx, dy)`.
/// Order matters: capture and move lists are emitted in this order.
pub const DIRECTIONS: [(i16, i16); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];

// =============================================================================
// Capture Values (law of quality)
// =============================================================================

/// Points for capturing a peon.
pub const PEON_CAPTURE_POINTS: usize = 1;

/// Points for capturing a queen.
pub const QUEEN_CAPTURE_POINTS: usize = 2;

// =============================================================================
// Rule Defaults
// =============================================================================

/// Default board side.
pub const DEFAULT_SIDE: usize = 8;

/// Upper bound on the number of plies in a random self-play game.
pub const MAX_GAME_LEN: usize = 400;
