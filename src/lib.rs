//! draughts-rules: a draughts (checkers) rules engine.
//!
//! This crate generates the legal moves of a draughts position under a
//! configurable rule set: board side, flying kings, backward peon captures,
//! board orientation and the laws of quantity and quality that decide which
//! capture sequences are mandatory.
//!
//! ## Modules
//!
//! - [`constants`] - Board sizes, directions and capture values
//! - [`board`] - Pieces, cell geometry and the board itself
//! - [`rules`] - Rule set, orientation and promotion
//! - [`movegen`] - Move application, capture and simple-move generation
//! - [`capture_tree`] - Capture sequence tree and the capture laws
//! - [`game`] - Turn flow, chained captures and challenge mode
//! - [`selfplay`] - Random games
//! - [`protocol`] - Line-oriented text protocol
//!
//! ## Example
//!
//! ```
//! use draughts_rules::capture_tree::build_capture_tree;
//! use draughts_rules::game::Game;
//! use draughts_rules::movegen::has_any_legal_move;
//! use draughts_rules::rules::Rules;
//!
//! let rules = Rules::default();
//! let board = rules.opening_board();
//!
//! // No capture is available at the start of the game
//! let tree = build_capture_tree(&board, &rules, rules.starting_team);
//! assert!(tree.children.is_empty());
//! assert!(has_any_legal_move(&board, &rules, rules.starting_team));
//!
//! // Play a move through a game session
//! let mut game = Game::new(rules);
//! let mv = game.legal_moves()[0];
//! game.play(mv.source, mv.destination).unwrap();
//! ```

pub mod board;
pub mod capture_tree;
pub mod constants;
pub mod game;
pub mod movegen;
pub mod protocol;
pub mod rules;
pub mod selfplay;
