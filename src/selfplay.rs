//! Random self-play.
//!
//! Both sides pick uniformly among their legal moves until one of them has
//! no move left or the ply limit is reached. Useful as a smoke test of the
//! rules engine over long, varied games.

use crate::board::Team;
use crate::constants::MAX_GAME_LEN;
use crate::game::{Game, Status};
use crate::movegen::Move;
use crate::rules::Rules;

/// Summary of a finished self-play game.
#[derive(Debug, Clone)]
pub struct GameRecord {
    pub status: Status,
    /// Moves played, one entry per capture of a chain.
    pub moves: Vec<Move>,
}

impl GameRecord {
    pub fn winner(&self) -> Option<Team> {
        match self.status {
            Status::Won(team) => Some(team),
            _ => None,
        }
    }

    pub fn plies(&self) -> usize {
        self.moves.len()
    }
}

/// Pick one of the legal moves of the side to move.
pub fn choose_random_move(game: &Game, rng: &mut fastrand::Rng) -> Option<Move> {
    let moves = game.legal_moves();
    if moves.is_empty() {
        return None;
    }
    Some(moves[rng.usize(..moves.len())])
}

/// Play a random game from the opening position.
pub fn random_game(rules: Rules, rng: &mut fastrand::Rng) -> GameRecord {
    let mut game = Game::new(rules);
    let mut moves = Vec::new();

    while game.status() == Status::Ongoing && moves.len() < MAX_GAME_LEN {
        let Some(mv) = choose_random_move(&game, rng) else {
            break;
        };
        if let Err(err) = game.play(mv.source, mv.destination) {
            tracing::warn!(%err, "generated move was rejected");
            break;
        }
        moves.push(mv);
    }

    tracing::debug!(plies = moves.len(), status = ?game.status(), "random game finished");
    GameRecord {
        status: game.status(),
        moves,
    }
}
