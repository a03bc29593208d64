//! draughts-rules: a draughts (checkers) rules engine.
//!
//! ## Usage
//!
//! - `draughts-rules` - Show a demo
//! - `draughts-rules protocol` - Start the text protocol on stdin/stdout
//! - `draughts-rules selfplay --games 10` - Play random games
//!
//! Set `RUST_LOG=debug` to trace capture tree construction on stderr.

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use draughts_rules::board::{Board, Coord, Piece, Team};
use draughts_rules::capture_tree::build_capture_tree;
use draughts_rules::movegen::has_any_legal_move;
use draughts_rules::protocol::{ProtocolEngine, str_sequence};
use draughts_rules::rules::Rules;
use draughts_rules::selfplay::random_game;

/// draughts-rules: move generation and capture laws for draughts variants
#[derive(Parser)]
#[command(name = "draughts-rules")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    rules: RulesArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the line-oriented text protocol on stdin/stdout
    Protocol,
    /// Play random games between two random movers
    Selfplay {
        /// Number of games to play
        #[arg(long, default_value_t = 10)]
        games: usize,
        /// Seed for reproducible games
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show the opening position and a capture example
    Demo,
}

#[derive(Copy, Clone, ValueEnum)]
enum TeamArg {
    White,
    Black,
}

impl From<TeamArg> for Team {
    fn from(team: TeamArg) -> Self {
        match team {
            TeamArg::White => Team::White,
            TeamArg::Black => Team::Black,
        }
    }
}

#[derive(Args)]
struct RulesArgs {
    /// Board side (8, 10 or 12)
    #[arg(long, global = true, default_value_t = 8)]
    side: usize,
    /// Team that moves first
    #[arg(long, global = true, value_enum, default_value_t = TeamArg::White)]
    starting_team: TeamArg,
    /// Queens move a single square
    #[arg(long, global = true)]
    no_flying_kings: bool,
    /// Peons may capture backwards
    #[arg(long, global = true)]
    backward_captures: bool,
    /// White peons start at the bottom and move up
    #[arg(long, global = true)]
    white_forward_up: bool,
    /// Do not force the longest capture sequence
    #[arg(long, global = true)]
    no_law_of_quantity: bool,
    /// Force the most valuable capture sequence
    #[arg(long, global = true)]
    law_of_quality: bool,
    /// Put the double corner on the left
    #[arg(long, global = true)]
    double_corner_left: bool,
}

impl RulesArgs {
    fn to_rules(&self) -> anyhow::Result<Rules> {
        let mut rules = Rules::new(self.side).context("invalid --side")?;
        rules.starting_team = self.starting_team.into();
        rules.flying_kings = !self.no_flying_kings;
        rules.peons_capture_backwards = self.backward_captures;
        rules.white_forward_top_to_bottom = !self.white_forward_up;
        rules.law_of_quantity = !self.no_law_of_quantity;
        rules.law_of_quality = self.law_of_quality;
        rules.double_corner_on_right = !self.double_corner_left;
        Ok(rules)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let rules = cli.rules.to_rules()?;

    match cli.command {
        Some(Commands::Protocol) => {
            let mut engine = ProtocolEngine::new(rules);
            engine.run().context("protocol i/o failed")?;
        }
        Some(Commands::Selfplay { games, seed }) => {
            run_selfplay(rules, games, seed);
        }
        Some(Commands::Demo) | None => {
            run_demo(rules);
        }
    }
    Ok(())
}

fn run_selfplay(rules: Rules, games: usize, seed: Option<u64>) {
    let mut rng = seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
    let (mut white, mut black, mut unfinished) = (0, 0, 0);

    for i in 0..games {
        let record = random_game(rules, &mut rng);
        match record.winner() {
            Some(Team::White) => white += 1,
            Some(Team::Black) => black += 1,
            None => unfinished += 1,
        }
        let result = record
            .winner()
            .map_or_else(|| "unfinished".to_string(), |team| format!("{team} wins"));
        println!("game {:>3}: {:>3} moves, {result}", i + 1, record.plies());
    }
    println!("\nwhite {white}, black {black}, unfinished {unfinished}");
}

fn run_demo(rules: Rules) {
    println!("draughts-rules: draughts move generation and capture laws\n");

    // Demo 1: opening position
    println!("=== Opening ({0}x{0}) ===", rules.side());
    let board = rules.opening_board();
    println!("{board}");
    let tree = build_capture_tree(&board, &rules, rules.starting_team);
    println!(
        "{} to move, captures: {}, any legal move: {}\n",
        rules.starting_team,
        tree.children.len(),
        has_any_legal_move(&board, &rules, rules.starting_team)
    );

    // Demo 2: a double capture next to a single one
    println!("=== Capture laws ===");
    let geometry = rules.geometry();
    let mut board = Board::empty(geometry);
    let top = rules.top_team();
    let (attacker, victim) = (Piece::peon(top), Piece::peon(top.opponent()));
    let down = if top == Team::White { 1 } else { -1 };
    let start = if down > 0 { 1 } else { rules.side() as i16 - 2 };
    let place = |board: &mut Board, x: i16, y: i16, piece: Piece| {
        if let Some(id) = geometry.position_to_cell(Coord::new(x, y)) {
            board.set(id, Some(piece));
        }
    };
    // Pick the dark squares of the starting row and walk diagonally from there.
    let x0 = (0..2).find(|&x| geometry.position_to_cell(Coord::new(x, start)).is_some()).unwrap_or(0);
    place(&mut board, x0, start, attacker);
    place(&mut board, x0 + 1, start + down, victim);
    place(&mut board, x0 + 3, start + 3 * down, victim);
    place(&mut board, x0 + 4, start, attacker);
    place(&mut board, x0 + 5, start + down, victim);
    println!("{board}");

    let mut unrestricted = rules;
    unrestricted.law_of_quantity = false;
    unrestricted.law_of_quality = false;
    for (label, rules) in [("without laws", unrestricted), ("with active laws", rules)] {
        let tree = build_capture_tree(&board, &rules, top);
        let sequences: Vec<String> = tree.sequences().iter().map(|s| str_sequence(s)).collect();
        println!("{top} captures {label}: {}", sequences.join(", "));
    }
}
