//! Line-oriented text protocol, modelled on the Go Text Protocol.
//!
//! Each request is one line, optionally prefixed by a numeric id. Responses
//! start with `=` on success or `?` on failure, followed by the id and the
//! message, and end with an empty line. Cells are written as 1-based cell
//! numbers; a simple move is `12-16`, a capture `12x19`.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`
//! - `list_commands`, `known_command <cmd>`
//! - `quit`
//! - `clear_board` - Restart from the opening position
//! - `set <rule> <value>` - Change a rule and restart
//! - `rules` - Show the active rules
//! - `showboard` - Print the board
//! - `play <from> <to>` - Play a move for the side to move
//! - `moves` - List the legal moves
//! - `captures` - List the complete capture sequences available
//! - `genmove` - Play a random legal move
//! - `status` - Side to move or result

use std::io::{self, BufRead, Write};

use crate::board::{Team, parse_cell, str_cell};
use crate::game::{Game, MoveOutcome, Status};
use crate::movegen::Move;
use crate::rules::Rules;
use crate::selfplay::choose_random_move;

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "captures",
    "clear_board",
    "genmove",
    "known_command",
    "list_commands",
    "moves",
    "name",
    "play",
    "protocol_version",
    "quit",
    "rules",
    "set",
    "showboard",
    "status",
    "version",
];

/// Protocol engine state.
pub struct ProtocolEngine {
    rules: Rules,
    game: Game,
    rng: fastrand::Rng,
}

impl Default for ProtocolEngine {
    fn default() -> Self {
        Self::new(Rules::default())
    }
}

impl ProtocolEngine {
    pub fn new(rules: Rules) -> Self {
        Self::with_rng(rules, fastrand::Rng::new())
    }

    /// Engine with a fixed random generator for `genmove`.
    pub fn with_rng(rules: Rules, rng: fastrand::Rng) -> Self {
        Self {
            rules,
            game: Game::new(rules),
            rng,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Run the command loop, reading from stdin and writing to stdout.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        for line in stdin.lock().lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }

            let command = parts[0].to_lowercase();
            let args = &parts[1..];

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            writeln!(stdout, "{prefix}{id_str} {message}\n")?;
            stdout.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command id from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end == 0 {
            return (None, trimmed);
        }
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Execute a command and return (success, response).
    pub fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "1".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let Some(cmd) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                (true, known.to_string())
            }

            "quit" => (true, String::new()),

            "clear_board" => {
                self.game = Game::new(self.rules);
                (true, String::new())
            }

            "set" => {
                let [rule, value] = args else {
                    return (false, "usage: set <rule> <value>".to_string());
                };
                match self.set_rule(rule, value) {
                    Ok(()) => {
                        self.game = Game::new(self.rules);
                        (true, String::new())
                    }
                    Err(message) => (false, message),
                }
            }

            "rules" => (true, describe_rules(&self.rules)),

            "showboard" => (true, format!("\n{}", self.game.board())),

            "status" => (true, describe_status(&self.game)),

            "play" => {
                let [from, to] = args else {
                    return (false, "usage: play <from> <to>".to_string());
                };
                let geometry = *self.game.board().geometry();
                let (Some(source), Some(destination)) =
                    (parse_cell(&geometry, from), parse_cell(&geometry, to))
                else {
                    return (false, "invalid cell".to_string());
                };
                match self.game.play(source, destination) {
                    Ok(outcome) => (true, describe_outcome(outcome)),
                    Err(err) => (false, err.to_string()),
                }
            }

            "moves" => {
                let moves: Vec<String> = self.game.legal_moves().iter().map(str_move).collect();
                (true, moves.join(" "))
            }

            "captures" => {
                let sequences: Vec<String> = self
                    .game
                    .current_node()
                    .sequences()
                    .iter()
                    .map(|seq| str_sequence(seq))
                    .collect();
                (true, sequences.join("\n"))
            }

            "genmove" => {
                let Some(mv) = choose_random_move(&self.game, &mut self.rng) else {
                    return (false, "no legal move".to_string());
                };
                match self.game.play(mv.source, mv.destination) {
                    Ok(_) => (true, str_move(&mv)),
                    Err(err) => (false, err.to_string()),
                }
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }

    fn set_rule(&mut self, rule: &str, value: &str) -> Result<(), String> {
        let mut rules = self.rules;
        match rule {
            "board_size" => {
                let side = value.parse().map_err(|_| "invalid size".to_string())?;
                rules.set_side(side).map_err(|e| e.to_string())?;
            }
            "starting_team" => {
                rules.starting_team = match value {
                    "white" => Team::White,
                    "black" => Team::Black,
                    _ => return Err(format!("invalid team: {value}")),
                };
            }
            _ => {
                let flag = parse_flag(value)?;
                match rule {
                    "double_corner_on_right" => rules.double_corner_on_right = flag,
                    "flying_kings" => rules.flying_kings = flag,
                    "peons_capture_backwards" => rules.peons_capture_backwards = flag,
                    "white_forward_top_to_bottom" => rules.white_forward_top_to_bottom = flag,
                    "law_of_quantity" => rules.law_of_quantity = flag,
                    "law_of_quality" => rules.law_of_quality = flag,
                    _ => return Err(format!("unknown rule: {rule}")),
                }
            }
        }
        self.rules = rules;
        Ok(())
    }
}

fn parse_flag(value: &str) -> Result<bool, String> {
    match value {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        _ => Err(format!("invalid flag value: {value}")),
    }
}

/// Format a move as `12-16` or `12x19`.
pub fn str_move(mv: &Move) -> String {
    let sep = if mv.is_capture() { 'x' } else { '-' };
    format!("{}{sep}{}", str_cell(mv.source), str_cell(mv.destination))
}

/// Format a capture sequence as `12x19x26`.
pub fn str_sequence(moves: &[Move]) -> String {
    let Some(first) = moves.first() else {
        return String::new();
    };
    let mut s = str_cell(first.source);
    for mv in moves {
        s.push('x');
        s.push_str(&str_cell(mv.destination));
    }
    s
}

fn describe_rules(rules: &Rules) -> String {
    [
        format!("board_size {}", rules.side()),
        format!("starting_team {}", rules.starting_team),
        format!("double_corner_on_right {}", rules.double_corner_on_right),
        format!("flying_kings {}", rules.flying_kings),
        format!("peons_capture_backwards {}", rules.peons_capture_backwards),
        format!("white_forward_top_to_bottom {}", rules.white_forward_top_to_bottom),
        format!("law_of_quantity {}", rules.law_of_quantity),
        format!("law_of_quality {}", rules.law_of_quality),
    ]
    .join("\n")
}

fn describe_status(game: &Game) -> String {
    match game.status() {
        Status::Ongoing => match game.chaining_piece() {
            Some(cell) => format!("{} to move, continue from {}", game.to_move(), str_cell(cell)),
            None => format!("{} to move", game.to_move()),
        },
        Status::Won(team) => format!("{team} wins"),
        Status::ChallengeCompleted => "challenge completed".to_string(),
    }
}

fn describe_outcome(outcome: MoveOutcome) -> String {
    match outcome {
        MoveOutcome::Chained(cell) => format!("continue from {}", str_cell(cell)),
        MoveOutcome::TurnEnded { promoted: true } => "crowned".to_string(),
        MoveOutcome::TurnEnded { promoted: false } => String::new(),
    }
}
