//! Go Text Protocol (GTP) front end.
//!
//! GTP is a text-based protocol for communicating with Go-playing programs.
//! This module implements the subset of GTP version 2 needed to play a game
//! from a GUI such as Sabaki or GoGui. It is a thin layer over the core: it
//! resets the board, submits moves, and asks the search for a move.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`
//! - `list_commands`, `known_command <cmd>`
//! - `quit`
//! - `boardsize <size>` - only 9 is accepted
//! - `clear_board` - reset to an empty board
//! - `komi <value>` - set komi, keeping the moves played so far
//! - `play <color> <vertex>` - play a move; the colour must be the one to move
//! - `genmove <color>` - search and play a move, or pass, or resign
//! - `showboard` - print the board
//! - `final_score` - area score as `B+x` or `W+x`

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::board::{Board, Color};
use crate::constants::N;
use crate::coord::{Move, parse_coord};
use crate::error::GoError;
use crate::mcts::{Mcts, MctsConfig};
use crate::node::SearchNode;
use crate::policy::Policy;

/// The list of known GTP commands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "final_score",
    "genmove",
    "known_command",
    "komi",
    "list_commands",
    "name",
    "play",
    "protocol_version",
    "quit",
    "showboard",
    "version",
];

/// GTP engine state.
pub struct GtpEngine {
    /// Current game position
    board: Board,
    /// Search statistics, kept across moves of one game
    tree: Mcts<SearchNode>,
    config: MctsConfig,
    policy: Option<Arc<dyn Policy>>,
}

impl Default for GtpEngine {
    fn default() -> Self {
        Self::new(MctsConfig::default())
    }
}

impl GtpEngine {
    pub fn new(config: MctsConfig) -> Self {
        Self {
            board: Board::new(),
            tree: Mcts::new(&config),
            config,
            policy: None,
        }
    }

    /// Sample rollout moves from `policy` instead of uniformly.
    pub fn with_policy(mut self, policy: Arc<dyn Policy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Start from `board` instead of an empty board.
    pub fn with_board(mut self, board: Board) -> Self {
        self.board = board;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Run the GTP command loop on stdin/stdout.
    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.serve(stdin.lock(), stdout.lock())
    }

    /// Run the GTP command loop on arbitrary streams until `quit` or EOF.
    pub fn serve<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        for line in input.lines() {
            let line = line.context("failed to read GTP command")?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            debug!("gtp command: {command} {args:?}");
            let (success, message) = self.execute(&command, args);

            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            write!(output, "{prefix}{id_str} {message}\n\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
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

    fn parse_color(s: &str) -> Option<Color> {
        match s.to_lowercase().as_str() {
            "b" | "black" => Some(Color::Black),
            "w" | "white" => Some(Color::White),
            _ => None,
        }
    }

    /// Check that `arg` names the colour to move.
    fn check_turn(&self, arg: &str) -> std::result::Result<(), String> {
        let color = Self::parse_color(arg).ok_or_else(|| format!("invalid color {arg}"))?;
        if color != self.board.to_move() {
            return Err(format!("it is {}'s turn", self.board.to_move()));
        }
        Ok(())
    }

    /// GTP reply text for a rejected move.
    ///
    /// Rules violations already read "Illegal move: ..."; anything else is
    /// a move that could not be replayed at all.
    fn move_error(e: &GoError) -> String {
        if e.is_illegal_move() {
            e.to_string()
        } else {
            format!("cannot play: {e}")
        }
    }

    fn node(&self) -> SearchNode {
        match &self.policy {
            Some(policy) => SearchNode::with_policy(self.board.clone(), Arc::clone(policy)),
            None => SearchNode::new(self.board.clone()),
        }
    }

    /// Execute a GTP command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, "boke-go".to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "2".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let Some(cmd) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                (true, known.to_string())
            }

            "quit" => (true, String::new()),

            "boardsize" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match arg.parse::<usize>() {
                    Ok(size) if size == N => (true, String::new()),
                    Ok(size) => (
                        false,
                        format!("unacceptable size, only {N} is supported (got {size})"),
                    ),
                    Err(_) => (false, "invalid size".to_string()),
                }
            }

            "clear_board" => {
                self.board = Board::with_komi(self.board.komi());
                self.tree.clear();
                (true, String::new())
            }

            "komi" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let Ok(komi) = arg.parse::<f64>() else {
                    return (false, "invalid komi".to_string());
                };
                match Board::from_moves(komi, self.board.history()) {
                    Ok(board) => {
                        self.board = board;
                        // Rewards depend on komi, so old statistics are stale.
                        self.tree.clear();
                        (true, String::new())
                    }
                    Err(e) => (false, Self::move_error(&e)),
                }
            }

            "play" => {
                let [color, vertex, ..] = args else {
                    return (false, "missing arguments".to_string());
                };
                if let Err(msg) = self.check_turn(color) {
                    return (false, msg);
                }
                let mv = match parse_coord(vertex) {
                    Ok(mv) => mv,
                    Err(e) => return (false, e.to_string()),
                };
                match self.board.play(mv) {
                    Ok(board) => {
                        self.board = board;
                        (true, String::new())
                    }
                    Err(e) => (false, Self::move_error(&e)),
                }
            }

            "genmove" => {
                let Some(color) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                if let Err(msg) = self.check_turn(color) {
                    return (false, msg);
                }
                match self.genmove() {
                    Ok(reply) => (true, reply),
                    Err(e) => (false, e.to_string()),
                }
            }

            "showboard" => (true, format!("\n{}", self.board)),

            "final_score" => {
                let score = self.board.score();
                if score > 0.0 {
                    (true, format!("B+{score}"))
                } else {
                    (true, format!("W+{}", -score))
                }
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }

    /// Pick and play the engine's move; returns the GTP reply.
    fn genmove(&mut self) -> std::result::Result<String, GoError> {
        let root = self.node();

        // Pass if the opponent passed or the game is over.
        if self.board.last_move() == Some(Move::Pass) || root.is_terminal() {
            self.board = self.board.pass();
            return Ok("pass".to_string());
        }

        let rollouts = self.config.rollouts_for(self.board.turn());
        self.tree.run_rollouts(&root, rollouts)?;
        let child = match self.tree.choose(&root) {
            Ok(child) => child,
            Err(GoError::NoChildren) => {
                self.board = self.board.pass();
                return Ok("pass".to_string());
            }
            Err(e) => return Err(e),
        };

        self.tree.dump_children(&root, |c| {
            c.board().last_move().map_or_else(|| "?".to_string(), |m| m.to_string())
        });

        let winrate = self.tree.winrate(&child).unwrap_or(0.0);
        if self.config.should_resign(self.board.turn(), winrate) {
            warn!("resigning at turn {} with winrate {winrate:.3}", self.board.turn());
            return Ok("resign".to_string());
        }

        self.board = child.board().clone();
        let mv = self.board.last_move().unwrap_or(Move::Pass);
        info!("genmove {mv} after {rollouts} rollouts, winrate {winrate:.3}");
        Ok(mv.to_string())
    }
}
