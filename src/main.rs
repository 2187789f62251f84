//! Boke-Go: a 9x9 Go engine.
//!
//! ## Usage
//!
//! - `boke-go gtp` - Start a GTP server for GUI integration
//! - `boke-go play` - Play against the engine in the terminal (default)

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use boke_go::board::{Board, Color};
use boke_go::constants::{DEFAULT_KOMI, EXPLORATION_WEIGHT, N_ROLLOUTS};
use boke_go::coord::{Move, parse_coord};
use boke_go::error::GoError;
use boke_go::gtp::GtpEngine;
use boke_go::mcts::{Mcts, MctsConfig};
use boke_go::node::SearchNode;
use boke_go::record::parse_sgf;

/// Boke-Go: a 9x9 Go MCTS engine
#[derive(Parser)]
#[command(name = "boke-go")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Rollouts per engine move
    #[arg(long, short = 'r', default_value_t = N_ROLLOUTS, global = true)]
    rollouts: usize,

    /// UCB1 exploration weight
    #[arg(long, default_value_t = EXPLORATION_WEIGHT, global = true)]
    exploration: f64,

    /// Seed for reproducible search
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Komi (compensation for White)
    #[arg(long, default_value_t = DEFAULT_KOMI, global = true)]
    komi: f64,

    /// Start from the moves of an SGF game record
    #[arg(long, global = true)]
    sgf: Option<PathBuf>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the GTP (Go Text Protocol) server for use with GUI applications
    Gtp,
    /// Play a game against the engine in the terminal
    Play {
        /// The engine's colour
        #[arg(long, short = 'c', value_enum, default_value_t = Side::W)]
        color: Side,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Side {
    B,
    W,
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::B => Color::Black,
            Side::W => Color::White,
        }
    }
}

fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = MctsConfig {
        rollouts: cli.rollouts,
        exploration_weight: cli.exploration,
        seed: cli.seed,
        ..MctsConfig::default()
    };
    let board = initial_board(&cli)?;
    info!("starting at turn {} with komi {}", board.turn(), board.komi());

    match cli.command {
        Some(Commands::Gtp) => GtpEngine::new(config).with_board(board).run(),
        Some(Commands::Play { color }) => run_play(config, board, color.into()),
        None => run_play(config, board, Color::White),
    }
}

fn initial_board(cli: &Cli) -> Result<Board> {
    let Some(path) = &cli.sgf else {
        return Ok(Board::with_komi(cli.komi));
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let record = parse_sgf(&text).with_context(|| format!("failed to parse {}", path.display()))?;
    record
        .replay(cli.komi)
        .with_context(|| format!("failed to replay {}", path.display()))
}

/// Alternate human moves read from stdin with engine moves.
fn run_play(config: MctsConfig, board: Board, engine: Color) -> Result<()> {
    let mut tree = Mcts::new(&config);
    let mut node = SearchNode::new(board);
    let mut lines = io::stdin().lock().lines();

    while !node.is_terminal() {
        println!("\n{}", node.board());

        if node.to_move() != engine {
            print!("Your move (vertex, pass, q): ");
            io::stdout().flush()?;
            let Some(line) = lines.next() else {
                return Ok(());
            };
            let line = line?;
            let input = line.trim();
            if input.eq_ignore_ascii_case("q") {
                return Ok(());
            }
            match parse_coord(input).and_then(|mv| node.apply_move(mv)) {
                Ok(next) => node = next,
                Err(e @ GoError::InvalidVertex(_)) => {
                    println!("{e}\nEnter a vertex such as E5, 'pass', or 'q' to quit")
                }
                Err(e) => println!("{e}"),
            }
            continue;
        }

        if node.board().last_move() == Some(Move::Pass) {
            println!("boke passes");
            node = node.apply_move(Move::Pass)?;
            continue;
        }

        let rollouts = config.rollouts_for(node.board().turn());
        tree.run_rollouts(&node, rollouts)?;
        let child = match tree.choose(&node) {
            Ok(child) => child,
            Err(GoError::NoChildren) => node.apply_move(Move::Pass)?,
            Err(e) => bail!(e),
        };
        let winrate = tree.winrate(&child).unwrap_or(0.0);
        if config.should_resign(node.board().turn(), winrate) {
            println!("boke resigns");
            return Ok(());
        }
        node = child;
        if let Some(mv) = node.board().last_move() {
            println!("boke plays {mv} (winrate {:.1}%)", winrate * 100.0);
        }
    }

    println!("\n{}", node.board());
    let score = node.board().score();
    if score > 0.0 {
        println!("B+{score}");
    } else {
        println!("W+{}", -score);
    }
    Ok(())
}
