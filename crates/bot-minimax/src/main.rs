//! Minimax bot.
//!
//! Sets up a position from a FEN and a list of moves, then asks the search
//! for a move, plays a game against itself, or counts perft nodes.

use std::path::PathBuf;

use anyhow::Context;
use chess_core::Color;
use chess_engine::{find_move, move_notation, perft, perft_divide, GameStatus, Position};
use chess_search::{spawn_search, SearchConfig, Searcher};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Minimax chess bot.
#[derive(Parser)]
#[command(name = "bot-minimax")]
#[command(about = "Searches chess positions with minimax and alpha-beta pruning")]
struct Args {
    /// Starting position in FEN; defaults to the standard start
    #[arg(long, global = true)]
    fen: Option<String>,

    /// Comma-separated moves to play from the starting position, e.g. e2e4,e7e5
    #[arg(long, global = true, value_delimiter = ',')]
    moves: Vec<String>,

    /// Path to a TOML search configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the best move for the side to move
    Best {
        /// Search depth in plies; overrides the configuration
        #[arg(long)]
        depth: Option<u32>,
    },
    /// Print a quick suggestion using the shallower suggestion depth
    Suggest,
    /// Let the engine play both sides until the game ends
    Play {
        /// Search depth in plies; overrides the configuration
        #[arg(long)]
        depth: Option<u32>,

        /// Stop after this many moves even if the game is not over
        #[arg(long, default_value = "200")]
        max_moves: u32,
    },
    /// Count leaf nodes of the legal move tree
    Perft {
        /// Depth in plies
        #[arg(long, default_value = "4")]
        depth: u32,

        /// Print the count below each root move
        #[arg(long)]
        divide: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SearchConfig::load(path)
            .with_context(|| format!("loading search configuration from {}", path.display()))?,
        None => SearchConfig::default(),
    };
    let mut position = setup_position(args.fen.as_deref(), &args.moves)?;
    tracing::info!("Position: {}", position.serialize());

    match args.command {
        Command::Best { depth } => {
            // An override becomes the nominal depth, so the endgame extension still applies.
            config.depth = depth.unwrap_or(config.depth);
            let depth = config.depth;
            let moves = position.legal_moves();
            if moves.is_empty() {
                println!("{}", position.status());
                return Ok(());
            }
            let task = spawn_search(Searcher::new(config), position, moves, depth);
            let outcome = task.wait()?;
            match outcome.best_move {
                Some(mv) => println!("{}", mv.to_uci()),
                None => println!("0000"),
            }
            tracing::info!("Searched {} nodes", outcome.searcher.nodes());
        }
        Command::Suggest => {
            let mut searcher = Searcher::new(config);
            match searcher.suggest_move(&mut position) {
                Some(mv) => println!("{}", move_notation(mv)),
                None => println!("{}", position.status()),
            }
        }
        Command::Play { depth, max_moves } => {
            config.depth = depth.unwrap_or(config.depth);
            let depth = config.depth;
            play(position, Searcher::new(config), depth, max_moves)?;
        }
        Command::Perft { depth, divide } => {
            if divide {
                let mut total = 0;
                for (mv, count) in perft_divide(&mut position, depth) {
                    println!("{}: {}", mv, count);
                    total += count;
                }
                println!("\nNodes searched: {}", total);
            } else {
                println!("{}", perft(&mut position, depth));
            }
        }
    }

    Ok(())
}

fn setup_position(fen: Option<&str>, moves: &[String]) -> anyhow::Result<Position> {
    let mut position = match fen {
        Some(fen) => Position::parse(fen).with_context(|| format!("invalid FEN: {}", fen))?,
        None => Position::startpos(),
    };
    for text in moves {
        let mv = find_move(&position, text)?;
        position.make_move(mv)?;
    }
    Ok(position)
}

fn play(mut position: Position, mut searcher: Searcher, depth: u32, max_moves: u32) -> anyhow::Result<()> {
    for _ in 0..max_moves {
        let moves = position.legal_moves();
        if moves.is_empty() {
            break;
        }
        let outcome = spawn_search(searcher, position.clone(), moves, depth).wait()?;
        searcher = outcome.searcher;
        let Some(mv) = outcome.best_move else {
            break;
        };
        let number = position.fullmove_number();
        let dots = if position.side_to_move() == Color::White { "." } else { "..." };
        position.make_move(mv)?;
        println!("{}{} {}", number, dots, move_notation(mv));
    }

    match position.status() {
        GameStatus::Ongoing => println!("Stopped after {} moves", max_moves),
        status => println!("{}", status),
    }
    println!("{}", position.serialize());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_applies_moves_in_order() {
        let moves = vec!["e2e4".to_string(), "e7e5".to_string()];
        let position = setup_position(None, &moves).unwrap();
        assert_eq!(
            position.serialize(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2"
        );
    }

    #[test]
    fn setup_rejects_illegal_moves() {
        let moves = vec!["e2e5".to_string()];
        assert!(setup_position(None, &moves).is_err());
        assert!(setup_position(Some("not a fen"), &[]).is_err());
    }

    #[test]
    fn self_play_stops_at_the_move_limit() {
        let searcher = Searcher::new(SearchConfig { depth: 1, ..SearchConfig::default() });
        play(Position::startpos(), searcher, 1, 4).unwrap();
    }
}
