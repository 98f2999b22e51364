//! Minimax search over [`chess_engine::Position`].
//!
//! This crate provides:
//! - [`evaluate`] - material, piece-square and king activity scoring
//! - [`Searcher`] - iterative deepening alpha-beta with principal variation
//!   search, a bounded transposition table, null-move pruning and
//!   killer/history ordering
//! - [`spawn_search`] - runs a search on a worker thread and hands the
//!   result back once
//! - [`SearchConfig`] - tunables, loadable from TOML
//!
//! # Example
//!
//! ```
//! use chess_engine::Position;
//! use chess_search::{SearchConfig, Searcher};
//!
//! let mut position = Position::startpos();
//! let mut searcher = Searcher::new(SearchConfig { depth: 2, ..SearchConfig::default() });
//! let best = searcher.best_move(&mut position);
//! assert!(best.is_some());
//! ```

mod config;
pub mod eval;
mod handoff;
pub mod ordering;
mod search;
pub mod tt;

pub use config::{ConfigError, SearchConfig};
pub use eval::{evaluate, CHECKMATE};
pub use handoff::{spawn_search, SearchError, SearchOutcome, SearchTask};
pub use search::{Searcher, INFINITY};
