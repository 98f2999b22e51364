//! Chess rules on a mailbox board with reversible moves.
//!
//! This crate provides:
//! - [`Position`] - piece placement plus rule state, mutated in place by
//!   [`Position::make_move`] and restored by [`Position::undo_move`]
//! - [`analyzer`] - pins and checks found by scanning out from the king
//! - [`movegen`] - fully legal move generation and perft
//! - [`GameStatus`] - checkmate, stalemate and draw detection
//! - [`notation`] - short algebraic output and coordinate input
//!
//! # Example
//!
//! ```
//! use chess_engine::{notation, Position};
//!
//! let mut position = Position::startpos();
//! assert_eq!(position.legal_moves().len(), 20);
//!
//! let mv = notation::find_move(&position, "e2e4").unwrap();
//! position.make_move(mv).unwrap();
//! assert_eq!(notation::move_notation(mv), "e4");
//!
//! position.undo_move();
//! assert_eq!(position, Position::startpos());
//! ```

pub mod analyzer;
pub mod movegen;
pub mod notation;
mod position;
mod status;
mod zobrist;

pub use movegen::perft::{perft, perft_divide};
pub use notation::{find_move, move_notation, NotationError};
pub use position::{Board, BoardKey, CastlingRights, MoveError, Position};
pub use status::{is_insufficient_material, DrawReason, GameStatus};
