//! Core types for chess.
//!
//! This crate provides the fundamental types used across the engine and the
//! search:
//! - [`Piece`] and [`Color`] for piece representation
//! - [`Square`] for board coordinates
//! - [`Move`] and [`MoveKind`] for move representation
//! - FEN field parsing

mod color;
mod fen;
mod mov;
mod piece;
mod square;

pub use color::Color;
pub use fen::{FenError, FenParser};
pub use mov::{Move, MoveKind};
pub use piece::Piece;
pub use square::Square;
