//! Move text: a short algebraic form for display and coordinate input.
//!
//! The display form has no disambiguation and no check markers: `Nf3`,
//! `Bxc6`, `exd5`, `e8Q`, `0-0`, `exd6 e.p.`.

use chess_core::{Move, Piece, Square};
use thiserror::Error;

use crate::movegen::legal_moves;
use crate::Position;

/// Errors raised while resolving coordinate move text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    #[error("empty move text")]
    Empty,

    #[error("invalid move text '{0}': expected coordinates like e2e4 or e7e8q")]
    InvalidFormat(String),

    #[error("invalid promotion piece '{0}'")]
    InvalidPromotion(char),

    #[error("no legal move {0} in this position")]
    IllegalMove(String),
}

/// Short algebraic text for `mv`.
pub fn move_notation(mv: Move) -> String {
    if mv.is_castle() {
        return if mv.file_delta() > 0 { "0-0" } else { "0-0-0" }.to_string();
    }

    let mut text = String::with_capacity(8);
    if mv.piece() == Piece::Pawn {
        if mv.is_capture() {
            text.push(file_char(mv.from()));
        }
    } else {
        text.push(mv.piece().notation_char());
    }
    if mv.is_capture() {
        text.push('x');
    }
    text.push_str(&mv.to().to_algebraic());
    if let Some(piece) = mv.promotion() {
        text.push(piece.notation_char());
    }
    if mv.is_en_passant() {
        text.push_str(" e.p.");
    }
    text
}

fn file_char(square: Square) -> char {
    (b'a' + square.file()) as char
}

/// Resolves coordinate text (`e2e4`, `e7e8n`) against the legal moves of
/// `position`. A missing promotion letter promotes to a queen.
pub fn find_move(position: &Position, text: &str) -> Result<Move, NotationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(NotationError::Empty);
    }
    let invalid = || NotationError::InvalidFormat(text.to_string());
    if !text.is_ascii() || !(4..=5).contains(&text.len()) {
        return Err(invalid());
    }

    let from = Square::from_algebraic(&text[0..2]).ok_or_else(invalid)?;
    let to = Square::from_algebraic(&text[2..4]).ok_or_else(invalid)?;
    let promotion = match text[4..].chars().next() {
        None => None,
        Some(c) => match Piece::from_fen_char(c.to_ascii_lowercase()) {
            Some((piece @ (Piece::Knight | Piece::Bishop | Piece::Rook | Piece::Queen), _)) => Some(piece),
            _ => return Err(NotationError::InvalidPromotion(c)),
        },
    };

    let mv = legal_moves(position)
        .into_iter()
        .find(|mv| mv.from() == from && mv.to() == to)
        .ok_or_else(|| NotationError::IllegalMove(text.to_string()))?;

    match promotion {
        Some(piece) if mv.is_promotion() => Ok(mv.with_promotion(piece)),
        Some(_) => Err(NotationError::IllegalMove(text.to_string())),
        None => Ok(mv),
    }
}
