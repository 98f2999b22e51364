//! Game status and draw detection.

use std::fmt;

use chess_core::Piece;

use crate::position::Position;

/// Why a game was drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawReason {
    /// Neither side can force mate.
    InsufficientMaterial,
    /// Some placement occurred three times.
    ThreefoldRepetition,
    /// 100 half-moves without a pawn move or capture.
    FiftyMoveRule,
}

/// State of the game as seen by the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameStatus {
    #[default]
    Ongoing,
    /// The side to move is mated.
    Checkmate,
    /// The side to move has no legal move and is not in check.
    Stalemate,
    Draw(DrawReason),
}

impl GameStatus {
    #[inline]
    pub fn is_over(self) -> bool {
        self != GameStatus::Ongoing
    }

    /// True for stalemate and for every draw.
    #[inline]
    pub fn is_stalemate(self) -> bool {
        matches!(self, GameStatus::Stalemate | GameStatus::Draw(_))
    }

    #[inline]
    pub fn draw_reason(self) -> Option<DrawReason> {
        match self {
            GameStatus::Draw(reason) => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for DrawReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DrawReason::InsufficientMaterial => "insufficient material",
            DrawReason::ThreefoldRepetition => "threefold repetition",
            DrawReason::FiftyMoveRule => "fifty-move rule",
        };
        f.write_str(text)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Ongoing => f.write_str("ongoing"),
            GameStatus::Checkmate => f.write_str("checkmate"),
            GameStatus::Stalemate => f.write_str("stalemate"),
            GameStatus::Draw(reason) => write!(f, "draw by {}", reason),
        }
    }
}

/// Lone kings, a single minor piece, or two knights.
pub fn is_insufficient_material(position: &Position) -> bool {
    let mut minors = position
        .pieces()
        .filter(|(_, piece, _)| *piece != Piece::King)
        .map(|(_, piece, _)| piece);

    match (minors.next(), minors.next(), minors.next()) {
        (None, _, _) => true,
        (Some(Piece::Knight | Piece::Bishop), None, _) => true,
        (Some(Piece::Knight), Some(Piece::Knight), None) => true,
        _ => false,
    }
}

/// Status of `position` given whether the side to move has any legal move.
pub(crate) fn classify(position: &Position, no_moves: bool) -> GameStatus {
    if no_moves {
        return if position.in_check() {
            GameStatus::Checkmate
        } else {
            GameStatus::Stalemate
        };
    }
    if is_insufficient_material(position) {
        GameStatus::Draw(DrawReason::InsufficientMaterial)
    } else if position.is_threefold_repetition() {
        GameStatus::Draw(DrawReason::ThreefoldRepetition)
    } else if position.halfmove_clock() >= 100 {
        GameStatus::Draw(DrawReason::FiftyMoveRule)
    } else {
        GameStatus::Ongoing
    }
}
