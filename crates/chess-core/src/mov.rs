//! Move representation.

use crate::{Color, Piece, Square};
use std::fmt;
use std::hash::{Hash, Hasher};

/// What kind of special handling a move needs when it is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// Plain relocation, possibly capturing on the destination square.
    Normal,
    /// Pawn advance of two squares from its starting rank.
    DoublePush,
    /// En passant capture; the captured pawn sits beside the mover.
    EnPassant,
    /// King move of two files that also relocates a rook.
    Castle,
    /// Pawn reaching the last rank.
    Promotion,
}

/// A move together with everything needed to apply and revert it.
///
/// Two moves compare equal when they share [`Move::id`], which only encodes
/// the source and destination squares. Flags and pieces are not part of the
/// identity, so a move generator must never emit two moves with the same
/// squares for one position.
#[derive(Clone, Copy)]
pub struct Move {
    from: Square,
    to: Square,
    moved: (Piece, Color),
    captured: Option<(Piece, Color)>,
    kind: MoveKind,
    promotion: Option<Piece>,
}

impl Move {
    /// Creates a move. Promotion moves default to a queen until
    /// [`Move::with_promotion`] picks something else.
    #[inline]
    pub const fn new(
        from: Square,
        to: Square,
        moved: (Piece, Color),
        captured: Option<(Piece, Color)>,
        kind: MoveKind,
    ) -> Self {
        Move {
            from,
            to,
            moved,
            captured,
            kind,
            promotion: None,
        }
    }

    /// Returns the same move promoting to `piece`.
    ///
    /// Ignored for non-promotion moves.
    #[inline]
    pub fn with_promotion(mut self, piece: Piece) -> Self {
        if self.kind == MoveKind::Promotion {
            self.promotion = Some(piece);
        }
        self
    }

    /// Compact identifier: `from * 64 + to`.
    #[inline]
    pub const fn id(self) -> u16 {
        (self.from.index() as u16) * 64 + self.to.index() as u16
    }

    /// Returns the source square.
    #[inline]
    pub const fn from(self) -> Square {
        self.from
    }

    /// Returns the destination square.
    #[inline]
    pub const fn to(self) -> Square {
        self.to
    }

    /// The piece being moved, with its color.
    #[inline]
    pub const fn moved(self) -> (Piece, Color) {
        self.moved
    }

    /// The type of the piece being moved.
    #[inline]
    pub const fn piece(self) -> Piece {
        self.moved.0
    }

    /// The color making this move.
    #[inline]
    pub const fn color(self) -> Color {
        self.moved.1
    }

    /// The captured piece, if any. For en passant this is the pawn beside
    /// the mover, not the (empty) destination square.
    #[inline]
    pub const fn captured(self) -> Option<(Piece, Color)> {
        self.captured
    }

    /// Returns the move kind.
    #[inline]
    pub const fn kind(self) -> MoveKind {
        self.kind
    }

    /// The piece a promoting pawn turns into; `None` for other moves.
    #[inline]
    pub fn promotion(self) -> Option<Piece> {
        match self.kind {
            MoveKind::Promotion => Some(self.promotion.unwrap_or(Piece::Queen)),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_capture(self) -> bool {
        self.captured.is_some()
    }

    #[inline]
    pub const fn is_promotion(self) -> bool {
        matches!(self.kind, MoveKind::Promotion)
    }

    #[inline]
    pub const fn is_en_passant(self) -> bool {
        matches!(self.kind, MoveKind::EnPassant)
    }

    #[inline]
    pub const fn is_castle(self) -> bool {
        matches!(self.kind, MoveKind::Castle)
    }

    /// Signed file displacement of the moving piece.
    #[inline]
    pub const fn file_delta(self) -> i8 {
        self.to.file() as i8 - self.from.file() as i8
    }

    /// Returns the coordinate notation for this move (e.g., "e2e4", "e7e8q").
    pub fn to_uci(self) -> String {
        match self.promotion() {
            Some(piece) => format!(
                "{}{}{}",
                self.from,
                self.to,
                piece.notation_char().to_ascii_lowercase()
            ),
            None => format!("{}{}", self.from, self.to),
        }
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Move {}

impl Hash for Move {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({})", self.to_uci())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}
