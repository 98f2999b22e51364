//! Chess position representation.
//!
//! [`Position`] is a mailbox board plus the auxiliary rule state (side to
//! move, castling rights, en-passant target, fifty-move counter, repetition
//! table). It is mutated in place by [`Position::make_move`] and restored by
//! [`Position::undo_move`]; every piece of auxiliary state has its own undo
//! log so that restoration is exact and strictly last-in-first-out.

use std::collections::HashMap;

use chess_core::{Color, FenError, FenParser, Move, Piece, Square};
use thiserror::Error;

use crate::analyzer::is_square_attacked;
use crate::movegen;
use crate::status::{self, DrawReason, GameStatus};
use crate::zobrist;

/// Piece placement indexed by [`Square::index`].
pub type Board = [Option<(Piece, Color)>; 64];

/// Castling rights flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KINGSIDE: u8 = 0b0001;
    pub const WHITE_QUEENSIDE: u8 = 0b0010;
    pub const BLACK_KINGSIDE: u8 = 0b0100;
    pub const BLACK_QUEENSIDE: u8 = 0b1000;
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    /// Creates new castling rights from flags.
    #[inline]
    pub const fn new(flags: u8) -> Self {
        CastlingRights(flags & 0b1111)
    }

    /// Parses the FEN castling field (`KQkq` subset or `-`).
    pub fn from_fen(field: &str) -> Self {
        let flags = field.chars().fold(0u8, |flags, c| match c {
            'K' => flags | Self::WHITE_KINGSIDE,
            'Q' => flags | Self::WHITE_QUEENSIDE,
            'k' => flags | Self::BLACK_KINGSIDE,
            'q' => flags | Self::BLACK_QUEENSIDE,
            _ => flags,
        });
        CastlingRights::new(flags)
    }

    /// Returns true if the given side can castle kingside.
    #[inline]
    pub const fn can_castle_kingside(self, color: Color) -> bool {
        let flag = match color {
            Color::White => Self::WHITE_KINGSIDE,
            Color::Black => Self::BLACK_KINGSIDE,
        };
        (self.0 & flag) != 0
    }

    /// Returns true if the given side can castle queenside.
    #[inline]
    pub const fn can_castle_queenside(self, color: Color) -> bool {
        let flag = match color {
            Color::White => Self::WHITE_QUEENSIDE,
            Color::Black => Self::BLACK_QUEENSIDE,
        };
        (self.0 & flag) != 0
    }

    /// Removes castling rights for a color.
    #[inline]
    pub fn remove_color(&mut self, color: Color) {
        self.remove_kingside(color);
        self.remove_queenside(color);
    }

    /// Removes kingside castling for a color.
    #[inline]
    pub fn remove_kingside(&mut self, color: Color) {
        let mask = match color {
            Color::White => !Self::WHITE_KINGSIDE,
            Color::Black => !Self::BLACK_KINGSIDE,
        };
        self.0 &= mask;
    }

    /// Removes queenside castling for a color.
    #[inline]
    pub fn remove_queenside(&mut self, color: Color) {
        let mask = match color {
            Color::White => !Self::WHITE_QUEENSIDE,
            Color::Black => !Self::BLACK_QUEENSIDE,
        };
        self.0 &= mask;
    }

    /// Drops whichever right depends on a rook standing on `square`.
    fn remove_for_rook_square(&mut self, square: Square) {
        for color in Color::BOTH {
            if square == home_square(0, color) {
                self.remove_queenside(color);
            } else if square == home_square(7, color) {
                self.remove_kingside(color);
            }
        }
    }

    /// Returns the raw flags.
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 == 0 {
            return write!(f, "-");
        }
        let letters = [
            (Self::WHITE_KINGSIDE, 'K'),
            (Self::WHITE_QUEENSIDE, 'Q'),
            (Self::BLACK_KINGSIDE, 'k'),
            (Self::BLACK_QUEENSIDE, 'q'),
        ];
        for (flag, letter) in letters {
            if self.0 & flag != 0 {
                write!(f, "{}", letter)?;
            }
        }
        Ok(())
    }
}

/// Square on `color`'s back rank at `file`.
fn home_square(file: u8, color: Color) -> Square {
    Square::new(file, color.back_rank()).unwrap_or(Square::A1)
}

/// Repetition key: piece placement plus side to move.
///
/// Castling rights and the en-passant target are deliberately left out, so
/// repetition detection is an approximation of the full rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoardKey {
    board: Board,
    side_to_move: Color,
}

/// Errors raised when a move cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("move {0} is flagged as castling but moves a {1}")]
    CastleWithoutKing(Move, Piece),

    #[error("castling move {0} does not shift the king two files along its rank")]
    MalformedCastle(Move),
}

/// Complete chess position state with reversible move application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    board: Board,
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    /// Cached king squares, indexed by color.
    kings: [Square; 2],
    /// Half-moves since the last pawn move or capture.
    halfmove_clock: u32,
    /// Plies played before this position was parsed, derived from FEN.
    start_ply: u32,
    history: Vec<Move>,
    repetitions: HashMap<BoardKey, u32>,

    en_passant_log: Vec<Option<Square>>,
    castling_log: Vec<CastlingRights>,
    halfmove_log: Vec<u32>,
    key_log: Vec<BoardKey>,

    status: GameStatus,
}

impl Position {
    /// Creates the standard starting position.
    pub fn startpos() -> Self {
        Self::from_fen(FenParser::STARTPOS).expect("STARTPOS is valid")
    }

    /// Parses a position from FEN text; missing trailing fields take their
    /// documented defaults.
    pub fn parse(text: &str) -> Result<Self, FenError> {
        Self::from_fen(text)
    }

    /// Creates a position from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parsed = FenParser::parse(fen)?;
        let mut board: Board = [None; 64];

        for (rank_idx, rank_str) in parsed.piece_placement.split('/').enumerate() {
            let rank = 7 - rank_idx as u8; // FEN starts from rank 8
            let mut file = 0u8;

            for c in rank_str.chars() {
                if let Some(digit) = c.to_digit(10) {
                    file += digit as u8;
                } else if let Some(piece) = Piece::from_fen_char(c) {
                    if let Some(sq) = Square::new(file, rank) {
                        board[sq.index() as usize] = Some(piece);
                    }
                    file += 1;
                }
            }
        }

        let find_king = |color: Color| {
            Square::all()
                .find(|sq| board[sq.index() as usize] == Some((Piece::King, color)))
                .ok_or(FenError::MissingKing(color))
        };
        let kings = [find_king(Color::White)?, find_king(Color::Black)?];

        let start_ply = (parsed.fullmove_number - 1) * 2
            + u32::from(parsed.active_color == Color::Black);

        let mut position = Position {
            board,
            side_to_move: parsed.active_color,
            castling: CastlingRights::from_fen(&parsed.castling),
            en_passant: parsed.en_passant,
            kings,
            halfmove_clock: parsed.halfmove_clock,
            start_ply,
            history: Vec::new(),
            repetitions: HashMap::new(),
            en_passant_log: Vec::new(),
            castling_log: Vec::new(),
            halfmove_log: Vec::new(),
            key_log: Vec::new(),
            status: GameStatus::Ongoing,
        };
        position.repetitions.insert(position.board_key(), 1);
        Ok(position)
    }

    /// Serializes the position as six-field FEN.
    pub fn serialize(&self) -> String {
        self.to_fen()
    }

    /// Converts the position to a FEN string.
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();

        for rank in (0..8).rev() {
            let mut empty_count = 0;
            for file in 0..8 {
                let piece = Square::new(file, rank).and_then(|sq| self.piece_at(sq));
                if let Some((piece, color)) = piece {
                    if empty_count > 0 {
                        fen.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    fen.push(piece.to_fen_char(color));
                } else {
                    empty_count += 1;
                }
            }
            if empty_count > 0 {
                fen.push_str(&empty_count.to_string());
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        let en_passant = self
            .en_passant
            .map_or_else(|| "-".to_string(), Square::to_algebraic);

        format!(
            "{} {} {} {} {} {}",
            fen,
            self.side_to_move.fen_char(),
            self.castling,
            en_passant,
            self.halfmove_clock,
            self.fullmove_number()
        )
    }

    /// Returns the piece and color at the given square, if any.
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<(Piece, Color)> {
        self.board[sq.index() as usize]
    }

    #[inline]
    fn set(&mut self, sq: Square, piece: Option<(Piece, Color)>) {
        self.board[sq.index() as usize] = piece;
    }

    /// Iterates over occupied squares as `(square, piece, color)`.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece, Color)> + '_ {
        Square::all().filter_map(move |sq| self.piece_at(sq).map(|(piece, color)| (sq, piece, color)))
    }

    /// Number of pieces on the board, kings included.
    pub fn piece_count(&self) -> usize {
        self.board.iter().flatten().count()
    }

    /// Number of pieces on the board other than the two kings.
    pub fn non_king_piece_count(&self) -> usize {
        self.board
            .iter()
            .flatten()
            .filter(|(piece, _)| *piece != Piece::King)
            .count()
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    /// Cached location of `color`'s king.
    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.kings[color.index()]
    }

    /// Fifty-move counter in half-moves.
    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// Fullmove number derived from the plies played so far.
    pub fn fullmove_number(&self) -> u32 {
        (self.start_ply + self.history.len() as u32) / 2 + 1
    }

    /// Moves applied since the position was parsed, oldest first.
    #[inline]
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// The repetition key of the current placement and side to move.
    pub fn board_key(&self) -> BoardKey {
        BoardKey {
            board: self.board,
            side_to_move: self.side_to_move,
        }
    }

    /// How often the placement described by `key` has occurred.
    pub fn repetition_count(&self, key: &BoardKey) -> u32 {
        self.repetitions.get(key).copied().unwrap_or(0)
    }

    /// Hash of the full position, counters included.
    pub fn zobrist_hash(&self) -> u64 {
        zobrist::position_hash(self)
    }

    /// Result of the most recent [`Position::legal_moves`] call.
    #[inline]
    pub fn status(&self) -> GameStatus {
        self.status
    }

    #[inline]
    pub fn is_checkmate(&self) -> bool {
        self.status == GameStatus::Checkmate
    }

    /// True for stalemate and for every draw condition.
    #[inline]
    pub fn is_stalemate(&self) -> bool {
        self.status.is_stalemate()
    }

    #[inline]
    pub fn draw_reason(&self) -> Option<DrawReason> {
        self.status.draw_reason()
    }

    /// Returns true if the side to move is in check.
    pub fn in_check(&self) -> bool {
        self.square_under_attack(self.king_square(self.side_to_move))
    }

    /// Returns true if the opponent of the side to move attacks `square`.
    ///
    /// The side to move's own king is treated as empty, so a square behind
    /// it on an enemy slider's line reports attacked. Empty squares on an
    /// enemy pawn's capture diagonals also report attacked. Both answers are
    /// what a king stepping onto `square` would face, which can differ from
    /// the set of squares the opponent could legally move to.
    pub fn square_under_attack(&self, square: Square) -> bool {
        is_square_attacked(self, square, self.side_to_move.opposite())
    }

    pub fn is_insufficient_material(&self) -> bool {
        status::is_insufficient_material(self)
    }

    /// True once any placement has occurred three times.
    pub fn is_threefold_repetition(&self) -> bool {
        self.repetitions.values().any(|&count| count >= 3)
    }

    /// Fully legal moves for the side to move.
    ///
    /// Updates [`Position::status`]. When the game is over, including the
    /// draws by insufficient material, repetition and the fifty-move rule,
    /// the returned list is empty.
    pub fn legal_moves(&mut self) -> Vec<Move> {
        let moves = movegen::legal_moves(self);
        self.status = status::classify(self, moves.is_empty());
        if self.status.is_over() {
            Vec::new()
        } else {
            moves
        }
    }

    /// Applies `mv`, which must come from [`Position::legal_moves`] for this
    /// position.
    ///
    /// A move flagged as castling that is not a two-file king move is
    /// rejected before anything is changed.
    pub fn make_move(&mut self, mv: Move) -> Result<(), MoveError> {
        let rook_shift = if mv.is_castle() {
            Some(validated_castle(mv)?)
        } else {
            None
        };
        let (piece, color) = mv.moved();
        let (from, to) = (mv.from(), mv.to());

        self.en_passant_log.push(self.en_passant);
        self.castling_log.push(self.castling);
        self.halfmove_log.push(self.halfmove_clock);

        self.set(from, None);
        let landing = mv.promotion().map_or(mv.moved(), |promoted| (promoted, color));
        self.set(to, Some(landing));

        if mv.is_en_passant() {
            if let Some(victim) = Square::new(to.file(), from.rank()) {
                self.set(victim, None);
            }
        }
        if let Some((rook_from, rook_to)) = rook_shift {
            let rook = self.piece_at(rook_from);
            self.set(rook_from, None);
            self.set(rook_to, rook);
        }
        if piece == Piece::King {
            self.kings[color.index()] = to;
        }

        self.en_passant = if piece == Piece::Pawn && from.rank().abs_diff(to.rank()) == 2 {
            Square::new(from.file(), (from.rank() + to.rank()) / 2)
        } else {
            None
        };

        self.revoke_castling_rights(mv);

        if piece == Piece::Pawn || mv.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        self.side_to_move = color.opposite();
        self.history.push(mv);

        let key = self.board_key();
        *self.repetitions.entry(key.clone()).or_insert(0) += 1;
        self.key_log.push(key);

        self.status = GameStatus::Ongoing;
        Ok(())
    }

    /// Reverts the most recent move. Returns `None` when there is nothing to
    /// undo.
    pub fn undo_move(&mut self) -> Option<Move> {
        let mv = self.history.pop()?;

        if let Some(key) = self.key_log.pop() {
            match self.repetitions.get_mut(&key) {
                Some(count) if *count > 1 => *count -= 1,
                _ => {
                    self.repetitions.remove(&key);
                }
            }
        }
        if let Some(halfmove_clock) = self.halfmove_log.pop() {
            self.halfmove_clock = halfmove_clock;
        }
        if let Some(castling) = self.castling_log.pop() {
            self.castling = castling;
        }
        if let Some(en_passant) = self.en_passant_log.pop() {
            self.en_passant = en_passant;
        }

        let (from, to) = (mv.from(), mv.to());
        self.set(from, Some(mv.moved()));
        if mv.is_en_passant() {
            self.set(to, None);
            if let Some(victim) = Square::new(to.file(), from.rank()) {
                self.set(victim, mv.captured());
            }
        } else {
            self.set(to, mv.captured());
        }

        if let Some((rook_from, rook_to)) = castle_rook_shift(mv) {
            let rook = self.piece_at(rook_to);
            self.set(rook_to, None);
            self.set(rook_from, rook);
        }
        if mv.piece() == Piece::King {
            self.kings[mv.color().index()] = from;
        }

        self.side_to_move = mv.color();
        self.status = GameStatus::Ongoing;
        Some(mv)
    }

    /// Hands the move to the opponent without moving a piece.
    ///
    /// Used by null-move pruning; calling it twice restores the position.
    pub fn pass_turn(&mut self) {
        self.side_to_move = self.side_to_move.opposite();
        self.status = GameStatus::Ongoing;
    }

    fn revoke_castling_rights(&mut self, mv: Move) {
        if mv.piece() == Piece::King {
            self.castling.remove_color(mv.color());
        }
        if mv.piece() == Piece::Rook {
            self.castling.remove_for_rook_square(mv.from());
        }
        if let Some((Piece::Rook, _)) = mv.captured() {
            self.castling.remove_for_rook_square(mv.to());
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

/// Rook relocation `(from, to)` for a genuine castling move.
fn castle_rook_shift(mv: Move) -> Option<(Square, Square)> {
    if !mv.is_castle() || mv.piece() != Piece::King || mv.from().rank() != mv.to().rank() {
        return None;
    }
    let to = mv.to();
    match mv.file_delta() {
        2 => Some((to.offset(1, 0)?, to.offset(-1, 0)?)),
        -2 => Some((to.offset(-2, 0)?, to.offset(1, 0)?)),
        _ => None,
    }
}

fn validated_castle(mv: Move) -> Result<(Square, Square), MoveError> {
    if mv.piece() != Piece::King {
        tracing::warn!(%mv, piece = %mv.piece(), "castling flag on a non-king move, ignoring it");
        return Err(MoveError::CastleWithoutKing(mv, mv.piece()));
    }
    castle_rook_shift(mv).ok_or_else(|| {
        tracing::warn!(%mv, "castling flag on a king move that is not two files, ignoring it");
        MoveError::MalformedCastle(mv)
    })
}
