//! Legal move generation.
//!
//! Moves are produced directly legal rather than generated pseudo-legally and
//! filtered by playing them out. The pin/check [`analysis`](crate::analyzer)
//! of the side to move's king drives three restrictions:
//!
//! - in double check only the king moves;
//! - a pinned piece only moves along its pin line;
//! - in single check non-king moves must capture the checker or land on the
//!   ray between checker and king.
//!
//! A pawn reaching the last rank yields one promotion move, which promotes
//! to a queen unless the caller picks another piece via
//! [`Move::with_promotion`].

pub mod perft;

use chess_core::{Color, Move, MoveKind, Piece, Square};

use crate::analyzer::{
    analyze, is_square_attacked, Check, Direction, Pin, DIAGONAL, KING_STEPS, KNIGHT_JUMPS,
    ORTHOGONAL,
};
use crate::position::Position;

/// Generates every legal move for the side to move.
///
/// Draw conditions are not considered here; see
/// [`Position::legal_moves`] for the game-aware variant.
pub fn legal_moves(position: &Position) -> Vec<Move> {
    let us = position.side_to_move();
    let king = position.king_square(us);
    let analysis = analyze(position, us, king);
    let mut moves = Vec::with_capacity(48);

    if analysis.is_double_check() {
        generate_king_moves(position, king, us, &mut moves);
    } else {
        for (from, piece, color) in position.pieces() {
            if color != us {
                continue;
            }
            let pin = analysis.pin_on(from);
            match piece {
                Piece::Pawn => generate_pawn_moves(position, from, us, pin, &mut moves),
                Piece::Knight => {
                    if pin.is_none() {
                        generate_knight_moves(position, from, us, &mut moves);
                    }
                }
                Piece::Bishop => generate_slides(position, from, piece, us, pin, &DIAGONAL, &mut moves),
                Piece::Rook => generate_slides(position, from, piece, us, pin, &ORTHOGONAL, &mut moves),
                Piece::Queen => generate_slides(position, from, piece, us, pin, &KING_STEPS, &mut moves),
                Piece::King => generate_king_moves(position, from, us, &mut moves),
            }
        }

        match analysis.checks.first() {
            Some(check) => {
                let targets = evasion_squares(king, check);
                moves.retain(|mv| {
                    mv.piece() == Piece::King
                        || targets.contains(&mv.to())
                        || (mv.is_en_passant() && en_passant_victim(*mv) == Some(check.square))
                });
            }
            None => generate_castling_moves(position, king, us, &mut moves),
        }
    }

    moves.retain(|mv| !matches!(mv.captured(), Some((Piece::King, _))));
    moves
}

/// Squares a non-king move may land on to resolve `check`.
fn evasion_squares(king: Square, check: &Check) -> Vec<Square> {
    if check.by_knight {
        return vec![check.square];
    }
    let mut squares = Vec::with_capacity(7);
    let mut current = king;
    while let Some(sq) = current.offset(check.direction.0, check.direction.1) {
        squares.push(sq);
        if sq == check.square {
            break;
        }
        current = sq;
    }
    squares
}

/// Square of the pawn removed by an en-passant capture.
fn en_passant_victim(mv: Move) -> Option<Square> {
    Square::new(mv.to().file(), mv.from().rank())
}

#[inline]
fn pin_allows(pin: Option<Pin>, direction: Direction) -> bool {
    pin.map_or(true, |pin| pin.allows(direction))
}

fn push_pawn_move(
    from: Square,
    to: Square,
    us: Color,
    captured: Option<(Piece, Color)>,
    moves: &mut Vec<Move>,
) {
    let kind = if to.rank() == us.promotion_rank() {
        MoveKind::Promotion
    } else {
        MoveKind::Normal
    };
    moves.push(Move::new(from, to, (Piece::Pawn, us), captured, kind));
}

fn generate_pawn_moves(
    position: &Position,
    from: Square,
    us: Color,
    pin: Option<Pin>,
    moves: &mut Vec<Move>,
) {
    let forward = us.pawn_direction();

    if pin_allows(pin, (0, forward)) {
        if let Some(one) = from.offset(0, forward).filter(|sq| position.piece_at(*sq).is_none()) {
            push_pawn_move(from, one, us, None, moves);
            if from.rank() == us.pawn_rank() {
                if let Some(two) = from
                    .offset(0, 2 * forward)
                    .filter(|sq| position.piece_at(*sq).is_none())
                {
                    moves.push(Move::new(from, two, (Piece::Pawn, us), None, MoveKind::DoublePush));
                }
            }
        }
    }

    for file_delta in [-1, 1] {
        if !pin_allows(pin, (file_delta, forward)) {
            continue;
        }
        let Some(to) = from.offset(file_delta, forward) else {
            continue;
        };
        match position.piece_at(to) {
            Some((piece, color)) if color != us => {
                push_pawn_move(from, to, us, Some((piece, color)), moves);
            }
            None if position.en_passant() == Some(to) => {
                let Some(victim) = Square::new(to.file(), from.rank()) else {
                    continue;
                };
                let captured = position.piece_at(victim);
                if captured == Some((Piece::Pawn, us.opposite()))
                    && en_passant_keeps_king_safe(position, from, to, victim, us)
                {
                    moves.push(Move::new(from, to, (Piece::Pawn, us), captured, MoveKind::EnPassant));
                }
            }
            _ => {}
        }
    }
}

/// An en-passant capture empties two squares at once, so the pin analysis
/// of the capturing pawn alone cannot tell whether the king is left open.
/// Rescans the king's rays with the capture applied.
fn en_passant_keeps_king_safe(position: &Position, from: Square, to: Square, victim: Square, us: Color) -> bool {
    let occupant = |sq: Square| {
        if sq == from || sq == victim {
            None
        } else if sq == to {
            Some((Piece::Pawn, us))
        } else {
            position.piece_at(sq)
        }
    };

    let king = position.king_square(us);
    ORTHOGONAL.into_iter().chain(DIAGONAL).all(|direction| {
        let diagonal = direction.0 != 0 && direction.1 != 0;
        let mut current = king;
        while let Some(sq) = current.offset(direction.0, direction.1) {
            current = sq;
            if let Some((piece, color)) = occupant(sq) {
                let slides = if diagonal {
                    piece.slides_diagonally()
                } else {
                    piece.slides_orthogonally()
                };
                return color == us || !slides;
            }
        }
        true
    })
}

fn generate_knight_moves(position: &Position, from: Square, us: Color, moves: &mut Vec<Move>) {
    for (df, dr) in KNIGHT_JUMPS {
        let Some(to) = from.offset(df, dr) else {
            continue;
        };
        match position.piece_at(to) {
            Some((_, color)) if color == us => {}
            captured => moves.push(Move::new(from, to, (Piece::Knight, us), captured, MoveKind::Normal)),
        }
    }
}

fn generate_slides(
    position: &Position,
    from: Square,
    piece: Piece,
    us: Color,
    pin: Option<Pin>,
    directions: &[Direction],
    moves: &mut Vec<Move>,
) {
    for &direction in directions {
        if !pin_allows(pin, direction) {
            continue;
        }
        let mut current = from;
        while let Some(to) = current.offset(direction.0, direction.1) {
            match position.piece_at(to) {
                None => moves.push(Move::new(from, to, (piece, us), None, MoveKind::Normal)),
                Some((_, color)) if color == us => break,
                captured => {
                    moves.push(Move::new(from, to, (piece, us), captured, MoveKind::Normal));
                    break;
                }
            }
            current = to;
        }
    }
}

fn generate_king_moves(position: &Position, from: Square, us: Color, moves: &mut Vec<Move>) {
    for (df, dr) in KING_STEPS {
        let Some(to) = from.offset(df, dr) else {
            continue;
        };
        let captured = position.piece_at(to);
        if matches!(captured, Some((_, color)) if color == us) {
            continue;
        }
        if !is_square_attacked(position, to, us.opposite()) {
            moves.push(Move::new(from, to, (Piece::King, us), captured, MoveKind::Normal));
        }
    }
}

/// Castling requires the right, the rook on its corner, empty squares between
/// them, and no attack on the king's start, transit and landing squares.
/// Only called when the king is not in check.
fn generate_castling_moves(position: &Position, king: Square, us: Color, moves: &mut Vec<Move>) {
    let rank = us.back_rank();
    if Square::new(4, rank) != Some(king) {
        return;
    }
    let rights = position.castling_rights();
    let them = us.opposite();
    let at = |file: u8| Square::new(file, rank).and_then(|sq| position.piece_at(sq));
    let safe = |file: u8| Square::new(file, rank).map_or(false, |sq| !is_square_attacked(position, sq, them));

    if rights.can_castle_kingside(us)
        && at(7) == Some((Piece::Rook, us))
        && [5, 6].into_iter().all(|file| at(file).is_none())
        && [4, 5, 6].into_iter().all(safe)
    {
        if let Some(to) = Square::new(6, rank) {
            moves.push(Move::new(king, to, (Piece::King, us), None, MoveKind::Castle));
        }
    }

    if rights.can_castle_queenside(us)
        && at(0) == Some((Piece::Rook, us))
        && [1, 2, 3].into_iter().all(|file| at(file).is_none())
        && [4, 3, 2].into_iter().all(safe)
    {
        if let Some(to) = Square::new(2, rank) {
            moves.push(Move::new(king, to, (Piece::King, us), None, MoveKind::Castle));
        }
    }
}
