//! Static evaluation.
//!
//! Scores are in centipawns from White's point of view. The evaluation is
//! material plus piece-square tables, with the king's table blended from a
//! middlegame to an endgame table as pieces come off. When material is
//! unequal, the side ahead is also rewarded for driving the losing king to
//! the edge and bringing its own king close.

use chess_core::{Color, Piece, Square};
use chess_engine::Position;

/// Score of a mated position, independent of distance to mate.
pub const CHECKMATE: i32 = 100_000;

/// Non-king piece count at which the game stage is 0 (pure middlegame).
pub const MAX_NON_KING_PIECES: usize = 29;

const CENTER_WEIGHT: f64 = 15.0;
const PROXIMITY_WEIGHT: f64 = 7.0;
const MAX_KING_MANHATTAN: i32 = 14;

/// Material value of `piece`. Kings are worth nothing.
pub const fn piece_value(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => 100,
        Piece::Knight => 300,
        Piece::Bishop => 320,
        Piece::Rook => 500,
        Piece::Queen => 900,
        Piece::King => 0,
    }
}

// Tables are laid out as seen from White's side of the board: the first row
// is rank 8, the last row is rank 1.

#[rustfmt::skip]
const PAWN_TABLE: [i32; 64] = [
     0,  0,   0,   0,   0,   0,  0,  0,
    50, 50,  50,  50,  50,  50, 50, 50,
    10, 10,  20,  30,  30,  20, 10, 10,
     5,  5,  10,  25,  25,  10,  5,  5,
     0,  0,   0,  20,  20,   0,  0,  0,
     5, -5, -10,   0,   0, -10, -5,  5,
     5, 10,  10, -20, -20,  10, 10,  5,
     0,  0,   0,   0,   0,   0,  0,  0,
];

#[rustfmt::skip]
const KNIGHT_TABLE: [i32; 64] = [
    -50, -40, -30, -30, -30, -30, -40, -50,
    -40, -20,   0,   0,   0,   0, -20, -40,
    -30,   0,  10,  15,  15,  10,   0, -30,
    -30,   5,  15,  20,  20,  15,   5, -30,
    -30,   0,  15,  20,  20,  15,   0, -30,
    -30,   5,  10,  15,  15,  10,   5, -30,
    -40, -20,   0,   5,   5,   0, -20, -40,
    -50, -40, -30, -30, -30, -30, -40, -50,
];

#[rustfmt::skip]
const BISHOP_TABLE: [i32; 64] = [
    -20, -10, -10, -10, -10, -10, -10, -20,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10,   0,   5,   5,   5,   5,   0, -10,
    -10,   0,   5,  10,  10,   5,   0, -10,
    -10,   0,   5,  10,  10,   5,   0, -10,
    -10,   0,   5,   5,   5,   5,   0, -10,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -20, -10, -10, -10, -10, -10, -10, -20,
];

#[rustfmt::skip]
const ROOK_TABLE: [i32; 64] = [
      0,  0,  0,  0,  0,  0,  0,   0,
     20, 20, 20, 20, 20, 20, 20,  10,
    -10, -5, -5, -5, -5, -5, -5, -10,
    -10, -5, -5,  0,  0, -5, -5, -10,
    -10, -5, -5,  0,  0, -5, -5, -10,
    -10, -5, -5, -5, -5, -5, -5, -10,
    -10, -5, -5, -5, -5, -5, -5, -10,
      0,  0, 10, 10, 10, 10, 10,   0,
];

#[rustfmt::skip]
const QUEEN_TABLE: [i32; 64] = [
    -20, -10, -5,  0,  0,  0, -10, -20,
    -10,   0,  5, 10, 10,  5,   0, -10,
     -5,   5, 15, 20, 20, 15,   5,  -5,
      0,  10, 20, 20, 20, 20,  10,   0,
      0,  10, 20, 20, 20, 20,  10,   0,
     -5,   5, 15, 20, 20, 15,   5,  -5,
    -10,   0,  5, 10, 10,  5,   0, -10,
    -20, -10, -5,  0,  0,  0, -10, -20,
];

#[rustfmt::skip]
const KING_MIDDLEGAME_TABLE: [i32; 64] = [
    -80, -70, -70, -70, -70, -70, -70, -80,
    -60, -60, -60, -60, -60, -60, -60, -60,
    -40, -50, -50, -60, -60, -50, -50, -40,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -20, -30, -30, -40, -40, -30, -30, -20,
    -10, -20, -20, -20, -20, -20, -20, -10,
     20,  20,  -5,  -5,  -5,  -5,  20,  20,
     20,  30,  10,   0,   0,  10,  30,  20,
];

#[rustfmt::skip]
const KING_ENDGAME_TABLE: [i32; 64] = [
    -20, -10, -10, -10, -10, -10, -10, -20,
     -5,   0,   5,   5,   5,   5,   0,  -5,
    -10,  -5,  20,  30,  30,  20,  -5, -10,
    -15, -10,  35,  45,  45,  35, -10, -15,
    -20, -15,  30,  40,  40,  30, -15, -20,
    -25, -20,  20,  25,  25,  20, -20, -25,
    -30, -25,   0,   0,   0,   0, -25, -30,
    -50, -30, -30, -30, -30, -30, -30, -50,
];

/// Table index of `square` for a piece of `color`; Black reads the tables
/// mirrored top to bottom.
#[inline]
fn table_index(square: Square, color: Color) -> usize {
    let row = match color {
        Color::White => 7 - square.rank(),
        Color::Black => square.rank(),
    };
    row as usize * 8 + square.file() as usize
}

fn table(piece: Piece) -> &'static [i32; 64] {
    match piece {
        Piece::Pawn => &PAWN_TABLE,
        Piece::Knight => &KNIGHT_TABLE,
        Piece::Bishop => &BISHOP_TABLE,
        Piece::Rook => &ROOK_TABLE,
        Piece::Queen => &QUEEN_TABLE,
        Piece::King => &KING_MIDDLEGAME_TABLE,
    }
}

/// Game stage in `[0, 1]`: 0 with a full board, 1 once only kings remain.
pub fn game_stage(position: &Position) -> f64 {
    let remaining = position.non_king_piece_count() as f64;
    let max = MAX_NON_KING_PIECES as f64;
    ((max - remaining) / max).clamp(0.0, 1.0)
}

fn center_distance(square: Square) -> f64 {
    (f64::from(square.rank()) - 3.5).hypot(f64::from(square.file()) - 3.5)
}

/// Static evaluation of `position`, from White's point of view.
///
/// Reads the position only; repeated calls return the same score.
pub fn evaluate(position: &Position) -> i32 {
    let stage = game_stage(position);
    let mut score = 0;
    let mut material_balance = 0;

    for (square, piece, color) in position.pieces() {
        let idx = table_index(square, color);
        let bonus = if piece == Piece::King {
            let mid = f64::from(KING_MIDDLEGAME_TABLE[idx]);
            let end = f64::from(KING_ENDGAME_TABLE[idx]);
            ((1.0 - stage) * mid + stage * end).round() as i32
        } else {
            table(piece)[idx]
        };
        let value = piece_value(piece) + bonus;
        let sign = if color == Color::White { 1 } else { -1 };
        score += sign * value;
        material_balance += sign * piece_value(piece);
    }

    score + king_activity(position, stage, material_balance.signum())
}

/// Rewards the side ahead in material (`sign` +1 for White, -1 for Black)
/// for a decentralized losing king and for king proximity.
fn king_activity(position: &Position, stage: f64, sign: i32) -> i32 {
    if sign == 0 {
        return 0;
    }
    let white = position.king_square(Color::White);
    let black = position.king_square(Color::Black);
    let (winner, loser) = if sign > 0 { (white, black) } else { (black, white) };
    let sign = f64::from(sign);

    let center = stage * CENTER_WEIGHT * (center_distance(loser) - center_distance(winner)) * sign;
    let manhattan = i32::from(white.file().abs_diff(black.file())) + i32::from(white.rank().abs_diff(black.rank()));
    let proximity = stage * PROXIMITY_WEIGHT * f64::from(MAX_KING_MANHATTAN - manhattan) * sign;
    (center + proximity).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(fen: &str) -> i32 {
        evaluate(&Position::parse(fen).unwrap())
    }

    #[test]
    fn startpos_is_balanced() {
        assert_eq!(evaluate(&Position::startpos()), 0);
    }

    #[test]
    fn mirrored_positions_negate() {
        let white = eval("4k3/8/8/8/8/2N5/PP6/4K3 w - - 0 1");
        let black = eval("4k3/pp6/2n5/8/8/8/8/4K3 w - - 0 1");
        assert_eq!(white, -black);
        assert!(white > 0);
    }

    #[test]
    fn material_dominates() {
        assert!(eval("4k3/8/8/8/8/8/8/3QK3 w - - 0 1") > 800);
        assert!(eval("3qk3/8/8/8/8/8/8/4K3 w - - 0 1") < -800);
    }

    #[test]
    fn pawn_table_orientation() {
        // A white pawn on the seventh rank is worth more than on its start square.
        let advanced = eval("4k3/P7/8/8/8/8/8/4K3 w - - 0 1");
        let home = eval("4k3/8/8/8/8/8/P7/4K3 w - - 0 1");
        assert!(advanced > home);
    }

    #[test]
    fn game_stage_bounds() {
        let start = game_stage(&Position::startpos());
        assert!((start - 0.0).abs() < f64::EPSILON);
        let bare = game_stage(&Position::parse("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap());
        assert!((bare - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn winning_side_prefers_cornered_enemy_king() {
        let cornered = eval("k7/8/8/8/8/8/8/3QK3 w - - 0 1");
        let central = eval("8/8/8/3k4/8/8/8/3QK3 w - - 0 1");
        assert!(cornered > central);
        let cornered = eval("3qk3/8/8/8/8/8/8/7K w - - 0 1");
        let central = eval("3qk3/8/8/8/3K4/8/8/8 w - - 0 1");
        assert!(cornered < central);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let pos = Position::parse("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1").unwrap();
        let before = pos.clone();
        assert_eq!(evaluate(&pos), evaluate(&pos));
        assert_eq!(pos, before);
    }
}
