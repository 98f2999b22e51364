//! Zobrist hashing for transposition lookups.
//!
//! The hash XORs one random key per occupied (piece, color, square), plus
//! keys for the side to move, each castling right and the en-passant file.
//! The two move counters are folded in last, so positions that differ only
//! in their clocks hash differently.

use chess_core::{Color, Piece, Square};

use crate::position::{CastlingRights, Position};

/// Random keys, fixed at compile time.
pub struct ZobristKeys {
    /// Indexed `[piece][color][square]`.
    pieces: [[[u64; 64]; 2]; 6],
    black_to_move: u64,
    /// One key per castling flag bit.
    castling: [u64; 4],
    en_passant: [u64; 8],
}

/// xorshift64 step.
const fn next_random(state: u64) -> u64 {
    let mut x = state;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    x
}

/// splitmix64 finalizer; spreads small counter values over all bits.
const fn mix(value: u64) -> u64 {
    let mut z = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

impl ZobristKeys {
    const fn new() -> Self {
        let mut state = 0x2545_F491_4F6C_DD1Du64;
        let mut pieces = [[[0u64; 64]; 2]; 6];
        let mut castling = [0u64; 4];
        let mut en_passant = [0u64; 8];

        let mut piece = 0;
        while piece < 6 {
            let mut color = 0;
            while color < 2 {
                let mut square = 0;
                while square < 64 {
                    state = next_random(state);
                    pieces[piece][color][square] = state;
                    square += 1;
                }
                color += 1;
            }
            piece += 1;
        }

        state = next_random(state);
        let black_to_move = state;

        let mut i = 0;
        while i < 4 {
            state = next_random(state);
            castling[i] = state;
            i += 1;
        }
        let mut i = 0;
        while i < 8 {
            state = next_random(state);
            en_passant[i] = state;
            i += 1;
        }

        ZobristKeys {
            pieces,
            black_to_move,
            castling,
            en_passant,
        }
    }

    #[inline]
    const fn piece_key(&self, piece: Piece, color: Color, square: Square) -> u64 {
        self.pieces[piece.index()][color.index()][square.index() as usize]
    }

    fn castling_key(&self, rights: CastlingRights) -> u64 {
        (0..4)
            .filter(|bit| rights.raw() & (1 << bit) != 0)
            .fold(0, |hash, bit| hash ^ self.castling[bit])
    }
}

static ZOBRIST: ZobristKeys = ZobristKeys::new();

/// Full hash of `position`, move counters included.
pub fn position_hash(position: &Position) -> u64 {
    let keys = &ZOBRIST;
    let mut hash = position
        .pieces()
        .fold(0u64, |hash, (sq, piece, color)| hash ^ keys.piece_key(piece, color, sq));

    if position.side_to_move() == Color::Black {
        hash ^= keys.black_to_move;
    }
    hash ^= keys.castling_key(position.castling_rights());
    if let Some(sq) = position.en_passant() {
        hash ^= keys.en_passant[sq.file() as usize];
    }

    hash ^= mix(u64::from(position.halfmove_clock()));
    hash ^= mix(u64::from(position.fullmove_number()) << 32);
    hash
}
