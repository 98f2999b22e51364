//! Pin and check detection by scanning outward from a square.
//!
//! [`analyze`] walks the eight rays and the knight jumps from an origin
//! square (normally a king). The first friendly piece on a ray becomes a pin
//! candidate; an enemy piece that can attack along that ray then pins it, or
//! gives check when no friendly piece stands in between.

use chess_core::{Color, Piece, Square};

use crate::position::Position;

/// A step as `(file delta, rank delta)`.
pub type Direction = (i8, i8);

pub const ORTHOGONAL: [Direction; 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
pub const DIAGONAL: [Direction; 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];
pub const KNIGHT_JUMPS: [Direction; 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];
pub const KING_STEPS: [Direction; 8] = [
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (-1, 1),
    (1, -1),
    (-1, -1),
];

/// A friendly piece that may only move along `direction` (either way).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pin {
    pub square: Square,
    /// Ray from the origin towards the pinning piece.
    pub direction: Direction,
}

impl Pin {
    /// Whether a step in `direction` keeps the piece on the pin line.
    #[inline]
    pub fn allows(&self, direction: Direction) -> bool {
        let (df, dr) = self.direction;
        direction == (df, dr) || direction == (-df, -dr)
    }
}

/// An enemy piece attacking the origin square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Check {
    pub square: Square,
    /// Ray from the origin towards the checker, or the knight jump.
    pub direction: Direction,
    pub by_knight: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Analysis {
    pub pins: Vec<Pin>,
    pub checks: Vec<Check>,
}

impl Analysis {
    #[inline]
    pub fn in_check(&self) -> bool {
        !self.checks.is_empty()
    }

    #[inline]
    pub fn is_double_check(&self) -> bool {
        self.checks.len() > 1
    }

    pub fn pin_on(&self, square: Square) -> Option<Pin> {
        self.pins.iter().copied().find(|pin| pin.square == square)
    }
}

/// Whether `piece` of color `by`, found `distance` steps from the origin
/// along `direction`, attacks the origin.
fn attacks_along(piece: Piece, by: Color, direction: Direction, distance: u8) -> bool {
    let diagonal = direction.0 != 0 && direction.1 != 0;
    match piece {
        Piece::Queen | Piece::Rook | Piece::Bishop if diagonal => piece.slides_diagonally(),
        Piece::Queen | Piece::Rook | Piece::Bishop => piece.slides_orthogonally(),
        Piece::King => distance == 1,
        // The pawn sits one rank behind the origin from its own point of view.
        Piece::Pawn => distance == 1 && diagonal && direction.1 == -by.pawn_direction(),
        Piece::Knight => false,
    }
}

/// Pins against and checks on `origin` for the side `us`.
///
/// `us`'s own king is treated as empty space during the scan, so a king
/// cannot hide from a slider by stepping along the checking ray.
pub fn analyze(position: &Position, us: Color, origin: Square) -> Analysis {
    let them = us.opposite();
    let mut analysis = Analysis::default();

    for direction in ORTHOGONAL.into_iter().chain(DIAGONAL) {
        let mut candidate = None;
        let mut current = origin;
        let mut distance = 0u8;

        while let Some(sq) = current.offset(direction.0, direction.1) {
            current = sq;
            distance += 1;
            match position.piece_at(sq) {
                None => {}
                Some((Piece::King, color)) if color == us => {}
                Some((_, color)) if color == us => {
                    if candidate.is_some() {
                        break;
                    }
                    candidate = Some(sq);
                }
                Some((piece, _)) => {
                    if attacks_along(piece, them, direction, distance) {
                        match candidate {
                            None => analysis.checks.push(Check {
                                square: sq,
                                direction,
                                by_knight: false,
                            }),
                            Some(pinned) => analysis.pins.push(Pin {
                                square: pinned,
                                direction,
                            }),
                        }
                    }
                    break;
                }
            }
        }
    }

    for jump in KNIGHT_JUMPS {
        if let Some(sq) = origin.offset(jump.0, jump.1) {
            if position.piece_at(sq) == Some((Piece::Knight, them)) {
                analysis.checks.push(Check {
                    square: sq,
                    direction: jump,
                    by_knight: true,
                });
            }
        }
    }

    analysis
}

/// Whether any piece of color `by` attacks `square`.
///
/// The square may be empty or occupied; a pawn attacks its forward
/// diagonals whether or not something stands there. The defending king
/// does not block rays, so a square directly behind it on a slider's line
/// counts as attacked. This is the answer king-move legality needs, not a
/// listing of the attacker's pseudo-legal destinations.
pub fn is_square_attacked(position: &Position, square: Square, by: Color) -> bool {
    analyze(position, by.opposite(), square).in_check()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn analysis(fen: &str) -> Analysis {
        let pos = Position::parse(fen).unwrap();
        let us = pos.side_to_move();
        analyze(&pos, us, pos.king_square(us))
    }

    #[test]
    fn quiet_start() {
        let a = analysis("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        assert!(a.pins.is_empty());
        assert!(!a.in_check());
    }

    #[test]
    fn rook_pin_on_file() {
        let a = analysis("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1");
        assert_eq!(a.pins, vec![Pin { square: sq("e2"), direction: (0, 1) }]);
        assert!(!a.in_check());
        assert!(a.pin_on(sq("e2")).unwrap().allows((0, -1)));
        assert!(!a.pin_on(sq("e2")).unwrap().allows((1, 1)));
    }

    #[test]
    fn two_friendly_pieces_block_pin() {
        let a = analysis("4r1k1/8/8/8/4B3/8/4N3/4K3 w - - 0 1");
        assert!(a.pins.is_empty());
    }

    #[test]
    fn bishop_cannot_pin_orthogonally() {
        let a = analysis("4b1k1/8/8/8/8/8/4N3/4K3 w - - 0 1");
        assert!(a.pins.is_empty());
    }

    #[test]
    fn slider_and_knight_checks() {
        let a = analysis("6k1/8/8/8/8/3n4/8/4K2r w - - 0 1");
        assert!(a.is_double_check());
        assert!(a.checks.iter().any(|c| c.by_knight && c.square == sq("d3")));
        assert!(a.checks.iter().any(|c| !c.by_knight && c.square == sq("h1")));
    }

    #[test]
    fn pawn_checks_only_forward_diagonally() {
        assert!(analysis("6k1/8/8/8/8/8/3p4/4K3 w - - 0 1").in_check());
        assert!(!analysis("6k1/8/8/8/8/8/8/3pK3 w - - 0 1").in_check());
        // Pawn behind the king does not attack it.
        assert!(!analysis("6k1/8/8/8/8/8/4K3/3p4 w - - 0 1").in_check());
        assert!(analysis("6k1/5P2/8/8/8/8/8/4K3 b - - 0 1").in_check());
    }

    #[test]
    fn adjacent_king_is_check() {
        assert!(analysis("8/8/8/8/8/8/4k3/4K3 w - - 0 1").in_check());
    }

    #[test]
    fn own_king_is_transparent() {
        let pos = Position::parse("4k3/8/8/8/8/8/8/r3K3 w - - 0 1").unwrap();
        // f1 lies behind the king on the rook's rank.
        assert!(is_square_attacked(&pos, Square::F1, Color::Black));
        assert!(!is_square_attacked(&pos, sq("f2"), Color::Black));
    }

    #[test]
    fn empty_square_pawn_attack() {
        let pos = Position::parse("4k3/8/8/8/8/8/3p4/4K3 w - - 0 1").unwrap();
        assert!(is_square_attacked(&pos, sq("c1"), Color::Black));
        assert!(!is_square_attacked(&pos, sq("d1"), Color::Black));
    }
}
