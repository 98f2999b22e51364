//! Perft (performance test) for move generator validation.
//!
//! Perft counts the leaf nodes of the legal move tree at a given depth. The
//! counts are compared against published values to validate the generator
//! together with make/undo.
//!
//! The generator emits a single (queen) promotion per pawn move, so
//! reference positions are limited to ones where no promotion happens within
//! the tested depth.

use super::legal_moves;
use crate::Position;

/// Counts the leaf nodes at `depth`, restoring `position` afterwards.
pub fn perft(position: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = legal_moves(position);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for mv in moves {
        if position.make_move(mv).is_ok() {
            nodes += perft(position, depth - 1);
            position.undo_move();
        }
    }
    nodes
}

/// Per-move node counts at `depth`, sorted by move text.
pub fn perft_divide(position: &mut Position, depth: u32) -> Vec<(String, u64)> {
    let mut results: Vec<(String, u64)> = legal_moves(position)
        .into_iter()
        .filter_map(|mv| {
            position.make_move(mv).ok()?;
            let nodes = perft(position, depth.saturating_sub(1));
            position.undo_move();
            Some((mv.to_uci(), nodes))
        })
        .collect();

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}
