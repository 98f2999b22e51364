//! Move ordering: capture swing, killer moves and history scores.

use chess_core::Move;

use crate::eval::piece_value;

/// Depths beyond this share the last killer and history row.
pub const MAX_DEPTH: usize = 64;

/// History entries are halved once any of them exceeds this.
const HISTORY_CEILING: u32 = 1 << 24;

const CAPTURE_BASE: i32 = 10_000;
const FIRST_KILLER: i32 = 9_000;
const SECOND_KILLER: i32 = 8_000;

#[inline]
fn depth_index(depth: u32) -> usize {
    (depth as usize).min(MAX_DEPTH - 1)
}

/// Two most recent quiet cutoff moves per depth, newest first.
#[derive(Debug, Clone)]
pub struct KillerTable {
    slots: Box<[[Option<Move>; 2]; MAX_DEPTH]>,
}

impl Default for KillerTable {
    fn default() -> Self {
        KillerTable {
            slots: Box::new([[None; 2]; MAX_DEPTH]),
        }
    }
}

impl KillerTable {
    pub fn record(&mut self, depth: u32, mv: Move) {
        let slot = &mut self.slots[depth_index(depth)];
        if slot[0] != Some(mv) {
            slot[1] = slot[0];
            slot[0] = Some(mv);
        }
    }

    pub fn get(&self, depth: u32) -> [Option<Move>; 2] {
        self.slots[depth_index(depth)]
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = [None; 2]);
    }
}

/// Success counts of quiet moves, indexed by depth, source and destination.
#[derive(Debug, Clone)]
pub struct HistoryTable {
    scores: Vec<u32>,
}

impl Default for HistoryTable {
    fn default() -> Self {
        HistoryTable {
            scores: vec![0; MAX_DEPTH * 64 * 64],
        }
    }
}

impl HistoryTable {
    #[inline]
    fn index(depth: u32, mv: Move) -> usize {
        depth_index(depth) * 4096 + mv.id() as usize
    }

    /// Adds `2^depth` to the move's score.
    pub fn reward(&mut self, depth: u32, mv: Move) {
        let bonus = 1u32 << depth.min(20);
        let idx = Self::index(depth, mv);
        self.scores[idx] = self.scores[idx].saturating_add(bonus);
        if self.scores[idx] > HISTORY_CEILING {
            self.scores.iter_mut().for_each(|score| *score /= 2);
        }
    }

    pub fn get(&self, depth: u32, mv: Move) -> u32 {
        self.scores[Self::index(depth, mv)]
    }

    pub fn clear(&mut self) {
        self.scores.iter_mut().for_each(|score| *score = 0);
    }
}

/// Ordering key: captures by material swing above killers above history.
pub fn move_score(mv: Move, depth: u32, killers: &KillerTable, history: &HistoryTable) -> i32 {
    if let Some((captured, _)) = mv.captured() {
        return CAPTURE_BASE + piece_value(captured) - piece_value(mv.piece());
    }
    let [first, second] = killers.get(depth);
    let killer_bonus = if first == Some(mv) {
        FIRST_KILLER
    } else if second == Some(mv) {
        SECOND_KILLER
    } else {
        0
    };
    killer_bonus.saturating_add(history.get(depth, mv).min(i32::MAX as u32) as i32)
}

/// Sorts `moves` best first. The sort is stable, so equal keys keep
/// generation order.
pub fn order_moves(moves: &mut [Move], depth: u32, killers: &KillerTable, history: &HistoryTable) {
    moves.sort_by_cached_key(|&mv| std::cmp::Reverse(move_score(mv, depth, killers, history)));
}
