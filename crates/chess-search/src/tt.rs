//! Bounded transposition table.
//!
//! A fixed number of slots addressed by hash; a store always replaces
//! whatever occupies the slot. Each slot keeps its key (position hash,
//! remaining depth, maximizing flag), so sharing a slot index is never
//! mistaken for a hit.
//!
//! The position is identified by its 64-bit Zobrist hash alone. Two
//! different positions with the same hash share entries; that collision is
//! accepted rather than checked with a stored board.

/// How a stored score relates to the true minimax value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// The score is the exact value.
    Exact,
    /// The true value is at least the score.
    Lower,
    /// The true value is at most the score.
    Upper,
}

impl Bound {
    /// Classifies a search result against the window `(alpha, beta)` it was
    /// searched with.
    pub fn classify(score: i32, alpha: i32, beta: i32) -> Bound {
        if score <= alpha {
            Bound::Upper
        } else if score >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtEntry {
    pub score: i32,
    pub bound: Bound,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    hash: u64,
    depth: u32,
    maximizing: bool,
    entry: TtEntry,
}

#[derive(Debug, Clone)]
pub struct TranspositionTable {
    slots: Vec<Option<Slot>>,
    occupied: usize,
    probes: u64,
    hits: u64,
}

impl TranspositionTable {
    /// Creates a table with `capacity` slots (at least one).
    pub fn new(capacity: usize) -> Self {
        TranspositionTable {
            slots: vec![None; capacity.max(1)],
            occupied: 0,
            probes: 0,
            hits: 0,
        }
    }

    #[inline]
    fn index(&self, hash: u64, depth: u32, maximizing: bool) -> usize {
        let key = hash ^ u64::from(depth).wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ u64::from(maximizing);
        (key % self.slots.len() as u64) as usize
    }

    pub fn probe(&mut self, hash: u64, depth: u32, maximizing: bool) -> Option<TtEntry> {
        self.probes += 1;
        let slot = self.slots[self.index(hash, depth, maximizing)]?;
        if slot.hash == hash && slot.depth == depth && slot.maximizing == maximizing {
            self.hits += 1;
            Some(slot.entry)
        } else {
            None
        }
    }

    pub fn store(&mut self, hash: u64, depth: u32, maximizing: bool, score: i32, bound: Bound) {
        let index = self.index(hash, depth, maximizing);
        let slot = &mut self.slots[index];
        if slot.is_none() {
            self.occupied += 1;
        }
        *slot = Some(Slot {
            hash,
            depth,
            maximizing,
            entry: TtEntry { score, bound },
        });
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.occupied = 0;
        self.probes = 0;
        self.hits = 0;
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.occupied
    }

    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// `(probes, hits)` since creation or the last [`clear`](Self::clear).
    pub fn stats(&self) -> (u64, u64) {
        (self.probes, self.hits)
    }
}
