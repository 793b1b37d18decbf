use chess::ChessMove;

use crate::types::{pack_move, unpack_move, MATE_THRESHOLD};

/// How a stored score bounds the true value at its depth.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Bound {
    /// The true minimax value.
    Exact,
    /// A fail-high: the true value is at least this.
    Lower,
    /// A fail-low: the true value is at most this.
    Upper,
}

#[derive(Clone, Copy)]
pub struct TtEntry {
    pub key: u64,
    pub depth: i16,
    pub score: i32,
    pub bound: Bound,
    age: u8,
    best: u16,
}

impl TtEntry {
    #[inline]
    pub fn best_move(&self) -> Option<ChessMove> {
        unpack_move(self.best)
    }

    #[inline]
    fn vacant(&self) -> bool {
        self.depth == i16::MIN
    }
}

impl Default for TtEntry {
    fn default() -> Self {
        Self {
            key: 0,
            depth: i16::MIN,
            score: 0,
            bound: Bound::Exact,
            age: 0,
            best: 0,
        }
    }
}

const ASSOC: usize = 4;

/// Fixed-size 4-way bucketed transposition table. The full 64-bit key is
/// stored per entry, so index collisions never surface stale data.
pub struct TranspositionTable {
    buckets: Vec<[TtEntry; ASSOC]>,
    mask: usize,
    age: u8,
}

impl TranspositionTable {
    pub fn new_from_mb(mb: usize) -> Self {
        use std::mem::size_of;
        let entry_sz = size_of::<TtEntry>().max(1);
        let bytes = mb.saturating_mul(1024 * 1024);
        let total_entries = (bytes / entry_sz).max(ASSOC);
        let mut buckets = (total_entries / ASSOC).max(1);

        // round down to a power of two
        let mut pow2 = 1usize;
        while (pow2 << 1) <= buckets {
            pow2 <<= 1;
        }
        buckets = pow2;

        let mask = buckets - 1;
        Self {
            buckets: vec![[TtEntry::default(); ASSOC]; buckets],
            mask,
            age: 0,
        }
    }

    #[inline]
    fn idx(&self, key: u64) -> usize {
        (key as usize) & self.mask
    }

    /// Forget everything (ucinewgame).
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            *bucket = [TtEntry::default(); ASSOC];
        }
        self.age = 0;
    }

    /// Age entries by one search so replacement can prefer fresh results.
    pub fn new_search(&mut self) {
        self.age = self.age.wrapping_add(1);
    }

    pub fn probe(&self, key: u64) -> Option<TtEntry> {
        let bucket = &self.buckets[self.idx(key)];
        let mut best: Option<TtEntry> = None;
        for &e in bucket.iter() {
            if e.key == key && !e.vacant() {
                if best.map_or(true, |b| e.depth > b.depth) {
                    best = Some(e);
                }
            }
        }
        best
    }

    pub fn store(&mut self, key: u64, depth: i32, score: i32, bound: Bound, best: Option<ChessMove>) {
        let i = self.idx(key);
        let age = self.age;
        let bucket = &mut self.buckets[i];

        let entry = TtEntry {
            key,
            depth: depth as i16,
            score,
            bound,
            age,
            best: best.map(pack_move).unwrap_or(0),
        };

        // An existing slot for this position is always refreshed.
        for e in bucket.iter_mut() {
            if e.key == key && !e.vacant() {
                *e = entry;
                return;
            }
        }

        // Otherwise evict the shallowest slot, oldest on ties.
        let mut replace_at = 0usize;
        for (j, e) in bucket.iter().enumerate() {
            let r = &bucket[replace_at];
            let worse_depth = e.depth < r.depth;
            let same_depth_older = e.depth == r.depth && r.age.wrapping_sub(e.age) > 0;
            if worse_depth || same_depth_older {
                replace_at = j;
            }
        }
        bucket[replace_at] = entry;
    }
}

// Mate scores are stored relative to the entry's own node so the same
// position reached at a different ply still reads correctly.
#[inline]
pub fn to_tt(score: i32, ply: i32) -> i32 {
    if score > MATE_THRESHOLD {
        score + ply
    } else if score < -MATE_THRESHOLD {
        score - ply
    } else {
        score
    }
}

#[inline]
pub fn from_tt(score: i32, ply: i32) -> i32 {
    if score > MATE_THRESHOLD {
        score - ply
    } else if score < -MATE_THRESHOLD {
        score + ply
    } else {
        score
    }
}
