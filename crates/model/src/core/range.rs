use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Contiguous archive positions `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRange {
    pub from: u64,
    pub to: u64,
}

/// How a range splits into chunk-sized batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    pub full_batches: u64,
    pub tail_len: u64,
}

impl ChunkPlan {
    pub fn total_batches(&self) -> u64 {
        self.full_batches + u64::from(self.tail_len > 0)
    }
}

impl IndexRange {
    /// An inverted range is normalised to an empty one at `from`.
    pub fn new(from: u64, to: u64) -> Self {
        Self {
            from,
            to: to.max(from),
        }
    }

    /// `count` positions starting at `from`, saturating at `u64::MAX`.
    pub fn starting_at(from: u64, count: u64) -> Self {
        Self::new(from, from.saturating_add(count))
    }

    pub fn len(&self) -> u64 {
        self.to - self.from
    }

    pub fn is_empty(&self) -> bool {
        self.to == self.from
    }

    pub fn chunk_plan(&self, chunk_size: u64) -> ChunkPlan {
        assert!(chunk_size > 0, "chunk size must be positive");
        ChunkPlan {
            full_batches: self.len() / chunk_size,
            tail_len: self.len() % chunk_size,
        }
    }

    pub fn iter(&self) -> Range<u64> {
        self.from..self.to
    }
}
