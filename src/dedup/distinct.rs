use std::collections::HashSet;
use std::num::NonZeroU64;

/// In-memory set of distinct lines for the current split segment.
#[derive(Debug, Default)]
pub struct DistinctSet {
    lines: HashSet<Vec<u8>>,
}

impl DistinctSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a line. Returns `true` if the set grew.
    #[inline]
    pub fn insert(&mut self, line: Vec<u8>) -> bool {
        self.lines.insert(line)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Empty the set and return its members in ascending byte order.
    /// The hash table itself is released, not just cleared.
    pub fn drain_sorted(&mut self) -> Vec<Vec<u8>> {
        let mut sorted: Vec<Vec<u8>> = std::mem::take(&mut self.lines).into_iter().collect();
        sorted.sort_unstable();
        sorted
    }
}

/// Tracks how many bytes of distinct content the current segment holds.
///
/// Only lines that grew the distinct set are counted; a repeat of a line
/// already in the set adds nothing. Lengths are the raw input lengths,
/// terminator included.
#[derive(Debug, Clone, Copy)]
pub struct GrowthAccumulator {
    budget: u64,
    bytes: u64,
}

impl GrowthAccumulator {
    pub fn new(budget: NonZeroU64) -> Self {
        Self {
            budget: budget.get(),
            bytes: 0,
        }
    }

    /// Account for a line that was just inserted into the distinct set.
    #[inline]
    pub fn observe(&mut self, grew: bool, raw_len: usize) {
        if grew {
            self.bytes = self.bytes.saturating_add(raw_len as u64);
        }
    }

    /// Would adding a line of `next_len` raw bytes push the segment past the budget?
    #[inline]
    pub fn would_exceed(&self, next_len: usize) -> bool {
        self.bytes.saturating_add(next_len as u64) > self.budget
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn budget(&self) -> u64 {
        self.budget
    }

    pub fn reset(&mut self) {
        self.bytes = 0;
    }
}
