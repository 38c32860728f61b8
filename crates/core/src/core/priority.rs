//! Priority queue for BPE merge candidates.
//!
//! During encoding every adjacent symbol pair that has a merge rule is a
//! candidate. The queue always yields the candidate with the lowest rank,
//! and among equal ranks the leftmost one.

use dary_heap::OctonaryHeap;
use std::cmp::Ordering;

/// A pending merge at a symbol position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeCandidate {
    /// Rank of the merge rule (lower merges first)
    pub rank: u32,
    /// Index of the left symbol of the pair
    pub pos: usize,
    /// ID of the token produced by the merge
    pub new_id: u32,
}

impl MergeCandidate {
    /// Create a new merge candidate.
    pub fn new(rank: u32, pos: usize, new_id: u32) -> Self {
        Self { rank, pos, new_id }
    }
}

// Max-heap ordering: lower rank first, then lower position.
impl Ord for MergeCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .rank
            .cmp(&self.rank)
            .then_with(|| other.pos.cmp(&self.pos))
    }
}

impl PartialOrd for MergeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue for BPE merge operations.
///
/// Uses an 8-ary heap for better cache locality than a binary heap.
/// Entries may go stale as symbols merge; callers validate on pop.
#[derive(Debug, Default)]
pub struct MergeQueue {
    heap: OctonaryHeap<MergeCandidate>,
}

impl MergeQueue {
    /// Create a new queue with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: OctonaryHeap::with_capacity(capacity),
        }
    }

    /// Create a new empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a merge candidate onto the queue.
    #[inline]
    pub fn push(&mut self, candidate: MergeCandidate) {
        self.heap.push(candidate);
    }

    /// Pop the highest priority merge candidate.
    #[inline]
    pub fn pop(&mut self) -> Option<MergeCandidate> {
        self.heap.pop()
    }

    /// Get the number of (potentially stale) entries in the queue.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
