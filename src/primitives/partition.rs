//! Balanced chunk partitioning.
//!
//! ## Purpose
//!
//! This module divides a range of `n` positions into `w` contiguous chunks
//! with deterministic remainder assignment. The fan-out executor and the
//! parallel scan both build their worker assignments from this single
//! partitioner.
//!
//! ## Design notes
//!
//! * **Deterministic remainder**: with `base = n / w` and `rem = n % w`, the
//!   first `rem` chunks absorb one extra element each, keeping the maximum
//!   length skew at 1 element. That bound is what keeps the fan-out balanced
//!   when `n` is not divisible by `w`.
//! * **Pure**: no error path; the worker count is clamped to at least 1 by
//!   callers before partitioning.
//!
//! ## Invariants
//!
//! * Chunks cover `[0, n)` exactly once and are non-overlapping.
//! * `chunk[i].len == base + (1 if i < rem else 0)`.
//! * `chunk[i].offset == i * base + min(i, rem)`.
//! * Chunk lengths sum to `n`; no two lengths differ by more than 1.
//!
//! ## Non-goals
//!
//! * This module does not spawn workers or touch the data itself.

// External dependencies
use std::ops::Range;

// ============================================================================
// Chunk
// ============================================================================

/// A contiguous sub-range assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// Position of the chunk's first element.
    pub offset: usize,
    /// Number of elements in the chunk.
    pub len: usize,
}

impl Chunk {
    /// The chunk as an index range.
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.len
    }

    /// Whether the chunk holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

// ============================================================================
// Partitioner
// ============================================================================

/// Divide `[0, n)` into `workers` balanced contiguous chunks.
///
/// If `n == 0`, every chunk is empty. A worker count of zero is treated
/// as 1.
pub fn partition(n: usize, workers: usize) -> Vec<Chunk> {
    let workers = workers.max(1);
    let base = n / workers;
    let rem = n % workers;

    (0..workers)
        .map(|i| Chunk {
            offset: i * base + i.min(rem),
            len: base + usize::from(i < rem),
        })
        .collect()
}
