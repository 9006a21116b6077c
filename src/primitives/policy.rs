//! Execution policy tags.
//!
//! ## Purpose
//!
//! This module defines the selector distinguishing sequential, host-parallel,
//! and device dispatch. The policy carries no runtime state beyond an
//! optional worker-count override; the device handle itself lives in a
//! thread-local executor inside the GPU engine.
//!
//! ## Design notes
//!
//! * **Parallel-first**: the default policy is `HostParallel` with the worker
//!   count auto-detected from available hardware concurrency.
//! * **Clamped configuration**: a worker count can never be zero
//!   (`NonZeroUsize`), and detection failure falls back to 1 worker, so
//!   configuration errors are corrected locally rather than surfaced.

// External dependencies
use std::num::NonZeroUsize;

// ============================================================================
// Execution Policy
// ============================================================================

/// Selector distinguishing sequential, host-parallel, and device dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPolicy {
    /// Single-threaded baseline delegating to standard-library iteration.
    Sequential,

    /// Fan-out/fan-in over scoped worker threads. `workers` overrides the
    /// detected hardware concurrency; `None` auto-detects (minimum 1).
    HostParallel {
        /// Optional worker-count override.
        workers: Option<NonZeroUsize>,
    },

    /// Multi-pass workgroup tree reduction on a GPU via `wgpu`.
    #[cfg(feature = "gpu")]
    Device,
}

impl Default for ExecutionPolicy {
    fn default() -> Self {
        Self::HostParallel { workers: None }
    }
}

impl ExecutionPolicy {
    /// Host-parallel execution with auto-detected worker count.
    pub fn host() -> Self {
        Self::HostParallel { workers: None }
    }

    /// Host-parallel execution with an explicit worker count. A zero count
    /// is clamped to 1.
    pub fn host_with_workers(workers: usize) -> Self {
        Self::HostParallel {
            workers: NonZeroUsize::new(workers.max(1)),
        }
    }
}
