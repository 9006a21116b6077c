//! Layer 3: API
//!
//! ## Purpose
//!
//! This module provides the policy-dispatched entry points: `transform`,
//! `reduce`, `transform_reduce`, and `inclusive_scan`. Each takes an
//! [`ExecutionPolicy`] selecting the sequential baseline, the host
//! fan-out/fan-in executor, or the device backend.
//!
//! ## Design notes
//!
//! * **Preconditions fail fast**: output sizing is validated up front and
//!   reported as `MismatchedLengths`. Input/output aliasing is impossible by
//!   construction (`&[T]` against `&mut [T]`).
//! * **Empty ranges short-circuit**: `transform` and `inclusive_scan` return
//!   with the output untouched, `reduce`/`transform_reduce` return `init`,
//!   all before any worker is spawned or any device submission is made.
//! * **Worker clamping**: an unset worker count is auto-detected from
//!   hardware concurrency, falling back to 1; it is never zero.
//!
//! ## Non-goals
//!
//! * No timing or benchmarking logic lives here; harnesses call these entry
//!   points and measure around them.

// External dependencies
use std::num::NonZeroUsize;

// Internal dependencies
#[cfg(feature = "gpu")]
use crate::engine::gpu;
use crate::engine::{host, sequential};
use crate::primitives::element::Element;
use crate::primitives::errors::ParafoldError;
use crate::primitives::ops::{CombineOp, MapOp};
use crate::primitives::policy::ExecutionPolicy;

fn resolve_workers(workers: Option<NonZeroUsize>) -> usize {
    workers.map(NonZeroUsize::get).unwrap_or_else(host::worker_count)
}

// ============================================================================
// Transform
// ============================================================================

/// Apply `op` elementwise into caller-owned output storage.
///
/// Chunks complete in no particular order relative to each other; within a
/// chunk, elements are processed in natural sequence order.
///
/// # Errors
///
/// `MismatchedLengths` if `output` is not exactly as long as `input`;
/// device errors under [`ExecutionPolicy::Device`].
///
/// ```rust
/// use parafold::prelude::*;
///
/// let data = vec![-3i32, 1, -4, 1, -5];
/// let mut out = vec![0i32; 5];
/// transform(&ExecutionPolicy::host(), &data, &mut out, Abs)?;
/// assert_eq!(out, [3, 1, 4, 1, 5]);
/// # Result::<(), ParafoldError>::Ok(())
/// ```
pub fn transform<T: Element>(
    policy: &ExecutionPolicy,
    input: &[T],
    output: &mut [T],
    op: MapOp,
) -> Result<(), ParafoldError> {
    if input.len() != output.len() {
        return Err(ParafoldError::MismatchedLengths {
            input: input.len(),
            output: output.len(),
        });
    }
    if input.is_empty() {
        return Ok(());
    }

    match policy {
        ExecutionPolicy::Sequential => {
            sequential::transform(input, output, &|x| op.apply(*x));
            Ok(())
        }
        ExecutionPolicy::HostParallel { workers } => {
            host::transform_with(input, output, resolve_workers(*workers), &|x| op.apply(*x));
            Ok(())
        }
        #[cfg(feature = "gpu")]
        ExecutionPolicy::Device => gpu::transform(input, output, op),
    }
}

// ============================================================================
// Reduce
// ============================================================================

/// Fold the input with `combine`, seeded with `init`.
///
/// Equivalent to [`transform_reduce`] with [`MapOp::Identity`]. The result
/// matches a sequential left-to-right fold for associative operators; exact
/// evaluation order is unspecified.
pub fn reduce<T: Element>(
    policy: &ExecutionPolicy,
    input: &[T],
    init: T,
    combine: CombineOp,
) -> Result<T, ParafoldError> {
    transform_reduce(policy, input, init, combine, MapOp::Identity)
}

// ============================================================================
// Transform-Reduce
// ============================================================================

/// Fold `map(x)` over the input with `combine`, seeded with `init`.
///
/// Parallel backends fold each chunk (or workgroup) seeded at the
/// operator's identity and combine the partial results with `init` last;
/// this is result-equivalent to a single-pass fold only for associative
/// operators.
///
/// ```rust
/// use parafold::prelude::*;
///
/// let data: Vec<i32> = (1..=4).collect();
/// let sum_of_squares =
///     transform_reduce(&ExecutionPolicy::host(), &data, 0, Sum, Square)?;
/// assert_eq!(sum_of_squares, 30);
/// # Result::<(), ParafoldError>::Ok(())
/// ```
pub fn transform_reduce<T: Element>(
    policy: &ExecutionPolicy,
    input: &[T],
    init: T,
    combine: CombineOp,
    map: MapOp,
) -> Result<T, ParafoldError> {
    if input.is_empty() {
        return Ok(init);
    }

    match policy {
        ExecutionPolicy::Sequential => Ok(sequential::transform_reduce(
            input,
            init,
            &|a, b| combine.apply(a, b),
            &|x| map.apply(*x),
        )),
        ExecutionPolicy::HostParallel { workers } => Ok(host::transform_reduce_with(
            input,
            resolve_workers(*workers),
            init,
            combine.identity(),
            &|a, b| combine.apply(a, b),
            &|x| map.apply(*x),
        )),
        #[cfg(feature = "gpu")]
        ExecutionPolicy::Device => gpu::transform_reduce(input, init, combine, map),
    }
}

// ============================================================================
// Inclusive Scan
// ============================================================================

/// Inclusive prefix fold with `combine`, seeded with `init`; `init` is
/// combined into every prefix.
///
/// Implemented for the sequential and host-parallel policies. The device
/// backend does not implement a scan and reports `UnsupportedOnDevice`
/// rather than degrading silently.
///
/// # Errors
///
/// `MismatchedLengths` if `output` is not exactly as long as `input`;
/// `UnsupportedOnDevice` under [`ExecutionPolicy::Device`].
pub fn inclusive_scan<T: Element>(
    policy: &ExecutionPolicy,
    input: &[T],
    output: &mut [T],
    init: T,
    combine: CombineOp,
) -> Result<(), ParafoldError> {
    if input.len() != output.len() {
        return Err(ParafoldError::MismatchedLengths {
            input: input.len(),
            output: output.len(),
        });
    }
    if input.is_empty() {
        return Ok(());
    }

    match policy {
        ExecutionPolicy::Sequential => {
            sequential::inclusive_scan(input, output, init, &|a, b| combine.apply(a, b));
            Ok(())
        }
        ExecutionPolicy::HostParallel { workers } => {
            host::inclusive_scan_with(
                input,
                output,
                resolve_workers(*workers),
                init,
                &|a, b| combine.apply(a, b),
            );
            Ok(())
        }
        #[cfg(feature = "gpu")]
        ExecutionPolicy::Device => Err(ParafoldError::UnsupportedOnDevice("inclusive_scan")),
    }
}
