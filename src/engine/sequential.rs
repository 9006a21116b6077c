//! Sequential baseline execution.
//!
//! ## Purpose
//!
//! This module provides the single-threaded baseline the parallel backends
//! are measured against. Each function delegates to standard-library
//! iteration with no partitioning, so evaluation order is exactly
//! left-to-right.

// ============================================================================
// Sequential Operations
// ============================================================================

/// Apply `op` elementwise into `output`.
pub fn transform<T, U, F>(input: &[T], output: &mut [U], op: &F)
where
    F: Fn(&T) -> U,
{
    for (src, dst) in input.iter().zip(output.iter_mut()) {
        *dst = op(src);
    }
}

/// Left-to-right fold of `map(x)` over the input, seeded with `init`.
pub fn transform_reduce<T, A, F, G>(input: &[T], init: A, combine: &F, map: &G) -> A
where
    F: Fn(A, A) -> A,
    G: Fn(&T) -> A,
{
    input.iter().fold(init, |acc, x| combine(acc, map(x)))
}

/// Inclusive prefix fold seeded with `init`; `init` is combined into every
/// prefix.
pub fn inclusive_scan<T, F>(input: &[T], output: &mut [T], init: T, combine: &F)
where
    T: Copy,
    F: Fn(T, T) -> T,
{
    let mut acc = init;
    for (src, dst) in input.iter().zip(output.iter_mut()) {
        acc = combine(acc, *src);
        *dst = acc;
    }
}
