//! Host fan-out/fan-in executor.
//!
//! ## Purpose
//!
//! This module distributes transform, reduce, and scan work across scoped
//! worker threads. The range is partitioned into balanced chunks, one chunk
//! per worker; the calling thread processes chunk 0 itself rather than
//! wasting a spawn when the worker count already reflects available
//! parallelism, then the scope joins every spawned worker before returning.
//!
//! ## Design notes
//!
//! * **Structured concurrency**: workers are spawned inside
//!   `std::thread::scope`, so every worker is joined before the call
//!   returns; there is no cancellation and no fire-and-forget path.
//! * **Race-free by construction**: each worker receives its chunk bounds by
//!   value and operator closures by shared reference, mutates only its own
//!   disjoint output slice (obtained via `split_at_mut`), and publishes its
//!   partial result through its join handle. No locking is needed because
//!   nothing is shared mutably during the parallel phase.
//! * **Two-level fold**: per-chunk folds are seeded at the operator's
//!   identity, then combined across chunks seeded with the caller's `init`.
//!   This is result-equivalent to a single-pass fold only for associative
//!   operators; callers must not rely on exact left-to-right order.
//!
//! ## Invariants
//!
//! * An empty input returns before any thread is spawned.
//! * Empty chunks (worker count above the element count) spawn no thread.
//! * Partial results are combined in chunk order.
//! * Worker panics propagate to the caller via `resume_unwind`.
//!
//! ## Non-goals
//!
//! * This module does not select worker counts (callers clamp and pass them).
//! * This module does not validate output sizing (handled by the API layer).

// External dependencies
use std::mem;
use std::num::NonZeroUsize;
use std::panic;
use std::thread;

// Internal dependencies
use crate::primitives::partition::{partition, Chunk};

// ============================================================================
// Worker Count
// ============================================================================

/// Available hardware concurrency, falling back to 1 (fully sequential)
/// when it cannot be determined.
pub fn worker_count() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

// ============================================================================
// Transform
// ============================================================================

/// Apply `op` elementwise into `output` across `workers` chunks.
///
/// `input` and `output` must have the same length.
pub fn transform_with<T, U, F>(input: &[T], output: &mut [U], workers: usize, op: &F)
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync,
{
    debug_assert_eq!(input.len(), output.len());
    if input.is_empty() {
        return;
    }

    let chunks = partition(input.len(), workers);
    let (first_out, mut rest) = output.split_at_mut(chunks[0].len);

    thread::scope(|scope| {
        for chunk in &chunks[1..] {
            let (chunk_out, remainder) = mem::take(&mut rest).split_at_mut(chunk.len);
            rest = remainder;
            if chunk.is_empty() {
                continue;
            }
            scope.spawn(move || transform_chunk(&input[chunk.range()], chunk_out, op));
        }
        transform_chunk(&input[chunks[0].range()], first_out, op);
    });
}

fn transform_chunk<T, U, F>(input: &[T], output: &mut [U], op: &F)
where
    F: Fn(&T) -> U,
{
    for (src, dst) in input.iter().zip(output.iter_mut()) {
        *dst = op(src);
    }
}

// ============================================================================
// Transform-Reduce
// ============================================================================

/// Fold `map(x)` over the input with `combine`, fanned out across `workers`
/// chunks.
///
/// Each worker folds its chunk seeded at `identity`; the calling thread then
/// folds the partial results in chunk order, seeded with `init`.
pub fn transform_reduce_with<T, A, F, G>(
    input: &[T],
    workers: usize,
    init: A,
    identity: A,
    combine: &F,
    map: &G,
) -> A
where
    T: Sync,
    A: Copy + Send,
    F: Fn(A, A) -> A + Sync,
    G: Fn(&T) -> A + Sync,
{
    if input.is_empty() {
        return init;
    }

    let chunks = partition(input.len(), workers);
    let mut partials = Vec::with_capacity(chunks.len());

    thread::scope(|scope| {
        let handles: Vec<_> = chunks[1..]
            .iter()
            .filter(|chunk| !chunk.is_empty())
            .map(|chunk| {
                scope.spawn(move || fold_chunk(&input[chunk.range()], identity, combine, map))
            })
            .collect();

        partials.push(fold_chunk(&input[chunks[0].range()], identity, combine, map));
        for handle in handles {
            partials.push(join_worker(handle));
        }
    });

    partials
        .into_iter()
        .fold(init, |acc, partial| combine(acc, partial))
}

fn fold_chunk<T, A, F, G>(chunk: &[T], identity: A, combine: &F, map: &G) -> A
where
    A: Copy,
    F: Fn(A, A) -> A,
    G: Fn(&T) -> A,
{
    chunk.iter().fold(identity, |acc, x| combine(acc, map(x)))
}

// ============================================================================
// Inclusive Scan
// ============================================================================

/// Inclusive prefix fold seeded with `init`, fanned out across `workers`
/// chunks.
///
/// Three phases: independent per-chunk local scans, a sequential exclusive
/// scan of the chunk totals on the calling thread, then a parallel rebase of
/// each chunk by its offset.
pub fn inclusive_scan_with<T, F>(input: &[T], output: &mut [T], workers: usize, init: T, combine: &F)
where
    T: Copy + Send + Sync,
    F: Fn(T, T) -> T + Sync,
{
    debug_assert_eq!(input.len(), output.len());
    if input.is_empty() {
        return;
    }

    let chunks = partition(input.len(), workers);

    // Phase 1: local inclusive scans, one chunk per worker.
    {
        let mut slices = split_chunks(output, &chunks).into_iter();
        let first_out = slices.next().unwrap_or_default();
        thread::scope(|scope| {
            for (chunk, chunk_out) in chunks[1..].iter().zip(slices) {
                if chunk.is_empty() {
                    continue;
                }
                scope.spawn(move || scan_chunk(&input[chunk.range()], chunk_out, combine));
            }
            scan_chunk(&input[chunks[0].range()], first_out, combine);
        });
    }

    // Phase 2: exclusive scan of chunk totals, seeded with `init`.
    let mut offsets = Vec::with_capacity(chunks.len());
    let mut running = init;
    for chunk in &chunks {
        offsets.push(running);
        if !chunk.is_empty() {
            running = combine(running, output[chunk.offset + chunk.len - 1]);
        }
    }

    // Phase 3: rebase each chunk by its offset.
    {
        let mut slices = split_chunks(output, &chunks).into_iter();
        let first_out = slices.next().unwrap_or_default();
        thread::scope(|scope| {
            for ((chunk, &offset), chunk_out) in
                chunks[1..].iter().zip(&offsets[1..]).zip(slices)
            {
                if chunk.is_empty() {
                    continue;
                }
                scope.spawn(move || rebase_chunk(chunk_out, offset, combine));
            }
            rebase_chunk(first_out, offsets[0], combine);
        });
    }
}

fn scan_chunk<T, F>(input: &[T], output: &mut [T], combine: &F)
where
    T: Copy,
    F: Fn(T, T) -> T,
{
    let mut acc: Option<T> = None;
    for (src, dst) in input.iter().zip(output.iter_mut()) {
        let next = match acc {
            None => *src,
            Some(prev) => combine(prev, *src),
        };
        *dst = next;
        acc = Some(next);
    }
}

fn rebase_chunk<T, F>(chunk: &mut [T], offset: T, combine: &F)
where
    T: Copy,
    F: Fn(T, T) -> T,
{
    for value in chunk.iter_mut() {
        *value = combine(offset, *value);
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Split `output` into disjoint mutable slices matching `chunks`.
fn split_chunks<'a, T>(output: &'a mut [T], chunks: &[Chunk]) -> Vec<&'a mut [T]> {
    let mut slices = Vec::with_capacity(chunks.len());
    let mut rest = output;
    for chunk in chunks {
        let (head, tail) = mem::take(&mut rest).split_at_mut(chunk.len);
        slices.push(head);
        rest = tail;
    }
    slices
}

fn join_worker<A>(handle: thread::ScopedJoinHandle<'_, A>) -> A {
    match handle.join() {
        Ok(value) => value,
        Err(payload) => panic::resume_unwind(payload),
    }
}
