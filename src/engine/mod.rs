//! Layer 2: Engine
//!
//! This layer provides the execution backends: the sequential baseline, the
//! host fan-out/fan-in executor over scoped threads, and the GPU multi-pass
//! reduction driver.

// Sequential baseline delegating to standard-library iteration.
pub mod sequential;

// Host-parallel executor using scoped worker threads.
pub mod host;

// GPU execution engine using wgpu.
#[cfg(feature = "gpu")]
pub mod gpu;
