//! # parafold
//!
//! A parallel reduction and transform engine for data-parallel numeric
//! workloads over contiguous slices, with interchangeable execution policies:
//!
//! - **Sequential**: a baseline that delegates to standard-library iteration.
//! - **HostParallel**: a fan-out/fan-in executor that partitions the range
//!   into balanced chunks processed by scoped worker threads, with the
//!   calling thread handling the first chunk itself.
//! - **Device**: a GPU backend (via `wgpu`) that performs a hierarchical
//!   tree reduction in workgroup shared memory, re-launched over the
//!   shrinking partial-result buffer until a single aggregate remains.
//!
//! All policies produce results equivalent to a sequential left-to-right
//! fold for associative combine operators (sum, product, min, max). The
//! engine hides chunk and workgroup boundary bookkeeping from the caller.
//!
//! ## Quick Start
//!
//! ```rust
//! use parafold::prelude::*;
//!
//! let data: Vec<i32> = (0..16).collect();
//!
//! // Balanced fan-out over 4 worker threads, seeded with 42.
//! let policy = ExecutionPolicy::host_with_workers(4);
//! let total = reduce(&policy, &data, 42, Sum)?;
//! assert_eq!(total, 162); // 42 + 0 + 1 + ... + 15
//!
//! // Elementwise transform into caller-owned output storage.
//! let mut squares = vec![0i32; data.len()];
//! transform(&policy, &data, &mut squares, Square)?;
//! assert_eq!(squares[5], 25);
//! # Result::<(), ParafoldError>::Ok(())
//! ```
//!
//! ## Device execution
//!
//! ```rust,no_run
//! use parafold::prelude::*;
//!
//! let data: Vec<f32> = (0..4096).map(|i| i as f32).collect();
//!
//! // Multi-pass workgroup tree reduction on the GPU.
//! match transform_reduce(&ExecutionPolicy::Device, &data, 0.0, Sum, Square) {
//!     Ok(sum_of_squares) => println!("{sum_of_squares}"),
//!     Err(ParafoldError::DeviceUnavailable(reason)) => {
//!         eprintln!("no accelerator: {reason}");
//!     }
//!     Err(e) => return Err(e),
//! }
//! # Result::<(), ParafoldError>::Ok(())
//! ```
//!
//! ## Error Handling
//!
//! Entry points return `Result<_, ParafoldError>`. Device failures are
//! explicit: `DeviceUnavailable` when no adapter can be acquired,
//! `KernelBuild` when shader or pipeline validation fails, and
//! `KernelExecution` for faults during submission or readback. Worker-count
//! configuration problems are corrected by clamping and never surfaced.

// Layer 1: Primitives - partitioning, operators, policies, errors.
pub mod primitives;

// Layer 2: Engine - sequential, host-parallel, and device executors.
pub mod engine;

// Layer 3: API - policy-dispatched entry points.
pub mod api;

// Standard parafold prelude.
pub mod prelude {
    pub use crate::api::{inclusive_scan, reduce, transform, transform_reduce};
    pub use crate::primitives::element::Element;
    pub use crate::primitives::errors::ParafoldError;
    pub use crate::primitives::ops::{
        CombineOp,
        CombineOp::{Max, Min, Product, Sum},
        MapOp,
        MapOp::{Abs, Identity, Square},
    };
    pub use crate::primitives::policy::ExecutionPolicy;
}
