//! Layer 1: Primitives
//!
//! # Purpose
//!
//! This layer provides the primitive abstractions used throughout the crate:
//! range partitioning, the element abstraction, operator selectors, the
//! execution-policy tag, and shared error types. It has zero internal
//! dependencies within the crate.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: API
//!   ↓
//! Layer 2: Engine
//!   ↓
//! Layer 1: Primitives ← You are here
//! ```

/// Balanced chunk partitioning.
pub mod partition;

/// Element type abstraction.
pub mod element;

/// Combine and map operator selectors.
pub mod ops;

/// Execution policy tags.
pub mod policy;

/// Shared error types.
pub mod errors;
