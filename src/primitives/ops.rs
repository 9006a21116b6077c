//! Combine and map operator selectors.
//!
//! ## Purpose
//!
//! This module defines the operator selectors shared by every execution
//! policy. The host executor folds with ordinary closures internally, but
//! the device backend cannot ship arbitrary closures to a kernel, so the
//! public entry points take these selectors, each of which knows both its
//! host application and its WGSL expression.
//!
//! ## Design notes
//!
//! * **Identity-seeded folds**: every `CombineOp` has an identity value used
//!   to seed worker-local accumulators and to pad device lanes past the live
//!   data size, so partial workgroups never read uninitialized scratch.
//! * **Associativity assumed**: the two-level fold (per-chunk, then across
//!   partials) is only result-equivalent to a single left-to-right fold when
//!   the combine operator is associative. All four selectors are associative
//!   and commutative; floating-point results may still differ in the last
//!   bits between backends due to reassociation.
//!
//! ## Invariants
//!
//! * `combine(identity, x) == x` for every selector and element type.
//! * The WGSL expressions compute the same function as the host `apply`.

// Internal dependencies
use crate::primitives::element::Element;

// ============================================================================
// Combine Operator
// ============================================================================

/// Binary combine operator for reductions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombineOp {
    /// Addition; identity 0.
    Sum,
    /// Multiplication; identity 1.
    Product,
    /// Minimum; identity `T::max_value()`.
    Min,
    /// Maximum; identity `T::min_value()`.
    Max,
}

impl CombineOp {
    /// The operator's identity element.
    pub fn identity<T: Element>(self) -> T {
        match self {
            Self::Sum => T::zero(),
            Self::Product => T::one(),
            Self::Min => T::max_value(),
            Self::Max => T::min_value(),
        }
    }

    /// Apply the operator on the host.
    pub fn apply<T: Element>(self, a: T, b: T) -> T {
        match self {
            Self::Sum => a + b,
            Self::Product => a * b,
            Self::Min => {
                if b < a {
                    b
                } else {
                    a
                }
            }
            Self::Max => {
                if b > a {
                    b
                } else {
                    a
                }
            }
        }
    }

    /// WGSL expression combining locals `a` and `b`.
    #[cfg(feature = "gpu")]
    pub(crate) fn wgsl_expr(self) -> &'static str {
        match self {
            Self::Sum => "a + b",
            Self::Product => "a * b",
            Self::Min => "min(a, b)",
            Self::Max => "max(a, b)",
        }
    }
}

// ============================================================================
// Map Operator
// ============================================================================

/// Unary map operator for transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MapOp {
    /// Pass elements through unchanged.
    #[default]
    Identity,
    /// Square each element.
    Square,
    /// Absolute value of each element.
    Abs,
}

impl MapOp {
    /// Apply the operator on the host.
    pub fn apply<T: Element>(self, x: T) -> T {
        match self {
            Self::Identity => x,
            Self::Square => x * x,
            Self::Abs => x.abs_value(),
        }
    }

    /// WGSL expression mapping local `x`.
    #[cfg(feature = "gpu")]
    pub(crate) fn wgsl_expr(self) -> &'static str {
        match self {
            Self::Identity => "x",
            Self::Square => "x * x",
            Self::Abs => "abs(x)",
        }
    }
}
