//! Element type abstraction.
//!
//! ## Purpose
//!
//! This module defines the `Element` trait bounding the scalar types the
//! engine operates on. Host execution needs arithmetic, ordering, and
//! cross-thread sharing; device execution additionally needs a plain-old-data
//! layout and a WGSL scalar type to instantiate kernels with.
//!
//! ## Design notes
//!
//! * **Host bounds**: `num_traits::Num` supplies zero/one and the arithmetic
//!   operators; `Bounded` supplies the min/max identities.
//! * **Device bounds**: `bytemuck::Pod` permits byte-level buffer transfers;
//!   `WGSL_TYPE` names the device scalar, or is `None` when the type has no
//!   device representation (WGSL has no 64-bit scalars).
//!
//! ## Invariants
//!
//! * `WGSL_TYPE`, when present, names a 4-byte WGSL scalar type matching the
//!   host type's layout exactly.

// External dependencies
use bytemuck::Pod;
use num_traits::{Bounded, Num};

// ============================================================================
// Element Trait
// ============================================================================

/// Scalar element type usable with every execution policy.
pub trait Element: Copy + Send + Sync + PartialOrd + Num + Bounded + Pod + 'static {
    /// WGSL scalar type for device kernels, or `None` if the type cannot be
    /// represented on the device.
    const WGSL_TYPE: Option<&'static str>;

    /// Absolute value. Identity for unsigned types; wrapping for signed
    /// integers so `MIN` does not overflow.
    fn abs_value(self) -> Self;
}

impl Element for f32 {
    const WGSL_TYPE: Option<&'static str> = Some("f32");

    fn abs_value(self) -> Self {
        self.abs()
    }
}

impl Element for f64 {
    const WGSL_TYPE: Option<&'static str> = None;

    fn abs_value(self) -> Self {
        self.abs()
    }
}

impl Element for i32 {
    const WGSL_TYPE: Option<&'static str> = Some("i32");

    fn abs_value(self) -> Self {
        self.wrapping_abs()
    }
}

impl Element for u32 {
    const WGSL_TYPE: Option<&'static str> = Some("u32");

    fn abs_value(self) -> Self {
        self
    }
}
