//! Error types for engine operations.
//!
//! ## Purpose
//!
//! This module defines the error conditions that can occur during transform
//! and reduction operations: contract violations caught up front, and device
//! failures reported from the GPU backend.
//!
//! ## Design notes
//!
//! * **Contextual**: Errors carry the relevant values (e.g. actual lengths).
//! * **Explicit device failures**: "no accelerator available" and "fault
//!   during kernel build/execution" are distinct variants so callers can
//!   branch on them instead of receiving an unremarked default value.
//! * **Locally corrected configuration**: invalid worker counts are clamped
//!   at the call site and never reach this type.
//!
//! ## Invariants
//!
//! * All variants provide sufficient context for diagnosis.
//! * Error messages are consistent in tone and formatting.
//!
//! ## Non-goals
//!
//! * This module does not perform validation itself.
//! * This module does not provide retry or fallback strategies.

// External dependencies
use std::error::Error;
use std::fmt::{Display, Formatter, Result};

// ============================================================================
// Error Type
// ============================================================================

/// Error type for engine operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ParafoldError {
    /// Input and output ranges must have the same number of elements.
    MismatchedLengths {
        /// Number of elements in the input range.
        input: usize,
        /// Number of elements in the output range.
        output: usize,
    },

    /// No usable accelerator: adapter enumeration or device request failed.
    DeviceUnavailable(String),

    /// Shader or pipeline validation failed while building the kernel.
    KernelBuild(String),

    /// Fault during kernel submission, synchronization, or readback.
    KernelExecution(String),

    /// The device backend cannot express the requested element type or
    /// operation.
    UnsupportedOnDevice(&'static str),
}

// ============================================================================
// Display Implementation
// ============================================================================

impl Display for ParafoldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::MismatchedLengths { input, output } => {
                write!(
                    f,
                    "Length mismatch: input has {input} elements, output has {output}"
                )
            }
            Self::DeviceUnavailable(reason) => {
                write!(f, "No accelerator available: {reason}")
            }
            Self::KernelBuild(reason) => write!(f, "Kernel build failed: {reason}"),
            Self::KernelExecution(reason) => {
                write!(f, "Kernel execution fault: {reason}")
            }
            Self::UnsupportedOnDevice(what) => {
                write!(f, "Not supported on the device backend: {what}")
            }
        }
    }
}

// ============================================================================
// Standard Error Trait
// ============================================================================

impl Error for ParafoldError {}
