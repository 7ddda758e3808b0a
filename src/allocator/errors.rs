//! Error types for the simulator
//!
//! None of these are fatal: after any error the simulation and its stores
//! remain usable, and the failed operation has left state unchanged.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// Requested size is non-numeric, zero, negative or not finite
    #[error("Invalid process size: {input:?} (expected a positive size such as 512KB)")]
    InvalidProcessSize { input: String },

    /// No region satisfies the request under the active strategy
    #[error("Cannot allocate {process}: no free region can hold {size} bytes")]
    AllocationFailure { process: String, size: u64 },

    /// The process already occupies a region
    #[error("{process} is already allocated")]
    AlreadyAllocated { process: String },

    /// A region list broke the contiguity/coverage invariant
    #[error("Memory layout violation: {message}")]
    LayoutViolation { message: String },
}
