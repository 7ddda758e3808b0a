//! Allocation strategies
//!
//! This module provides the two partitioning strategies behind a common
//! [`Allocator`] contract:
//! - [`fixed`]: static partitions of preset sizes, first-fit, never split or merged
//! - [`dynamic`]: variable-size blocks split to the exact request, chosen by a
//!   [`FitAlgorithm`], with optional coalescing of free neighbours
//! - [`errors`]: the [`SimError`] type shared by the whole crate
//!
//! A [`Strategy`] value selects the allocator; [`build`] constructs a fresh
//! instance with an initial, all-free region list.

pub mod dynamic;
pub mod errors;
pub mod fixed;

pub use dynamic::{DynamicAllocator, FitAlgorithm};
pub use errors::SimError;
pub use fixed::FixedAllocator;

use crate::memory::process::Process;
use crate::memory::region::RegionList;
use crate::memory::MemorySpace;
use std::fmt;
use std::str::FromStr;

/// Capability shared by every allocation strategy
pub trait Allocator {
    /// The strategy this allocator implements
    fn strategy(&self) -> Strategy;

    /// Current region list, in address order
    fn regions(&self) -> &RegionList;

    /// Place `process` into a region and record the backing on the process.
    ///
    /// On failure no state is modified.
    fn allocate(&mut self, process: &mut Process) -> Result<(), SimError>;

    /// Release the region owned by `process`, if any.
    ///
    /// Returns `false` (and changes nothing) when the process owns no region.
    fn deallocate(&mut self, process: &mut Process) -> bool;
}

/// Top-level partitioning mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Static,
    Dynamic,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Static => Mode::Dynamic,
            Mode::Dynamic => Mode::Static,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Static => f.write_str("static"),
            Mode::Dynamic => f.write_str("dynamic"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "static" | "fixed" => Ok(Mode::Static),
            "dynamic" | "variable" => Ok(Mode::Dynamic),
            other => Err(format!("unknown mode '{}' (expected static or dynamic)", other)),
        }
    }
}

/// Options for the dynamic strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicOptions {
    pub fit: FitAlgorithm,
    pub coalesce: bool,
}

impl Default for DynamicOptions {
    fn default() -> Self {
        DynamicOptions {
            fit: FitAlgorithm::First,
            coalesce: true,
        }
    }
}

/// Fully configured strategy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Fixed,
    Dynamic(DynamicOptions),
}

impl Strategy {
    pub fn mode(&self) -> Mode {
        match self {
            Strategy::Fixed => Mode::Static,
            Strategy::Dynamic(_) => Mode::Dynamic,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Fixed => f.write_str("static (first-fit)"),
            Strategy::Dynamic(opts) => write!(
                f,
                "dynamic ({}, coalescing {})",
                opts.fit,
                if opts.coalesce { "on" } else { "off" }
            ),
        }
    }
}

/// Construct a fresh allocator for `strategy` over `space`
pub fn build(strategy: Strategy, space: &MemorySpace) -> Result<Box<dyn Allocator>, SimError> {
    let allocator: Box<dyn Allocator> = match strategy {
        Strategy::Fixed => Box::new(FixedAllocator::new(space)?),
        Strategy::Dynamic(opts) => Box::new(DynamicAllocator::new(space, opts)),
    };
    Ok(allocator)
}

/// Reject an empty request, or one for a process that already holds a region
fn ensure_requestable(process: &Process) -> Result<(), SimError> {
    if process.size == 0 {
        return Err(SimError::InvalidProcessSize {
            input: format!("{} requests 0 bytes", process.name),
        });
    }
    if process.is_allocated() {
        return Err(SimError::AlreadyAllocated {
            process: process.name.clone(),
        });
    }
    Ok(())
}
