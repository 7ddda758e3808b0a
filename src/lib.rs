//! # Introduction
//!
//! partsim simulates how an operating system partitions a fixed memory space
//! between processes, for teaching. Memory is either split into static
//! partitions of preset sizes, or handed out as variable-size blocks chosen
//! by first-, best- or worst-fit with optional coalescing of free blocks.
//! A terminal UI built with [ratatui](https://docs.rs/ratatui) draws the
//! memory map as processes are created, allocated and freed.
//!
//! ## Control flow
//!
//! ```text
//! Input (keys, sizes) → Simulation → Allocator → RegionList / Processes → TUI
//! ```
//!
//! 1. [`memory`]: the data model: address space, regions, processes and
//!    size parsing.
//! 2. [`allocator`]: the fixed and dynamic strategies behind the
//!    [`allocator::Allocator`] trait.
//! 3. [`simulation`]: the controller that owns all state and routes commands.
//! 4. [`ui`]: ratatui-based TUI; not part of the stable library API.
//!
//! ## Example
//!
//! ```
//! use partsim::allocator::{DynamicOptions, FitAlgorithm, Mode};
//! use partsim::memory::{MemorySpace, MIB};
//! use partsim::simulation::Simulation;
//!
//! let options = DynamicOptions { fit: FitAlgorithm::Best, coalesce: true };
//! let mut sim = Simulation::new(MemorySpace::default(), Mode::Dynamic, options).unwrap();
//! let id = sim.add_process((2 * MIB) as f64).unwrap();
//! sim.allocate(id).unwrap();
//! assert_eq!(sim.regions().len(), 2);
//! ```

pub mod allocator;
pub mod memory;
pub mod simulation;
pub mod ui;
