//! Simulation controller
//!
//! [`Simulation`] owns the process registry, the active allocator and the mode
//! configuration. Every command from the input layer goes through it, and the
//! presentation layer reads the read-only views it returns:
//! - [`RegionView`]: one row per region of the active allocator
//! - [`ProcessView`]: one row per registered process, in creation order
//! - [`MemoryStats`]: free space and fragmentation figures
//!
//! # Resets
//!
//! Changing the mode or the dynamic options, or calling [`Simulation::reset`],
//! rebuilds the allocator from scratch and marks every process unallocated.
//! Existing allocations are discarded, not migrated.

use crate::allocator::{self, Allocator, DynamicOptions, FitAlgorithm, Mode, SimError, Strategy};
use crate::memory::process::{Backing, ProcessId, ProcessRegistry};
use crate::memory::region::RegionList;
use crate::memory::{format_size, Address, MemorySpace};
use log::{debug, info, warn};

/// A region as shown to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionView {
    pub start: Address,
    pub size: u64,
    pub occupied: bool,
    pub owner_id: Option<ProcessId>,
    pub owner: Option<String>,
}

/// A process as shown to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessView {
    pub id: ProcessId,
    pub name: String,
    pub size: u64,
    pub allocated: bool,
    pub backing: Option<Backing>,
}

/// Space usage summary of the active allocator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryStats {
    pub usable: u64,
    pub used: u64,
    pub free: u64,
    pub largest_free: u64,
    pub free_regions: usize,
    /// Bytes inside occupied regions not needed by their process
    pub internal_fragmentation: u64,
    /// `1 - largest_free / free`, 0 when nothing is free
    pub external_fragmentation: f64,
}

pub struct Simulation {
    space: MemorySpace,
    registry: ProcessRegistry,
    allocator: Box<dyn Allocator>,
    mode: Mode,
    dynamic_options: DynamicOptions,
}

impl Simulation {
    /// Start a simulation over `space` in the given mode
    pub fn new(space: MemorySpace, mode: Mode, dynamic_options: DynamicOptions) -> Result<Self, SimError> {
        let strategy = Self::strategy_for(mode, dynamic_options);
        let allocator = allocator::build(strategy, &space)?;
        info!(
            "Simulating {} of memory ({} reserved) with {}",
            format_size(space.total()),
            format_size(space.reserved()),
            strategy
        );
        Ok(Simulation {
            space,
            registry: ProcessRegistry::new(),
            allocator,
            mode,
            dynamic_options,
        })
    }

    fn strategy_for(mode: Mode, options: DynamicOptions) -> Strategy {
        match mode {
            Mode::Static => Strategy::Fixed,
            Mode::Dynamic => Strategy::Dynamic(options),
        }
    }

    /// Replace the allocator with a fresh one for `mode` and clear all allocations.
    /// `options` replaces the stored dynamic options when given.
    pub fn switch_mode(&mut self, mode: Mode, options: Option<DynamicOptions>) -> Result<(), SimError> {
        let options = options.unwrap_or(self.dynamic_options);
        let strategy = Self::strategy_for(mode, options);
        self.allocator = allocator::build(strategy, &self.space)?;
        self.mode = mode;
        self.dynamic_options = options;
        self.registry.unassign_all();
        info!("Memory reset: now using {}", strategy);
        Ok(())
    }

    pub fn set_mode(&mut self, mode: Mode) -> Result<(), SimError> {
        self.switch_mode(mode, None)
    }

    pub fn set_dynamic_options(&mut self, fit: FitAlgorithm, coalesce: bool) -> Result<(), SimError> {
        self.switch_mode(self.mode, Some(DynamicOptions { fit, coalesce }))
    }

    /// Rebuild the current strategy's allocator
    pub fn reset(&mut self) -> Result<(), SimError> {
        self.switch_mode(self.mode, None)
    }

    /// Register a process of `size_bytes`. Fractional sizes round up.
    pub fn add_process(&mut self, size_bytes: f64) -> Result<ProcessId, SimError> {
        if !size_bytes.is_finite() || size_bytes <= 0.0 || size_bytes.ceil() >= u64::MAX as f64 {
            warn!("Rejected process size {}", size_bytes);
            return Err(SimError::InvalidProcessSize {
                input: size_bytes.to_string(),
            });
        }
        let size = size_bytes.ceil() as u64;
        let id = self.registry.register(size);
        if let Some(process) = self.registry.get(id) {
            info!("Created {}", process);
        }
        Ok(id)
    }

    /// Allocate the process with `id` under the active strategy.
    /// Unknown ids are ignored.
    pub fn allocate(&mut self, id: ProcessId) -> Result<(), SimError> {
        let Some(process) = self.registry.get_mut(id) else {
            debug!("Ignoring allocate for unknown process {}", id);
            return Ok(());
        };
        self.allocator.allocate(process)
    }

    /// Deallocate the process with `id`. Returns whether a region was freed;
    /// unknown or unallocated ids are a no-op.
    pub fn deallocate(&mut self, id: ProcessId) -> bool {
        let Some(process) = self.registry.get_mut(id) else {
            debug!("Ignoring deallocate for unknown process {}", id);
            return false;
        };
        self.allocator.deallocate(process)
    }

    /// Allocate when unallocated, deallocate otherwise
    pub fn toggle_allocation(&mut self, id: ProcessId) -> Result<(), SimError> {
        match self.registry.get(id).map(|p| p.is_allocated()) {
            Some(true) => {
                self.deallocate(id);
                Ok(())
            }
            Some(false) => self.allocate(id),
            None => Ok(()),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn dynamic_options(&self) -> DynamicOptions {
        self.dynamic_options
    }

    pub fn strategy(&self) -> Strategy {
        self.allocator.strategy()
    }

    pub fn memory_space(&self) -> &MemorySpace {
        &self.space
    }

    /// Raw region list of the active allocator
    pub fn region_list(&self) -> &RegionList {
        self.allocator.regions()
    }

    pub fn process(&self, id: ProcessId) -> Option<ProcessView> {
        self.registry.get(id).map(|p| ProcessView {
            id: p.id,
            name: p.name.clone(),
            size: p.size,
            allocated: p.is_allocated(),
            backing: p.backing(),
        })
    }

    /// Ids of all processes in creation order
    pub fn process_ids(&self) -> Vec<ProcessId> {
        self.registry.iter().map(|p| p.id).collect()
    }

    pub fn processes(&self) -> Vec<ProcessView> {
        self.registry
            .iter()
            .filter_map(|p| self.process(p.id))
            .collect()
    }

    pub fn regions(&self) -> Vec<RegionView> {
        self.allocator
            .regions()
            .iter()
            .map(|r| RegionView {
                start: r.start,
                size: r.size,
                occupied: r.is_occupied(),
                owner_id: r.owner,
                owner: r
                    .owner
                    .and_then(|id| self.registry.name_of(id))
                    .map(str::to_string),
            })
            .collect()
    }

    pub fn stats(&self) -> MemoryStats {
        let regions = self.allocator.regions();
        let free = regions.free_bytes();
        let largest_free = regions.largest_free();
        let internal_fragmentation = regions
            .iter()
            .filter_map(|r| {
                let process = self.registry.get(r.owner?)?;
                Some(r.size.saturating_sub(process.size))
            })
            .sum();
        let external_fragmentation = if free == 0 {
            0.0
        } else {
            1.0 - largest_free as f64 / free as f64
        };

        MemoryStats {
            usable: self.space.usable_size(),
            used: self.space.usable_size() - free,
            free,
            largest_free,
            free_regions: regions.free_count(),
            internal_fragmentation,
            external_fragmentation,
        }
    }

    /// Check the region list layout and that every process's backing points
    /// at a region it owns
    pub fn verify(&self) -> Result<(), SimError> {
        let regions = self.allocator.regions();
        regions.verify(&self.space)?;

        for process in self.registry.iter() {
            let owned = regions.position_owned_by(process.id);
            let consistent = match (process.backing(), owned) {
                (None, None) => true,
                (Some(Backing::Partition(index)), Some(i)) => index == i,
                (Some(Backing::Block(start)), Some(i)) => {
                    regions.get(i).is_some_and(|r| r.start == start)
                }
                _ => false,
            };
            if !consistent {
                return Err(SimError::LayoutViolation {
                    message: format!("{} backing does not match the region list", process.name),
                });
            }
        }
        Ok(())
    }
}
