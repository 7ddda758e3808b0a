//! Fixed-partition allocator
//!
//! Partitions are laid out once at construction from
//! [`FIXED_PARTITION_SIZES`](crate::memory::FIXED_PARTITION_SIZES) and are never
//! resized, split or merged. Allocation is first-fit in address order; the
//! unused tail of a partition is internal fragmentation.

use super::{ensure_requestable, Allocator, SimError, Strategy};
use crate::memory::process::{Backing, Process};
use crate::memory::region::RegionList;
use crate::memory::{format_size, MemorySpace, FIXED_PARTITION_SIZES};
use log::{info, warn};

#[derive(Debug, Clone)]
pub struct FixedAllocator {
    regions: RegionList,
}

impl FixedAllocator {
    /// Partition the usable space with the default partition sizes
    pub fn new(space: &MemorySpace) -> Result<Self, SimError> {
        Self::with_sizes(space, &FIXED_PARTITION_SIZES)
    }

    /// Partition the usable space with custom sizes that must sum to it
    pub fn with_sizes(space: &MemorySpace, sizes: &[u64]) -> Result<Self, SimError> {
        Ok(FixedAllocator {
            regions: RegionList::partitioned(space, sizes)?,
        })
    }
}

impl Allocator for FixedAllocator {
    fn strategy(&self) -> Strategy {
        Strategy::Fixed
    }

    fn regions(&self) -> &RegionList {
        &self.regions
    }

    fn allocate(&mut self, process: &mut Process) -> Result<(), SimError> {
        ensure_requestable(process)?;

        let Some(index) = self
            .regions
            .iter()
            .position(|r| r.is_free() && r.size >= process.size)
        else {
            warn!(
                "No free partition can hold {} ({})",
                process.name,
                format_size(process.size)
            );
            return Err(SimError::AllocationFailure {
                process: process.name.clone(),
                size: process.size,
            });
        };

        self.regions.occupy(index, process.id);
        process.assign(Backing::Partition(index));
        if let Some(partition) = self.regions.get(index) {
            info!(
                "Allocated {} to partition {} ({}, {} unused)",
                process,
                index,
                format_size(partition.size),
                format_size(partition.size - process.size)
            );
        }
        Ok(())
    }

    fn deallocate(&mut self, process: &mut Process) -> bool {
        let Some(index) = self.regions.position_owned_by(process.id) else {
            return false;
        };
        self.regions.release(index);
        process.unassign();
        info!("Freed partition {} held by {}", index, process.name);
        true
    }
}
