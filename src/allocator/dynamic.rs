//! Dynamic (variable-partition) allocator
//!
//! The usable space starts out as one free block. Each allocation picks a
//! free block with the configured [`FitAlgorithm`] and splits it: the front
//! becomes an occupied block of exactly the requested size and the rest stays
//! free directly after it. Deallocation frees the owner's block and, when
//! coalescing is enabled, merges every run of neighbouring free blocks.
//!
//! # Fit Selection
//!
//! All three algorithms scan blocks in address order and only consider free
//! blocks at least as large as the request:
//! - **First**: the first such block
//! - **Best**: the block leaving the smallest remainder
//! - **Worst**: the block leaving the largest remainder
//!
//! Best and worst fit use strict comparisons, so the lowest address wins ties.

use super::{ensure_requestable, Allocator, DynamicOptions, SimError, Strategy};
use crate::memory::process::{Backing, Process};
use crate::memory::region::{Region, RegionList};
use crate::memory::{format_size, MemorySpace};
use log::{debug, info, warn};
use std::fmt;
use std::str::FromStr;

/// Rule for choosing among free blocks that can hold a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitAlgorithm {
    First,
    Best,
    Worst,
}

impl FitAlgorithm {
    /// Next algorithm in the cycle first -> best -> worst -> first
    pub fn next(self) -> Self {
        match self {
            FitAlgorithm::First => FitAlgorithm::Best,
            FitAlgorithm::Best => FitAlgorithm::Worst,
            FitAlgorithm::Worst => FitAlgorithm::First,
        }
    }

    /// Index of the block chosen for a request of `size` bytes
    pub fn select(self, regions: &[Region], size: u64) -> Option<usize> {
        let mut candidates = regions
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_free() && r.size >= size)
            .map(|(i, r)| (i, r.size - size));

        match self {
            FitAlgorithm::First => candidates.next().map(|(i, _)| i),
            FitAlgorithm::Best => {
                let mut best: Option<(usize, u64)> = None;
                for (i, remainder) in candidates {
                    if best.map_or(true, |(_, b)| remainder < b) {
                        best = Some((i, remainder));
                    }
                }
                best.map(|(i, _)| i)
            }
            FitAlgorithm::Worst => {
                let mut worst: Option<(usize, u64)> = None;
                for (i, remainder) in candidates {
                    if worst.map_or(true, |(_, w)| remainder > w) {
                        worst = Some((i, remainder));
                    }
                }
                worst.map(|(i, _)| i)
            }
        }
    }
}

impl fmt::Display for FitAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitAlgorithm::First => f.write_str("first-fit"),
            FitAlgorithm::Best => f.write_str("best-fit"),
            FitAlgorithm::Worst => f.write_str("worst-fit"),
        }
    }
}

impl FromStr for FitAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "first" | "first-fit" => Ok(FitAlgorithm::First),
            "best" | "best-fit" => Ok(FitAlgorithm::Best),
            "worst" | "worst-fit" => Ok(FitAlgorithm::Worst),
            other => Err(format!(
                "unknown fit algorithm '{}' (expected first, best or worst)",
                other
            )),
        }
    }
}

/// Merge every run of neighbouring free regions. Returns the number of merges.
///
/// Stays on the same index after a merge so runs of three or more collapse
/// in one pass.
pub fn coalesce(regions: &mut RegionList) -> usize {
    let mut merges = 0;
    let mut i = 0;
    while i + 1 < regions.len() {
        let both_free = matches!(
            (regions.get(i), regions.get(i + 1)),
            (Some(left), Some(right)) if left.is_free() && right.is_free()
        );
        if both_free {
            regions.merge_with_next(i);
            merges += 1;
        } else {
            i += 1;
        }
    }
    if merges > 0 {
        debug!("Coalesced {} free block pair(s)", merges);
    }
    merges
}

#[derive(Debug, Clone)]
pub struct DynamicAllocator {
    regions: RegionList,
    options: DynamicOptions,
}

impl DynamicAllocator {
    pub fn new(space: &MemorySpace, options: DynamicOptions) -> Self {
        DynamicAllocator {
            regions: RegionList::single_free(space),
            options,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_regions(regions: RegionList, options: DynamicOptions) -> Self {
        DynamicAllocator { regions, options }
    }

    /// Merge neighbouring free blocks regardless of the coalescing option
    pub fn coalesce(&mut self) -> usize {
        coalesce(&mut self.regions)
    }
}

impl Allocator for DynamicAllocator {
    fn strategy(&self) -> Strategy {
        Strategy::Dynamic(self.options)
    }

    fn regions(&self) -> &RegionList {
        &self.regions
    }

    fn allocate(&mut self, process: &mut Process) -> Result<(), SimError> {
        ensure_requestable(process)?;

        let Some(index) = self.options.fit.select(self.regions.as_slice(), process.size) else {
            warn!(
                "{}: no free block can hold {} ({} free, largest {})",
                self.options.fit,
                process,
                format_size(self.regions.free_bytes()),
                format_size(self.regions.largest_free())
            );
            return Err(SimError::AllocationFailure {
                process: process.name.clone(),
                size: process.size,
            });
        };

        if self.regions.split(index, process.size) {
            debug!(
                "Split block {} to {} with a free remainder",
                index,
                format_size(process.size)
            );
        }
        self.regions.occupy(index, process.id);

        let Some(block) = self.regions.get(index) else {
            return Err(SimError::LayoutViolation {
                message: format!("block {} vanished during allocation", index),
            });
        };
        process.assign(Backing::Block(block.start));
        info!(
            "Allocated {} at 0x{:08x} using {}",
            process, block.start, self.options.fit
        );
        Ok(())
    }

    fn deallocate(&mut self, process: &mut Process) -> bool {
        let Some(index) = self.regions.position_owned_by(process.id) else {
            return false;
        };
        self.regions.release(index);
        process.unassign();
        if let Some(block) = self.regions.get(index) {
            info!(
                "Freed {} block at 0x{:08x} held by {}",
                format_size(block.size),
                block.start,
                process.name
            );
        }
        if self.options.coalesce {
            coalesce(&mut self.regions);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::process::ProcessId;
    use crate::memory::{KIB, MIB};

    fn process(id: u32, size: u64) -> Process {
        Process::new(ProcessId(id), format!("P{}", id), size)
    }

    fn options(fit: FitAlgorithm, coalesce: bool) -> DynamicOptions {
        DynamicOptions { fit, coalesce }
    }

    /// Free blocks of 512 KiB, 2 MiB and 1 MiB separated by occupied spacers
    fn fragmented(space: &MemorySpace) -> RegionList {
        let sizes = [
            (512 * KIB, None),
            (256 * KIB, Some(ProcessId(100))),
            (2 * MIB, None),
            (256 * KIB, Some(ProcessId(101))),
            (MIB, None),
        ];
        let mut regions = Vec::new();
        let mut start = space.usable_start();
        for (size, owner) in sizes {
            regions.push(Region { start, size, owner });
            start += size;
        }
        let rest = space.usable_size() - (start - space.usable_start());
        regions.push(Region {
            start,
            size: rest,
            owner: Some(ProcessId(102)),
        });
        RegionList::from_regions(regions)
    }

    #[test]
    fn test_fit_selection() {
        let space = MemorySpace::default();
        let regions = fragmented(&space);
        let request = 600 * KIB;

        assert_eq!(FitAlgorithm::First.select(regions.as_slice(), request), Some(2));
        assert_eq!(FitAlgorithm::Best.select(regions.as_slice(), request), Some(4));
        assert_eq!(FitAlgorithm::Worst.select(regions.as_slice(), request), Some(2));
        assert_eq!(FitAlgorithm::Best.select(regions.as_slice(), 3 * MIB), None);
    }

    #[test]
    fn test_ties_go_to_lowest_address() {
        let regions = [
            Region::free(0, MIB),
            Region {
                start: MIB,
                size: MIB,
                owner: Some(ProcessId(1)),
            },
            Region::free(2 * MIB, MIB),
        ];

        assert_eq!(FitAlgorithm::Best.select(&regions, KIB), Some(0));
        assert_eq!(FitAlgorithm::Worst.select(&regions, KIB), Some(0));
    }

    #[test]
    fn test_allocate_splits_exactly() {
        let space = MemorySpace::default();
        let mut allocator = DynamicAllocator::new(&space, DynamicOptions::default());
        let mut p1 = process(1, 3 * MIB);

        allocator.allocate(&mut p1).unwrap();

        let regions = allocator.regions();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions.get(0).unwrap().size, 3 * MIB);
        assert_eq!(regions.get(0).unwrap().owner, Some(ProcessId(1)));
        assert!(regions.get(1).unwrap().is_free());
        assert_eq!(p1.backing(), Some(Backing::Block(space.usable_start())));
        assert!(regions.verify(&space).is_ok());
    }

    #[test]
    fn test_exact_fit_does_not_split() {
        let space = MemorySpace::default();
        let mut allocator = DynamicAllocator::new(&space, DynamicOptions::default());
        let mut whole = process(1, space.usable_size());

        allocator.allocate(&mut whole).unwrap();

        assert_eq!(allocator.regions().len(), 1);
        assert_eq!(allocator.regions().free_bytes(), 0);
    }

    #[test]
    fn test_best_fit_allocation_lands_in_smallest_hole() {
        let space = MemorySpace::default();
        let mut allocator = DynamicAllocator::with_regions(
            fragmented(&space),
            options(FitAlgorithm::Best, true),
        );
        let mut p1 = process(1, 600 * KIB);

        allocator.allocate(&mut p1).unwrap();

        let expected_start = space.usable_start() + 512 * KIB + 256 * KIB + 2 * MIB + 256 * KIB;
        assert_eq!(p1.backing(), Some(Backing::Block(expected_start)));
        assert!(allocator.regions().verify(&space).is_ok());
    }

    #[test]
    fn test_coalesce_cascades() {
        let space = MemorySpace::default();
        let mut allocator = DynamicAllocator::new(&space, options(FitAlgorithm::First, false));
        let mut procs: Vec<Process> = (1..=4).map(|i| process(i, MIB)).collect();
        for p in procs.iter_mut() {
            allocator.allocate(p).unwrap();
        }
        for p in procs.iter_mut().take(3) {
            assert!(allocator.deallocate(p));
        }
        assert_eq!(allocator.regions().len(), 5);
        assert!(allocator.regions().has_adjacent_free());

        assert_eq!(allocator.coalesce(), 2);
        assert_eq!(allocator.regions().len(), 3);
        assert_eq!(allocator.regions().get(0).unwrap().size, 3 * MIB);
        assert!(!allocator.regions().has_adjacent_free());

        // Fixpoint
        assert_eq!(allocator.coalesce(), 0);
    }

    #[test]
    fn test_deallocate_coalesces_both_sides() {
        let space = MemorySpace::default();
        let mut allocator = DynamicAllocator::new(&space, DynamicOptions::default());
        let mut a = process(1, MIB);
        let mut b = process(2, MIB);
        let mut c = process(3, MIB);
        allocator.allocate(&mut a).unwrap();
        allocator.allocate(&mut b).unwrap();
        allocator.allocate(&mut c).unwrap();

        allocator.deallocate(&mut a);
        allocator.deallocate(&mut c);
        assert_eq!(allocator.regions().len(), 3);

        allocator.deallocate(&mut b);
        assert_eq!(allocator.regions(), &RegionList::single_free(&space));
    }

    #[test]
    fn test_failure_leaves_state_unchanged() {
        let space = MemorySpace::default();
        let mut allocator = DynamicAllocator::with_regions(
            fragmented(&space),
            options(FitAlgorithm::Worst, true),
        );
        let before = allocator.regions().clone();
        let mut big = process(1, 2 * MIB + 1);

        let result = allocator.allocate(&mut big);

        assert!(matches!(result, Err(SimError::AllocationFailure { .. })));
        assert!(!big.is_allocated());
        assert_eq!(allocator.regions(), &before);
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let space = MemorySpace::default();
        let mut allocator = DynamicAllocator::new(&space, options(FitAlgorithm::First, true));
        let before = allocator.regions().clone();
        let mut empty = process(1, 0);

        let result = allocator.allocate(&mut empty);

        assert!(matches!(result, Err(SimError::InvalidProcessSize { .. })));
        assert!(!empty.is_allocated());
        assert_eq!(allocator.regions(), &before);
        assert_eq!(allocator.regions().len(), 1);
    }

    #[test]
    fn test_parse_fit_names() {
        assert_eq!("best".parse::<FitAlgorithm>().unwrap(), FitAlgorithm::Best);
        assert_eq!("Worst-Fit".parse::<FitAlgorithm>().unwrap(), FitAlgorithm::Worst);
        assert!("next".parse::<FitAlgorithm>().is_err());
    }
}
