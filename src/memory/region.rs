//! Partition and block store
//!
//! A [`RegionList`] is the ordered sequence of memory regions that models the
//! physical layout of the usable space. In fixed mode the regions are
//! partitions whose count and sizes never change; in dynamic mode they are
//! blocks that are split on allocation and merged on coalescing.
//!
//! # Layout Invariant
//!
//! For every list produced by an allocator:
//! - regions are ordered by ascending start address
//! - `regions[i].start + regions[i].size == regions[i + 1].start`
//! - every region has a positive size
//! - the regions cover exactly the usable space of the [`MemorySpace`]
//!
//! [`RegionList::verify`] checks all of the above.

use super::process::ProcessId;
use super::{format_size, Address, MemorySpace};
use crate::allocator::errors::SimError;

/// A contiguous region of the usable space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub start: Address,
    pub size: u64,
    pub owner: Option<ProcessId>, // Present iff the region is occupied
}

impl Region {
    pub fn free(start: Address, size: u64) -> Self {
        Region {
            start,
            size,
            owner: None,
        }
    }

    pub fn is_free(&self) -> bool {
        self.owner.is_none()
    }

    pub fn is_occupied(&self) -> bool {
        self.owner.is_some()
    }

    /// One past the last address of the region
    pub fn end(&self) -> Address {
        self.start + self.size
    }
}

/// Address-ordered sequence of regions covering the usable space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionList {
    regions: Vec<Region>,
}

impl RegionList {
    /// A single free block spanning the whole usable space
    pub fn single_free(space: &MemorySpace) -> Self {
        RegionList {
            regions: vec![Region::free(space.usable_start(), space.usable_size())],
        }
    }

    /// Contiguous free partitions with the given sizes, starting at the usable start.
    ///
    /// Fails when the sizes do not add up to the usable space.
    pub fn partitioned(space: &MemorySpace, sizes: &[u64]) -> Result<Self, SimError> {
        let mut regions = Vec::with_capacity(sizes.len());
        let mut start = space.usable_start();
        for &size in sizes {
            regions.push(Region::free(start, size));
            start += size;
        }
        let list = RegionList { regions };
        list.verify(space)?;
        Ok(list)
    }

    /// Build a list from raw regions without validation
    #[cfg(test)]
    pub(crate) fn from_regions(regions: Vec<Region>) -> Self {
        RegionList { regions }
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Region> {
        self.regions.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Region> {
        self.regions.iter()
    }

    pub fn as_slice(&self) -> &[Region] {
        &self.regions
    }

    /// Index of the region owned by `id`, if any
    pub fn position_owned_by(&self, id: ProcessId) -> Option<usize> {
        self.regions.iter().position(|r| r.owner == Some(id))
    }

    /// Mark a region as occupied by `id`
    pub(crate) fn occupy(&mut self, index: usize, id: ProcessId) {
        if let Some(region) = self.regions.get_mut(index) {
            region.owner = Some(id);
        }
    }

    /// Mark a region as free
    pub(crate) fn release(&mut self, index: usize) {
        if let Some(region) = self.regions.get_mut(index) {
            region.owner = None;
        }
    }

    /// Shrink the region at `index` to `size` bytes and insert a free region
    /// covering the remainder directly after it. Total extent is preserved.
    ///
    /// Returns `false` when `size` does not leave a remainder (nothing inserted).
    pub(crate) fn split(&mut self, index: usize, size: u64) -> bool {
        let Some(region) = self.regions.get_mut(index) else {
            return false;
        };
        if size == 0 || size >= region.size {
            return false;
        }
        let remainder = Region::free(region.start + size, region.size - size);
        region.size = size;
        self.regions.insert(index + 1, remainder);
        true
    }

    /// Absorb the region after `index` into it. The merged region keeps the
    /// left region's start and owner.
    pub(crate) fn merge_with_next(&mut self, index: usize) -> bool {
        if index + 1 >= self.regions.len() {
            return false;
        }
        let right = self.regions.remove(index + 1);
        self.regions[index].size += right.size;
        true
    }

    /// Total free bytes
    pub fn free_bytes(&self) -> u64 {
        self.regions
            .iter()
            .filter(|r| r.is_free())
            .map(|r| r.size)
            .sum()
    }

    /// Size of the largest free region, 0 if none
    pub fn largest_free(&self) -> u64 {
        self.regions
            .iter()
            .filter(|r| r.is_free())
            .map(|r| r.size)
            .max()
            .unwrap_or(0)
    }

    /// Number of free regions
    pub fn free_count(&self) -> usize {
        self.regions.iter().filter(|r| r.is_free()).count()
    }

    /// True when some pair of neighbouring regions are both free
    pub fn has_adjacent_free(&self) -> bool {
        self.regions
            .windows(2)
            .any(|pair| pair[0].is_free() && pair[1].is_free())
    }

    /// Check the layout invariant against `space`
    pub fn verify(&self, space: &MemorySpace) -> Result<(), SimError> {
        let violation =
            |message: String| -> Result<(), SimError> { Err(SimError::LayoutViolation { message }) };

        let Some(first) = self.regions.first() else {
            return violation("region list is empty".to_string());
        };
        if first.start != space.usable_start() {
            return violation(format!(
                "first region starts at 0x{:08x}, expected 0x{:08x}",
                first.start,
                space.usable_start()
            ));
        }

        let mut expected_start = space.usable_start();
        for (i, region) in self.regions.iter().enumerate() {
            if region.size == 0 {
                return violation(format!("region {} has zero size", i));
            }
            if region.start != expected_start {
                return violation(format!(
                    "region {} starts at 0x{:08x}, expected 0x{:08x}",
                    i, region.start, expected_start
                ));
            }
            expected_start = region.end();
        }

        let covered = expected_start - space.usable_start();
        if covered != space.usable_size() {
            return violation(format!(
                "regions cover {}, usable space is {}",
                format_size(covered),
                format_size(space.usable_size())
            ));
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a RegionList {
    type Item = &'a Region;
    type IntoIter = std::slice::Iter<'a, Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}
