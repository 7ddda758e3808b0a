//! Memory model for the partitioning simulator
//!
//! This module provides the data the allocators operate on:
//! - [`region`]: Partitions and blocks, and the ordered [`region::RegionList`] store
//! - [`process`]: Simulated processes and the creation-ordered registry
//! - [`units`]: Parsing of user-entered sizes such as `1.5MB`
//!
//! # Memory Layout
//!
//! The simulated space has a fixed total size. An optional reserved prefix
//! models the operating system's own footprint; it is never handed out and
//! is not part of any allocator's region list:
//! ```text
//! 0x0000_0000                 reserved               total
//! |---- OS reserved ----------|------ usable space ------|
//! ```
//!
//! All sizes and addresses are byte counts.

pub mod process;
pub mod region;
pub mod units;

use crate::allocator::errors::SimError;

/// Memory address type (byte offset into the simulated space)
pub type Address = u64;

pub const KIB: u64 = 1024;
pub const MIB: u64 = 1024 * KIB;
pub const GIB: u64 = 1024 * MIB;

/// Total size of the simulated memory
pub const TOTAL_MEMORY: u64 = 20 * MIB;

/// Size of the prefix reserved for the operating system
pub const OS_RESERVED: u64 = 4 * MIB;

/// Partition sizes used by the fixed-partition strategy, in address order
pub const FIXED_PARTITION_SIZES: [u64; 5] = [MIB, 2 * MIB, 4 * MIB, 8 * MIB, MIB];

/// The simulated address space: a total size with a reserved prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemorySpace {
    total: u64,
    reserved: u64,
}

impl MemorySpace {
    /// Create a memory space. The reserved prefix must leave some usable space.
    pub fn new(total: u64, reserved: u64) -> Result<Self, SimError> {
        if reserved >= total {
            return Err(SimError::LayoutViolation {
                message: format!(
                    "reserved prefix of {} leaves no usable space in {}",
                    format_size(reserved),
                    format_size(total)
                ),
            });
        }
        Ok(MemorySpace { total, reserved })
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn reserved(&self) -> u64 {
        self.reserved
    }

    /// First address handed out to allocators
    pub fn usable_start(&self) -> Address {
        self.reserved
    }

    /// Number of bytes available to allocators
    pub fn usable_size(&self) -> u64 {
        self.total - self.reserved
    }
}

impl Default for MemorySpace {
    fn default() -> Self {
        MemorySpace {
            total: TOTAL_MEMORY,
            reserved: OS_RESERVED,
        }
    }
}

/// Format a byte count using the largest binary unit that divides it cleanly,
/// falling back to one decimal place.
pub fn format_size(bytes: u64) -> String {
    let units = [(GIB, "GiB"), (MIB, "MiB"), (KIB, "KiB")];
    for (scale, name) in units {
        if bytes >= scale {
            if bytes % scale == 0 {
                return format!("{} {}", bytes / scale, name);
            }
            return format!("{:.1} {}", bytes as f64 / scale as f64, name);
        }
    }
    format!("{} B", bytes)
}
