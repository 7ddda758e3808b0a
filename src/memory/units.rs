//! Size input parsing
//!
//! Converts user-entered magnitude and unit pairs (`512`, `64 KB`, `1.5MiB`)
//! into byte counts. Units are binary multiples: `1 KB == 1024 B`.

use super::{GIB, KIB, MIB};
use crate::allocator::errors::SimError;
use std::fmt;
use std::str::FromStr;

/// A size unit offered by the input layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Bytes,
    Kilobytes,
    Megabytes,
    Gigabytes,
}

impl Unit {
    pub const ALL: [Unit; 4] = [Unit::Bytes, Unit::Kilobytes, Unit::Megabytes, Unit::Gigabytes];

    /// Number of bytes in one of this unit
    pub fn bytes(self) -> u64 {
        match self {
            Unit::Bytes => 1,
            Unit::Kilobytes => KIB,
            Unit::Megabytes => MIB,
            Unit::Gigabytes => GIB,
        }
    }

    /// Convert `magnitude` of this unit to whole bytes, rounding up
    pub fn to_bytes(self, magnitude: f64) -> Result<u64, SimError> {
        let invalid = || SimError::InvalidProcessSize {
            input: format!("{} {}", magnitude, self),
        };
        if !magnitude.is_finite() || magnitude <= 0.0 {
            return Err(invalid());
        }
        let bytes = (magnitude * self.bytes() as f64).ceil();
        if bytes >= u64::MAX as f64 {
            return Err(invalid());
        }
        Ok(bytes as u64)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Unit::Bytes => "B",
            Unit::Kilobytes => "KB",
            Unit::Megabytes => "MB",
            Unit::Gigabytes => "GB",
        };
        f.write_str(s)
    }
}

impl FromStr for Unit {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "b" => Ok(Unit::Bytes),
            "k" | "kb" | "kib" => Ok(Unit::Kilobytes),
            "m" | "mb" | "mib" => Ok(Unit::Megabytes),
            "g" | "gb" | "gib" => Ok(Unit::Gigabytes),
            _ => Err(SimError::InvalidProcessSize {
                input: s.to_string(),
            }),
        }
    }
}

/// Parse `<number>[<unit>]` into a positive byte count
pub fn parse_size(text: &str) -> Result<u64, SimError> {
    let invalid = || SimError::InvalidProcessSize {
        input: text.to_string(),
    };

    let trimmed = text.trim();
    let split_at = trimmed
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split_at);

    let magnitude: f64 = number.trim().parse().map_err(|_| invalid())?;
    let unit: Unit = unit.trim().parse().map_err(|_| invalid())?;
    unit.to_bytes(magnitude).map_err(|_| invalid())
}
