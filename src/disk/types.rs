use std::{fmt, str::FromStr};

use crate::error::{DiskError, Result};

/// 1KB
pub const KILOBYTE: u64 = 1024;

/// 1MB
pub const MEGABYTE: u64 = 1024 * KILOBYTE;

/// 分区表里的偏移和大小都是 i32，磁盘与分区不能超过这个值
pub const MAX_IMAGE_BYTES: u64 = i32::MAX as u64;

/// 大小单位：b / k / m
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Byte,
    Kilobyte,
    Megabyte,
}

impl Unit {
    pub fn multiplier(self) -> u64 {
        match self {
            Unit::Byte => 1,
            Unit::Kilobyte => KILOBYTE,
            Unit::Megabyte => MEGABYTE,
        }
    }

    /// 换算成字节，并检查结果能放进磁盘上的 i32 字段
    pub fn to_bytes(self, amount: u64) -> Result<u64> {
        if amount == 0 {
            return Err(DiskError::Validation(
                "size must be greater than 0".to_string(),
            ));
        }
        match amount.checked_mul(self.multiplier()) {
            Some(bytes) if bytes <= MAX_IMAGE_BYTES => Ok(bytes),
            _ => Err(DiskError::Validation(format!(
                "size {}{} exceeds the {} byte limit",
                amount, self, MAX_IMAGE_BYTES
            ))),
        }
    }
}

impl FromStr for Unit {
    type Err = DiskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "b" => Ok(Unit::Byte),
            "k" => Ok(Unit::Kilobyte),
            "m" => Ok(Unit::Megabyte),
            other => Err(DiskError::Validation(format!(
                "unit must be 'b', 'k' or 'm', got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Unit::Byte => "b",
            Unit::Kilobyte => "k",
            Unit::Megabyte => "m",
        };
        f.write_str(tag)
    }
}

/// 分配策略（best / first / worst fit）
///
/// 目前只记录在分区表里，放置位置不受它影响，见 `partition::placement`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitPolicy {
    Best,
    First,
    #[default]
    Worst,
}

impl FitPolicy {
    /// 磁盘上保存的单字节标记
    pub fn as_byte(self) -> u8 {
        match self {
            FitPolicy::Best => b'b',
            FitPolicy::First => b'f',
            FitPolicy::Worst => b'w',
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'b' => Some(FitPolicy::Best),
            b'f' => Some(FitPolicy::First),
            b'w' => Some(FitPolicy::Worst),
            _ => None,
        }
    }
}

impl FromStr for FitPolicy {
    type Err = DiskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bf" => Ok(FitPolicy::Best),
            "ff" => Ok(FitPolicy::First),
            "wf" => Ok(FitPolicy::Worst),
            other => Err(DiskError::Validation(format!(
                "fit must be 'bf', 'ff' or 'wf', got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for FitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            FitPolicy::Best => "bf",
            FitPolicy::First => "ff",
            FitPolicy::Worst => "wf",
        };
        f.write_str(tag)
    }
}
