use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    disk::{
        codec::{read_record, write_record, Record},
        BlockDevice, FitPolicy,
    },
    error::{DiskError, Result},
    partition::config::{
        DATE_LEN, ID_LEN, MBR_SIZE, NAME_LEN, SLOT_COUNT, STATUS_MOUNTED, STATUS_UNMOUNTED,
    },
    utils::{decode_fixed, encode_fixed},
};

/// 分区类型：主分区 / 扩展分区 / 逻辑分区
///
/// 逻辑分区只存在于 EBR 链中，分区表的槽位里只会出现前两种。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionKind {
    Primary,
    Extended,
    Logical,
}

impl PartitionKind {
    pub fn as_byte(self) -> u8 {
        match self {
            PartitionKind::Primary => b'p',
            PartitionKind::Extended => b'e',
            PartitionKind::Logical => b'l',
        }
    }
}

impl FromStr for PartitionKind {
    type Err = DiskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "p" => Ok(PartitionKind::Primary),
            "e" => Ok(PartitionKind::Extended),
            "l" => Ok(PartitionKind::Logical),
            other => Err(DiskError::Validation(format!(
                "type must be 'p', 'e' or 'l', got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for PartitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_byte() as char)
    }
}

/// 磁盘上的分区项，35 字节
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
struct RawEntry {
    status: u8,
    kind: u8, // 0 表示空槽位
    fit: u8,
    start: i32,
    size: i32,
    name: [u8; NAME_LEN],
    correlative: i32,
    id: [u8; ID_LEN],
}

/// 磁盘上的 MBR，位于偏移 0
#[derive(Debug, Serialize, Deserialize)]
struct RawMbr {
    capacity: i32,
    created: [u8; DATE_LEN],
    signature: i32,
    fit: u8,
    entries: [RawEntry; SLOT_COUNT],
}

impl Record for RawMbr {
    const SIZE: u64 = MBR_SIZE;
}

/// 分区表中已占用的主分区或扩展分区槽位
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionEntry {
    pub mounted: bool,
    pub kind: PartitionKind,
    pub fit: FitPolicy,
    /// 在镜像中的字节偏移
    pub start: u64,
    pub size: u64,
    pub name: String,
    /// 创建顺序，从 1 开始
    pub correlative: u32,
    /// 挂载 ID，未挂载时为 `None`
    pub id: Option<String>,
}

impl PartitionEntry {
    /// 分区结束位置（不含）
    pub fn end(&self) -> u64 {
        self.start + self.size
    }

    fn from_raw(raw: &RawEntry) -> Result<Option<Self>> {
        let kind = match raw.kind {
            0 => return Ok(None),
            b'p' => PartitionKind::Primary,
            b'e' => PartitionKind::Extended,
            other => {
                return Err(DiskError::Corrupted(format!(
                    "unknown partition type byte {other:#04x}"
                )))
            }
        };
        let fit = FitPolicy::from_byte(raw.fit).ok_or_else(|| {
            DiskError::Corrupted(format!("unknown partition fit byte {:#04x}", raw.fit))
        })?;
        let id = decode_fixed(&raw.id);

        Ok(Some(Self {
            mounted: raw.status == STATUS_MOUNTED,
            kind,
            fit,
            start: to_offset(raw.start, "partition start")?,
            size: to_offset(raw.size, "partition size")?,
            name: decode_fixed(&raw.name),
            correlative: to_offset(raw.correlative, "correlative")? as u32,
            id: (!id.is_empty()).then_some(id),
        }))
    }

    fn to_raw(&self) -> Result<RawEntry> {
        Ok(RawEntry {
            status: if self.mounted {
                STATUS_MOUNTED
            } else {
                STATUS_UNMOUNTED
            },
            kind: self.kind.as_byte(),
            fit: self.fit.as_byte(),
            start: to_field(self.start, "partition start")?,
            size: to_field(self.size, "partition size")?,
            name: encode_fixed(&self.name),
            correlative: to_field(self.correlative as u64, "correlative")?,
            id: encode_fixed(self.id.as_deref().unwrap_or_default()),
        })
    }
}

/// 镜像偏移 0 处 MBR 记录的内存表示
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionTable {
    pub capacity: u64,
    /// 创建日期，YYYY-MM-DD
    pub created: String,
    pub signature: u32,
    pub fit: FitPolicy,
    slots: [Option<PartitionEntry>; SLOT_COUNT],
}

impl PartitionTable {
    pub fn new(capacity: u64, fit: FitPolicy, created: String, signature: u32) -> Self {
        Self {
            capacity,
            created,
            signature,
            fit,
            slots: Default::default(),
        }
    }

    pub fn read_from<D: BlockDevice + ?Sized>(dev: &mut D) -> Result<Self> {
        let raw: RawMbr = read_record(dev, 0)?;
        Self::from_raw(&raw)
    }

    pub fn write_into<D: BlockDevice + ?Sized>(&self, dev: &mut D) -> Result<()> {
        write_record(dev, &self.to_raw()?, 0)
    }

    pub fn slots(&self) -> &[Option<PartitionEntry>; SLOT_COUNT] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&PartitionEntry> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut PartitionEntry> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    /// 已占用的槽位，按槽位顺序
    pub fn entries(&self) -> impl Iterator<Item = (usize, &PartitionEntry)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|entry| (i, entry)))
    }

    pub fn entries_mut(&mut self) -> impl Iterator<Item = (usize, &mut PartitionEntry)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|entry| (i, entry)))
    }

    pub fn populated_count(&self) -> usize {
        self.entries().count()
    }

    pub fn used_space(&self) -> u64 {
        self.entries().map(|(_, entry)| entry.size).sum()
    }

    pub fn extended(&self) -> Option<(usize, &PartitionEntry)> {
        self.entries()
            .find(|(_, entry)| entry.kind == PartitionKind::Extended)
    }

    /// 按名称查找（名称两端空白不参与比较，区分大小写）
    pub fn find_by_name(&self, name: &str) -> Option<(usize, &PartitionEntry)> {
        let name = name.trim();
        self.entries().find(|(_, entry)| entry.name == name)
    }

    pub fn first_free_slot(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// 下标最大的已占用槽位
    pub fn last_populated(&self) -> Option<(usize, &PartitionEntry)> {
        self.entries().last()
    }

    pub(crate) fn set_slot(&mut self, index: usize, entry: PartitionEntry) {
        self.slots[index] = Some(entry);
    }

    fn from_raw(raw: &RawMbr) -> Result<Self> {
        let fit = FitPolicy::from_byte(raw.fit).ok_or_else(|| {
            DiskError::Corrupted(format!("unknown disk fit byte {:#04x}", raw.fit))
        })?;

        let mut slots: [Option<PartitionEntry>; SLOT_COUNT] = Default::default();
        for (slot, entry) in slots.iter_mut().zip(raw.entries.iter()) {
            *slot = PartitionEntry::from_raw(entry)?;
        }

        Ok(Self {
            capacity: to_offset(raw.capacity, "disk capacity")?,
            created: decode_fixed(&raw.created),
            signature: raw.signature as u32,
            fit,
            slots,
        })
    }

    fn to_raw(&self) -> Result<RawMbr> {
        let mut entries = [RawEntry::default(); SLOT_COUNT];
        for (raw, slot) in entries.iter_mut().zip(self.slots.iter()) {
            if let Some(entry) = slot {
                *raw = entry.to_raw()?;
            }
        }

        Ok(RawMbr {
            capacity: to_field(self.capacity, "disk capacity")?,
            created: encode_fixed(&self.created),
            signature: self.signature as i32,
            fit: self.fit.as_byte(),
            entries,
        })
    }
}

/// 校验分区名：去掉首尾空白后 1..=16 字节
pub(crate) fn validate_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DiskError::Validation("name is required".to_string()));
    }
    if name.len() > NAME_LEN || name.contains('\0') {
        return Err(DiskError::Validation(format!(
            "name '{name}' must be at most {NAME_LEN} bytes without NUL"
        )));
    }
    Ok(name)
}

pub(crate) fn to_offset(value: i32, what: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| DiskError::Corrupted(format!("negative {what}: {value}")))
}

pub(crate) fn to_field(value: u64, what: &str) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| DiskError::Validation(format!("{what} {value} does not fit on disk")))
}
