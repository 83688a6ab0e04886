//! 扩展引导记录（EBR）。
//!
//! 逻辑分区是扩展分区内部的一条 EBR 单链表。每个节点用它在镜像中的字节偏移定位，
//! 保存下一个节点的偏移，尾节点为 `EBR_NONE`。找尾节点要遍历整条链。

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    disk::{
        codec::{read_record, write_record, Record},
        BlockDevice, FitPolicy,
    },
    error::{DiskError, Result},
    partition::{
        config::{EBR_NONE, EBR_SIZE, NAME_LEN},
        table::{to_field, to_offset},
    },
    utils::{decode_fixed, encode_fixed},
};

/// 磁盘上的 EBR，29 字节
#[derive(Debug, Serialize, Deserialize)]
struct RawEbr {
    fit: u8,
    start: i32,
    size: i32,
    next: i32,
    name: [u8; NAME_LEN],
}

impl Record for RawEbr {
    const SIZE: u64 = EBR_SIZE;
}

/// EBR 链上的一个节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ebr {
    /// 记录本身所在的偏移
    pub offset: u64,
    pub fit: FitPolicy,
    /// 逻辑分区数据的起始位置，紧跟在记录之后
    pub start: u64,
    pub size: u64,
    pub next: Option<u64>,
    pub name: String,
}

impl Ebr {
    /// 扩展分区刚创建时写在其起始处的空节点
    pub fn empty_head(offset: u64, fit: FitPolicy) -> Self {
        Self {
            offset,
            fit,
            start: offset,
            size: 0,
            next: None,
            name: String::new(),
        }
    }

    /// 空链表的头节点，不代表任何逻辑分区
    pub fn is_empty_head(&self) -> bool {
        self.size == 0 && self.name.is_empty()
    }

    /// 逻辑分区数据区的结束位置，下一个 EBR 从这里开始
    pub fn data_end(&self) -> u64 {
        self.start + self.size
    }

    pub fn read_at<D: BlockDevice + ?Sized>(dev: &mut D, offset: u64) -> Result<Self> {
        let raw: RawEbr = read_record(dev, offset)?;
        let fit = FitPolicy::from_byte(raw.fit).ok_or_else(|| {
            DiskError::Corrupted(format!("unknown EBR fit byte {:#04x} at {offset}", raw.fit))
        })?;
        let next = match raw.next {
            EBR_NONE => None,
            next => Some(to_offset(next, "EBR next")?),
        };

        Ok(Self {
            offset,
            fit,
            start: to_offset(raw.start, "EBR start")?,
            size: to_offset(raw.size, "EBR size")?,
            next,
            name: decode_fixed(&raw.name),
        })
    }

    pub fn write<D: BlockDevice + ?Sized>(&self, dev: &mut D) -> Result<()> {
        let raw = RawEbr {
            fit: self.fit.as_byte(),
            start: to_field(self.start, "EBR start")?,
            size: to_field(self.size, "EBR size")?,
            next: match self.next {
                Some(next) => to_field(next, "EBR next")?,
                None => EBR_NONE,
            },
            name: encode_fixed(&self.name),
        };
        write_record(dev, &raw, self.offset)
    }
}

/// 从 `head` 开始沿 next 指针读出整条链（包含空头节点）
pub fn read_chain<D: BlockDevice + ?Sized>(dev: &mut D, head: u64) -> Result<Vec<Ebr>> {
    let capacity = dev.capacity()?;
    let mut visited = HashSet::new();
    let mut chain = Vec::new();
    let mut cursor = Some(head);

    while let Some(offset) = cursor {
        if offset + EBR_SIZE > capacity {
            return Err(DiskError::Corrupted(format!(
                "EBR at {offset} lies outside the disk"
            )));
        }
        if !visited.insert(offset) {
            return Err(DiskError::Corrupted(format!("EBR chain loops at {offset}")));
        }
        let ebr = Ebr::read_at(dev, offset)?;
        cursor = ebr.next;
        chain.push(ebr);
    }

    Ok(chain)
}

/// 扩展分区中的逻辑分区，按创建顺序
pub fn logical_partitions<D: BlockDevice + ?Sized>(dev: &mut D, head: u64) -> Result<Vec<Ebr>> {
    let mut chain = read_chain(dev, head)?;
    chain.retain(|ebr| !ebr.is_empty_head());
    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::MemoryDisk;

    fn node(offset: u64, size: u64, next: Option<u64>, name: &str) -> Ebr {
        Ebr {
            offset,
            fit: FitPolicy::First,
            start: offset + EBR_SIZE,
            size,
            next,
            name: name.to_string(),
        }
    }

    #[test]
    fn record_size_matches_layout() {
        let raw = RawEbr {
            fit: b'w',
            start: 0,
            size: 0,
            next: EBR_NONE,
            name: [0; NAME_LEN],
        };
        assert_eq!(bincode::serialize(&raw).unwrap().len() as u64, EBR_SIZE);
    }

    #[test]
    fn sentinel_is_minus_one_on_disk() {
        let mut disk = MemoryDisk::new(256);
        Ebr::empty_head(100, FitPolicy::Worst).write(&mut disk).unwrap();
        assert_eq!(&disk.as_bytes()[109..113], &(-1i32).to_le_bytes());

        let head = Ebr::read_at(&mut disk, 100).unwrap();
        assert!(head.is_empty_head());
        assert_eq!(head.next, None);
        assert_eq!(head.start, 100);
    }

    #[test]
    fn walks_chain_in_order() {
        let mut disk = MemoryDisk::new(1024);
        node(100, 50, Some(179), "l1").write(&mut disk).unwrap();
        node(179, 20, Some(228), "l2").write(&mut disk).unwrap();
        node(228, 10, None, "l3").write(&mut disk).unwrap();

        let chain = read_chain(&mut disk, 100).unwrap();
        let names: Vec<_> = chain.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["l1", "l2", "l3"]);
        assert_eq!(chain[0].data_end(), 179);
    }

    #[test]
    fn empty_head_is_not_a_logical_partition() {
        let mut disk = MemoryDisk::new(256);
        Ebr::empty_head(40, FitPolicy::First).write(&mut disk).unwrap();

        assert_eq!(read_chain(&mut disk, 40).unwrap().len(), 1);
        assert!(logical_partitions(&mut disk, 40).unwrap().is_empty());
    }

    #[test]
    fn loops_are_detected() {
        let mut disk = MemoryDisk::new(512);
        node(10, 5, Some(60), "a").write(&mut disk).unwrap();
        node(60, 5, Some(10), "b").write(&mut disk).unwrap();

        assert!(matches!(
            read_chain(&mut disk, 10),
            Err(DiskError::Corrupted(_))
        ));
    }

    #[test]
    fn pointers_outside_the_disk_are_detected() {
        let mut disk = MemoryDisk::new(128);
        node(10, 5, Some(120), "a").write(&mut disk).unwrap();

        assert!(matches!(
            read_chain(&mut disk, 10),
            Err(DiskError::Corrupted(_))
        ));
    }
}
