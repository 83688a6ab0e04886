use std::path::Path;

use crate::{
    disk::{open_disk, BlockDevice},
    error::Result,
};

pub mod allocate;
pub mod config;
pub mod ebr;
pub mod placement;
pub mod table;

pub use allocate::{allocate_on, allocate_partition, AllocatedPartition, PartitionSpec};
pub use ebr::Ebr;
pub use placement::{ContiguousPlacement, Placement};
pub use table::{PartitionEntry, PartitionKind, PartitionTable};

/// 分区表加上扩展分区里的逻辑分区，供报表等只读使用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskLayout {
    pub table: PartitionTable,
    /// 按链表顺序排列的逻辑分区，没有扩展分区时为空
    pub logical: Vec<Ebr>,
}

impl DiskLayout {
    pub fn read_from<D: BlockDevice + ?Sized>(dev: &mut D) -> Result<Self> {
        let table = PartitionTable::read_from(dev)?;
        let logical = match table.extended() {
            Some((_, extended)) => ebr::logical_partitions(dev, extended.start)?,
            None => Vec::new(),
        };
        Ok(Self { table, logical })
    }
}

pub fn read_layout<P: AsRef<Path>>(path: P) -> Result<DiskLayout> {
    let mut disk = open_disk(path)?;
    DiskLayout::read_from(&mut disk)
}
