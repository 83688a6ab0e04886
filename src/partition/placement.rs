use crate::{
    disk::FitPolicy,
    partition::{config::MBR_SIZE, table::PartitionTable},
};

/// 决定新的主分区/扩展分区从哪里开始。
///
/// 所有容量、数量、名称校验都在调用方完成，这里只负责给出起始偏移。
pub trait Placement {
    fn place(&self, table: &PartitionTable, size: u64, fit: FitPolicy) -> u64;
}

/// 紧跟在下标最大的已占用分区之后；空表时紧跟 MBR。
///
/// 分配策略只被记录，不参与计算。
#[derive(Debug, Default, Clone, Copy)]
pub struct ContiguousPlacement;

impl Placement for ContiguousPlacement {
    fn place(&self, table: &PartitionTable, _size: u64, _fit: FitPolicy) -> u64 {
        table
            .last_populated()
            .map(|(_, entry)| entry.end())
            .unwrap_or(MBR_SIZE)
    }
}
