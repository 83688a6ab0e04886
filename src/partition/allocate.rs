use std::path::Path;

use log::{debug, info};

use crate::{
    disk::{open_disk, BlockDevice, FitPolicy, Unit},
    error::{DiskError, Result},
    partition::{
        config::{EBR_SIZE, SLOT_COUNT},
        ebr::{self, Ebr},
        placement::{ContiguousPlacement, Placement},
        table::{validate_name, PartitionEntry, PartitionKind, PartitionTable},
    },
};

/// 创建分区的参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionSpec {
    pub size: u64,
    pub unit: Unit,
    pub name: String,
    pub kind: PartitionKind,
    pub fit: FitPolicy,
}

impl PartitionSpec {
    /// 默认：单位 k，主分区，worst fit
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            size,
            unit: Unit::Kilobyte,
            name: name.into(),
            kind: PartitionKind::Primary,
            fit: FitPolicy::Worst,
        }
    }

    pub fn unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    pub fn kind(mut self, kind: PartitionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn fit(mut self, fit: FitPolicy) -> Self {
        self.fit = fit;
        self
    }
}

/// 新分区的位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocatedPartition {
    pub kind: PartitionKind,
    pub name: String,
    /// 数据起始字节
    pub start: u64,
    pub size: u64,
    /// 主分区/扩展分区所在的槽位
    pub slot: Option<usize>,
    /// 逻辑分区对应 EBR 的偏移
    pub ebr_offset: Option<u64>,
}

/// 在 `path` 指向的磁盘上创建分区
pub fn allocate_partition<P: AsRef<Path>>(
    path: P,
    spec: &PartitionSpec,
) -> Result<AllocatedPartition> {
    let size = spec.unit.to_bytes(spec.size)?;
    validate_name(&spec.name)?;

    let path = path.as_ref();
    let mut disk = open_disk(path)?;
    let allocated = allocate_on(&mut disk, spec, &ContiguousPlacement)?;
    info!(
        "allocated {} partition '{}' on {} at {} ({} bytes)",
        allocated.kind,
        allocated.name,
        path.display(),
        allocated.start,
        size
    );
    Ok(allocated)
}

/// 在任意设备上创建分区。
///
/// 校验失败时设备不被修改。逻辑分区会先改写尾节点的 next 再写新节点，
/// 两次写入之间出错会留下指向未写入节点的指针。
pub fn allocate_on<D, P>(
    dev: &mut D,
    spec: &PartitionSpec,
    placement: &P,
) -> Result<AllocatedPartition>
where
    D: BlockDevice + ?Sized,
    P: Placement + ?Sized,
{
    let size = spec.unit.to_bytes(spec.size)?;
    let name = validate_name(&spec.name)?;

    let mut table = PartitionTable::read_from(dev)?;
    let extended_start = table.extended().map(|(_, entry)| entry.start);

    let logical = match extended_start {
        Some(head) => ebr::logical_partitions(dev, head)?,
        None => Vec::new(),
    };
    if table.find_by_name(name).is_some() || logical.iter().any(|ebr| ebr.name == name) {
        return Err(DiskError::DuplicateName(name.to_string()));
    }

    if table.populated_count() >= SLOT_COUNT {
        return Err(DiskError::CapacityExceeded);
    }
    match spec.kind {
        PartitionKind::Extended if extended_start.is_some() => {
            return Err(DiskError::DuplicateExtended)
        }
        PartitionKind::Logical if extended_start.is_none() => {
            return Err(DiskError::NoExtendedPartition)
        }
        _ => {}
    }

    let used = table.used_space();
    if used + size > table.capacity {
        return Err(DiskError::InsufficientSpace {
            requested: size,
            available: table.capacity.saturating_sub(used),
        });
    }

    let allocated = match spec.kind {
        PartitionKind::Primary | PartitionKind::Extended => {
            place_entry(dev, &mut table, spec, name, size, placement)?
        }
        PartitionKind::Logical => append_logical(dev, &table, spec, name, size)?,
    };

    table.write_into(dev)?;
    debug!("partition table after allocation: {table:#?}");
    Ok(allocated)
}

fn place_entry<D, P>(
    dev: &mut D,
    table: &mut PartitionTable,
    spec: &PartitionSpec,
    name: &str,
    size: u64,
    placement: &P,
) -> Result<AllocatedPartition>
where
    D: BlockDevice + ?Sized,
    P: Placement + ?Sized,
{
    let slot = table.first_free_slot().ok_or(DiskError::CapacityExceeded)?;
    let start = placement.place(table, size, spec.fit);

    // 扩展分区的链头 EBR 必须能写进镜像
    if spec.kind == PartitionKind::Extended {
        let end = dev.capacity()?;
        if start + EBR_SIZE > end {
            return Err(DiskError::InsufficientSpace {
                requested: size,
                available: end.saturating_sub(start),
            });
        }
    }
    let entry = PartitionEntry {
        mounted: false,
        kind: spec.kind,
        fit: spec.fit,
        start,
        size,
        name: name.to_string(),
        correlative: table.populated_count() as u32 + 1,
        id: None,
    };
    table.set_slot(slot, entry);

    // 扩展分区：在起始处写入空的 EBR 链头
    if spec.kind == PartitionKind::Extended {
        Ebr::empty_head(start, spec.fit).write(dev)?;
    }

    Ok(AllocatedPartition {
        kind: spec.kind,
        name: name.to_string(),
        start,
        size,
        slot: Some(slot),
        ebr_offset: None,
    })
}

fn append_logical<D>(
    dev: &mut D,
    table: &PartitionTable,
    spec: &PartitionSpec,
    name: &str,
    size: u64,
) -> Result<AllocatedPartition>
where
    D: BlockDevice + ?Sized,
{
    let (_, extended) = table.extended().ok_or(DiskError::NoExtendedPartition)?;

    let chain = ebr::read_chain(dev, extended.start)?;
    let mut tail = chain
        .last()
        .cloned()
        .ok_or_else(|| DiskError::Corrupted("extended partition has no EBR".to_string()))?;

    // 新 EBR 紧跟尾节点的数据区，逻辑分区数据紧跟新 EBR；
    // 扩展分区在表里可能越过镜像末尾，上界取两者较小者
    let origin = tail.data_end();
    let data_start = origin + EBR_SIZE;
    let limit = extended.end().min(dev.capacity()?);
    if data_start + size > limit {
        return Err(DiskError::InsufficientSpace {
            requested: size,
            available: limit.saturating_sub(data_start),
        });
    }

    // 空链表时 origin 就是链头自身，直接覆盖链头
    if origin != tail.offset {
        tail.next = Some(origin);
        tail.write(dev)?;
    }

    let node = Ebr {
        offset: origin,
        fit: spec.fit,
        start: data_start,
        size,
        next: None,
        name: name.to_string(),
    };
    node.write(dev)?;
    debug!("new EBR: {node:?}");

    Ok(AllocatedPartition {
        kind: PartitionKind::Logical,
        name: name.to_string(),
        start: data_start,
        size,
        slot: None,
        ebr_offset: Some(origin),
    })
}
