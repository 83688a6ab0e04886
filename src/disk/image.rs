use std::{fs, path::Path};

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};

use crate::{
    config::Config,
    disk::{open_disk, BlockDevice, FileDisk, FitPolicy, Unit},
    error::{DiskError, Result},
    partition::PartitionTable,
    utils::{current_date, random_signature},
};

/// 创建磁盘的参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskSpec {
    pub capacity: u64,
    pub unit: Unit,
    pub fit: FitPolicy,
}

impl DiskSpec {
    /// 默认：单位 m，first fit
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            unit: Unit::Megabyte,
            fit: FitPolicy::First,
        }
    }

    pub fn unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    pub fn fit(mut self, fit: FitPolicy) -> Self {
        self.fit = fit;
        self
    }

    /// 磁盘只接受 k / m
    pub fn size_in_bytes(&self) -> Result<u64> {
        if self.unit == Unit::Byte {
            return Err(DiskError::Validation(
                "disk unit must be 'k' or 'm'".to_string(),
            ));
        }
        self.unit.to_bytes(self.capacity)
    }
}

/// 创建虚拟磁盘：建目录、写满 0、最后写入 MBR。
///
/// 返回从磁盘上读回的分区表。
pub fn create_disk<P: AsRef<Path>>(
    path: P,
    spec: &DiskSpec,
    config: &Config,
) -> Result<PartitionTable> {
    let capacity = spec.size_in_bytes()?;
    let path = path.as_ref();

    let progress = zero_fill_progress(capacity, config.show_progress);
    progress.set_message(format!("{}", path.display()));
    let mut disk = FileDisk::create(path, capacity, config.zero_fill_chunk, &progress)?;
    progress.finish_and_clear();

    install_table(&mut disk, spec.fit)?;
    let table = PartitionTable::read_from(&mut disk)?;

    info!(
        "created disk {} ({} bytes, fit {}, signature {})",
        disk.path().display(),
        table.capacity,
        table.fit,
        table.signature
    );
    debug!("new partition table: {table:#?}");
    Ok(table)
}

/// 在设备偏移 0 处写入空分区表，容量取设备大小
pub fn install_table<D: BlockDevice + ?Sized>(
    dev: &mut D,
    fit: FitPolicy,
) -> Result<PartitionTable> {
    let table = PartitionTable::new(dev.capacity()?, fit, current_date(), random_signature());
    table.write_into(dev)?;
    Ok(table)
}

/// 删除磁盘文件。已挂载记录不受影响。
pub fn destroy_disk<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(DiskError::NotFound(path.to_path_buf()));
    }
    fs::remove_file(path)?;
    info!("removed disk {}", path.display());
    Ok(())
}

/// 只读：读取分区表
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<PartitionTable> {
    let mut disk = open_disk(path)?;
    PartitionTable::read_from(&mut disk)
}

fn zero_fill_progress(len: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::with_template("[{bar:40.green/black}] {bytes}/{total_bytes} {msg}")
    {
        bar.set_style(style.progress_chars("#>-"));
    }
    bar
}
