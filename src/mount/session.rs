use std::path::Path;

use log::{debug, info, warn};

use crate::{
    config::Config,
    disk::{open_disk, BlockDevice},
    error::{DiskError, Result},
    mount::{disk_identity, MountedDisk, MountedPartition},
    partition::{config::STATUS_MOUNTED, ebr, PartitionKind, PartitionTable},
};

/// [`MountSession::unmount_all`] 的结果
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UnmountSummary {
    /// 分区表已复位的磁盘
    pub cleaned: Vec<String>,
    /// 复位失败的磁盘
    pub failed: Vec<String>,
}

/// 当前进程的挂载记录。
///
/// 不落盘，由调用方持有并在每次挂载/卸载时传入。磁盘按第一次挂载的顺序排列，
/// 第 n 个磁盘得到字母 'a' + n。
#[derive(Debug)]
pub struct MountSession {
    suffix: String,
    disks: Vec<MountedDisk>,
}

impl MountSession {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            suffix: config.id_suffix()?.to_string(),
            disks: Vec::new(),
        })
    }

    /// 挂载 `path` 上名为 `name` 的主分区
    pub fn mount<P: AsRef<Path>>(&mut self, path: P, name: &str) -> Result<MountedPartition> {
        let path = path.as_ref();
        let mut disk = open_disk(path)?;
        let mounted = self.mount_on(&mut disk, path, name)?;
        info!(
            "mounted '{}' from {} as {}",
            mounted.name,
            path.display(),
            mounted.id
        );
        Ok(mounted)
    }

    /// 在已打开的设备上挂载，`path` 只用来确定磁盘标识
    pub fn mount_on<D: BlockDevice + ?Sized>(
        &mut self,
        dev: &mut D,
        path: &Path,
        name: &str,
    ) -> Result<MountedPartition> {
        let name = name.trim();
        let mut table = PartitionTable::read_from(dev)?;

        let (slot, kind, mounted) = match table.find_by_name(name) {
            Some((slot, entry)) => (slot, entry.kind, entry.mounted),
            None => return Err(missing_partition(dev, &table, name)),
        };
        if kind != PartitionKind::Primary {
            return Err(DiskError::MountKindUnsupported(name.to_string()));
        }
        if mounted {
            return Err(DiskError::AlreadyMounted(name.to_string()));
        }

        let identity = disk_identity(path);
        let letter = self.letter_for(&identity)?;
        let id = format!("{}{}{}", self.suffix, slot + 1, letter);

        if let Some(entry) = table.slot_mut(slot) {
            entry.mounted = true;
            entry.id = Some(id.clone());
        }
        table.write_into(dev)?;
        debug!("partition table after mount: {table:#?}");

        let record = MountedPartition {
            path: path.to_path_buf(),
            name: name.to_string(),
            id,
            status: STATUS_MOUNTED,
        };
        self.record(identity, letter, record.clone());
        Ok(record)
    }

    /// 卸载全部：把会话中每个磁盘的分区状态改回未挂载并清空 ID，然后清空会话。
    ///
    /// 单个磁盘失败只记日志并跳过；只有所有磁盘都失败时才返回错误。
    pub fn unmount_all(&mut self) -> Result<UnmountSummary> {
        let disks = std::mem::take(&mut self.disks);
        let mut summary = UnmountSummary::default();
        let mut last_error = None;

        for disk in &disks {
            let Some(first) = disk.partitions.first() else {
                continue;
            };
            match reset_table(&first.path) {
                Ok(()) => {
                    info!("unmounted every partition on {}", disk.identity);
                    summary.cleaned.push(disk.identity.clone());
                }
                Err(e) => {
                    warn!("failed to unmount partitions on {}: {e}", disk.identity);
                    summary.failed.push(disk.identity.clone());
                    last_error = Some(e);
                }
            }
        }

        info!("mount session cleared");
        match last_error {
            Some(e) if summary.cleaned.is_empty() => Err(e),
            _ => Ok(summary),
        }
    }

    pub fn disks(&self) -> &[MountedDisk] {
        &self.disks
    }

    /// 某个磁盘标识下已挂载的分区
    pub fn mounted(&self, identity: &str) -> Option<&[MountedPartition]> {
        self.disks
            .iter()
            .find(|disk| disk.identity == identity)
            .map(|disk| disk.partitions.as_slice())
    }

    pub fn find_by_id(&self, id: &str) -> Option<&MountedPartition> {
        self.disks
            .iter()
            .flat_map(|disk| disk.partitions.iter())
            .find(|partition| partition.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.disks.is_empty()
    }

    fn letter_for(&self, identity: &str) -> Result<char> {
        if let Some(disk) = self.disks.iter().find(|disk| disk.identity == identity) {
            return Ok(disk.letter);
        }
        let index = self.disks.len();
        if index >= 26 {
            return Err(DiskError::NoDiskLetter);
        }
        Ok((b'a' + index as u8) as char)
    }

    fn record(&mut self, identity: String, letter: char, partition: MountedPartition) {
        match self.disks.iter_mut().find(|disk| disk.identity == identity) {
            Some(disk) => disk.partitions.push(partition),
            None => self.disks.push(MountedDisk {
                identity,
                letter,
                partitions: vec![partition],
            }),
        }
    }
}

/// 没在分区表里找到时，区分逻辑分区和确实不存在
fn missing_partition<D: BlockDevice + ?Sized>(
    dev: &mut D,
    table: &PartitionTable,
    name: &str,
) -> DiskError {
    let is_logical = table
        .extended()
        .and_then(|(_, extended)| ebr::logical_partitions(dev, extended.start).ok())
        .is_some_and(|logical| logical.iter().any(|ebr| ebr.name == name));

    if is_logical {
        DiskError::MountKindUnsupported(name.to_string())
    } else {
        DiskError::PartitionNotFound(name.to_string())
    }
}

fn reset_table(path: &Path) -> Result<()> {
    let mut disk = open_disk(path)?;
    let mut table = PartitionTable::read_from(&mut disk)?;
    for (_, entry) in table.entries_mut() {
        entry.mounted = false;
        entry.id = None;
    }
    table.write_into(&mut disk)
}
