use std::path::{Path, PathBuf};

pub mod session;

pub use session::{MountSession, UnmountSummary};

/// 一个已挂载的主分区
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedPartition {
    pub path: PathBuf,
    pub name: String,
    pub id: String,
    /// 挂载时为 '1'，与磁盘上的状态字节一致
    pub status: u8,
}

/// 同一个磁盘上挂载的所有分区，共用一个字母
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedDisk {
    identity: String,
    letter: char,
    partitions: Vec<MountedPartition>,
}

impl MountedDisk {
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn letter(&self) -> char {
        self.letter
    }

    /// 按挂载顺序
    pub fn partitions(&self) -> &[MountedPartition] {
        &self.partitions
    }
}

/// 磁盘标识：路径转小写，同一个文件的所有挂载都落到同一个标识下
pub fn disk_identity<P: AsRef<Path>>(path: P) -> String {
    path.as_ref().to_string_lossy().to_lowercase()
}
