use std::path::PathBuf;

use thiserror::Error;

/// 磁盘管理错误类型
#[derive(Debug, Error)]
pub enum DiskError {
    /// 参数非法（大小、单位、名称等）
    #[error("Invalid argument: {0}")]
    Validation(String),

    /// 底层 I/O 错误
    #[error("Disk I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// 记录编解码失败
    #[error("Record codec error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("Partition table is full: at most 4 primary/extended partitions")]
    CapacityExceeded,

    #[error("Not enough space: requested {requested} bytes, {available} bytes available")]
    InsufficientSpace { requested: u64, available: u64 },

    #[error("A partition named '{0}' already exists")]
    DuplicateName(String),

    #[error("Only one extended partition is allowed per disk")]
    DuplicateExtended,

    #[error("Cannot create a logical partition without an extended partition")]
    NoExtendedPartition,

    #[error("No partition named '{0}'")]
    PartitionNotFound(String),

    #[error("Only primary partitions can be mounted: '{0}'")]
    MountKindUnsupported(String),

    #[error("Partition '{0}' is already mounted")]
    AlreadyMounted(String),

    /// 磁盘文件不存在
    #[error("Disk not found: {}", .0.display())]
    NotFound(PathBuf),

    /// 已用完 a..z 的磁盘字母
    #[error("No disk letter left for a new mounted disk")]
    NoDiskLetter,

    /// 分区表或 EBR 链损坏
    #[error("Disk image corrupted: {0}")]
    Corrupted(String),
}

/// 统一结果类型
pub type Result<T> = std::result::Result<T, DiskError>;
