//! 虚拟磁盘分区。
//!
//! 磁盘是一个普通文件，开头是 MBR 风格的分区表，有四个槽位存放主分区和扩展分区。
//! 逻辑分区以 EBR 链表的形式放在扩展分区内部。[`MountSession`] 记录已挂载的主分区，
//! 生命周期由调用方决定。
//!
//! ```no_run
//! use mini_disk::{
//!     allocate_partition, create_disk, Config, DiskSpec, MountSession, PartitionSpec, Unit,
//! };
//!
//! # fn main() -> mini_disk::Result<()> {
//! let config = Config::default();
//! create_disk("disks/a.dsk", &DiskSpec::new(10), &config)?;
//! allocate_partition("disks/a.dsk", &PartitionSpec::new("Part1", 3).unit(Unit::Megabyte))?;
//!
//! let mut session = MountSession::new(&config)?;
//! let mounted = session.mount("disks/a.dsk", "Part1")?;
//! assert_eq!(mounted.id, "491a");
//! session.unmount_all()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod disk;
pub mod error;
pub mod mount;
pub mod partition;
mod utils;

pub use config::Config;
pub use disk::{create_disk, destroy_disk, read_table, DiskSpec, FitPolicy, Unit};
pub use error::{DiskError, Result};
pub use mount::{MountSession, MountedDisk, MountedPartition, UnmountSummary};
pub use partition::{
    allocate_partition, read_layout, AllocatedPartition, DiskLayout, Ebr, PartitionEntry,
    PartitionKind, PartitionSpec, PartitionTable,
};
