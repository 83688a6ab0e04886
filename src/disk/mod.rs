use std::{io::ErrorKind, path::Path};

use crate::error::{DiskError, Result};

pub mod block_device;
pub mod codec;
pub mod file_disk;
pub mod image;
pub mod memory_disk;
pub mod types;

pub use block_device::BlockDevice;
pub use file_disk::FileDisk;
pub use image::{create_disk, destroy_disk, read_table, DiskSpec};
pub use memory_disk::MemoryDisk;
pub use types::{FitPolicy, Unit, KILOBYTE, MEGABYTE};

/// 打开已存在的磁盘，文件不存在时返回 `DiskError::NotFound`
pub fn open_disk<P: AsRef<Path>>(path: P) -> Result<FileDisk> {
    let path = path.as_ref();
    FileDisk::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DiskError::NotFound(path.to_path_buf()),
        _ => DiskError::Io(e),
    })
}
