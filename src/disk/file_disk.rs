use std::{
    fs::{self, File, OpenOptions},
    io::{ErrorKind, Read, Result, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use indicatif::ProgressBar;

use crate::disk::block_device::BlockDevice;

/// 由宿主机上的一个普通文件模拟的磁盘。
///
/// 文件句柄在 `FileDisk` 被 drop 时关闭，所以每个操作都应在自己的作用域里打开它。
#[derive(Debug)]
pub struct FileDisk {
    file: File,
    path: PathBuf,
}

impl FileDisk {
    /// 以读写方式打开已存在的磁盘文件
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// 创建（或覆盖）磁盘文件，并写入 `capacity` 个 0 字节
    pub fn create<P: AsRef<Path>>(
        path: P,
        capacity: u64,
        chunk: usize,
        progress: &ProgressBar,
    ) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        let zeros = vec![0u8; chunk.max(1)];
        let mut remaining = capacity;
        while remaining > 0 {
            let step = remaining.min(zeros.len() as u64);
            file.write_all(&zeros[..step as usize])?;
            remaining -= step;
            progress.inc(step);
        }
        file.flush()?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BlockDevice for FileDisk {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(buf)
    }

    fn write_at(&mut self, offset: u64, buf: &[u8]) -> Result<()> {
        if offset + buf.len() as u64 > self.capacity()? {
            return Err(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("write past end of disk {}", self.path.display()),
            ));
        }
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(buf)
    }

    fn capacity(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }
}
