use std::io::{Error, ErrorKind, Result};

use crate::disk::block_device::BlockDevice;

/// 内存中的磁盘，容量固定，越界读写返回错误
#[derive(Debug, Clone)]
pub struct MemoryDisk {
    data: Vec<u8>,
}

impl MemoryDisk {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity],
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn range(&self, offset: u64, len: usize) -> Result<std::ops::Range<usize>> {
        let start = usize::try_from(offset)
            .map_err(|_| Error::new(ErrorKind::InvalidInput, "offset out of range"))?;
        match start.checked_add(len) {
            Some(end) if end <= self.data.len() => Ok(start..end),
            _ => Err(Error::new(
                ErrorKind::UnexpectedEof,
                format!(
                    "access {}..{} beyond disk of {} bytes",
                    offset,
                    offset + len as u64,
                    self.data.len()
                ),
            )),
        }
    }
}

impl BlockDevice for MemoryDisk {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let range = self.range(offset, buf.len())?;
        buf.copy_from_slice(&self.data[range]);
        Ok(())
    }

    fn write_at(&mut self, offset: u64, buf: &[u8]) -> Result<()> {
        let range = self.range(offset, buf.len())?;
        self.data[range].copy_from_slice(buf);
        Ok(())
    }

    fn capacity(&self) -> Result<u64> {
        Ok(self.data.len() as u64)
    }
}
