use std::io::Result;

/// 以字节偏移读写的磁盘设备
pub trait BlockDevice {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()>;
    fn write_at(&mut self, offset: u64, buf: &[u8]) -> Result<()>;
    /// 设备总字节数
    fn capacity(&self) -> Result<u64>;
}
