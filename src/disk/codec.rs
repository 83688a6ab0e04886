//! 定长记录的编解码。
//!
//! 记录是只含整数和字节数组的 serde 结构体。bincode 的传统配置
//! （`bincode::serialize`）按小端紧凑写入，没有长度前缀，编码长度等于各字段长度之和。

use serde::{de::DeserializeOwned, Serialize};

use crate::{disk::block_device::BlockDevice, error::Result};

/// 磁盘上的定长记录
pub trait Record: Serialize + DeserializeOwned {
    /// 编码后的字节数
    const SIZE: u64;
}

/// 从 `offset` 处读取一条记录
pub fn read_record<T, D>(dev: &mut D, offset: u64) -> Result<T>
where
    T: Record,
    D: BlockDevice + ?Sized,
{
    let mut buf = vec![0u8; T::SIZE as usize];
    dev.read_at(offset, &mut buf)?;
    Ok(bincode::deserialize(&buf)?)
}

/// 把记录写到 `offset` 处
pub fn write_record<T, D>(dev: &mut D, record: &T, offset: u64) -> Result<()>
where
    T: Record,
    D: BlockDevice + ?Sized,
{
    let bytes = bincode::serialize(record)?;
    debug_assert_eq!(bytes.len() as u64, T::SIZE);
    dev.write_at(offset, &bytes)?;
    Ok(())
}

pub fn record_size<T: Record>() -> u64 {
    T::SIZE
}
