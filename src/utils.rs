use chrono::Local;
use uuid::Uuid;

/// 当前本地日期，格式 YYYY-MM-DD（正好 10 字节）
pub fn current_date() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// 生成一个非负的随机磁盘签名
pub fn random_signature() -> u32 {
    (Uuid::new_v4().as_u128() as u32) & 0x7FFF_FFFF
}

/// 把字符串写进定长字节数组，不足部分补 0，超出部分截断
pub fn encode_fixed<const N: usize>(value: &str) -> [u8; N] {
    let mut buf = [0u8; N];
    let bytes = value.as_bytes();
    let len = bytes.len().min(N);
    buf[..len].copy_from_slice(&bytes[..len]);
    buf
}

/// 读取定长字节数组里的字符串，去掉尾部的 0 和首尾空白
pub fn decode_fixed(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).trim().to_string()
}
