// 分区表固定有 4 个槽位（主分区 + 扩展分区）
pub const SLOT_COUNT: usize = 4;

// 分区名最多 16 字节，不足补 0
pub const NAME_LEN: usize = 16;

// 挂载 ID：两位后缀 + 槽位号 + 磁盘字母
pub const ID_LEN: usize = 4;

// 创建日期 YYYY-MM-DD
pub const DATE_LEN: usize = 10;

pub const STATUS_UNMOUNTED: u8 = b'0';
pub const STATUS_MOUNTED: u8 = b'1';

// EBR 链的结束标记
pub const EBR_NONE: i32 = -1;

// status + kind + fit + start + size + name + correlative + id
pub const ENTRY_SIZE: u64 = 3 + 4 + 4 + NAME_LEN as u64 + 4 + ID_LEN as u64;

// capacity + date + signature + fit + 4 个分区项
pub const MBR_SIZE: u64 = 4 + DATE_LEN as u64 + 4 + 1 + SLOT_COUNT as u64 * ENTRY_SIZE;

// fit + start + size + next + name
pub const EBR_SIZE: u64 = 1 + 4 + 4 + 4 + NAME_LEN as u64;
