use std::env;

use crate::error::{DiskError, Result};

/// 默认的学号/注册号，挂载 ID 取其最后两位
pub const DEFAULT_REGISTRATION_ID: &str = "202200349";

/// 创建磁盘时每次写入的零块大小：1MB
pub const DEFAULT_ZERO_FILL_CHUNK: usize = 1024 * 1024;

pub const ENV_REGISTRATION_ID: &str = "MINI_DISK_REGISTRATION_ID";
pub const ENV_ZERO_FILL_CHUNK: &str = "MINI_DISK_ZERO_FILL_CHUNK";
pub const ENV_PROGRESS: &str = "MINI_DISK_PROGRESS";

/// 创建磁盘和挂载会话共用的运行时配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// 挂载 ID 以它的最后两位开头
    pub registration_id: String,
    /// 零填充新镜像时每次写入的字节数
    pub zero_fill_chunk: usize,
    /// 零填充时是否显示进度条
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registration_id: DEFAULT_REGISTRATION_ID.to_string(),
            zero_fill_chunk: DEFAULT_ZERO_FILL_CHUNK,
            show_progress: false,
        }
    }
}

impl Config {
    /// 从环境变量覆盖默认配置
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(id) = env::var(ENV_REGISTRATION_ID) {
            config.registration_id = id;
        }
        if let Ok(chunk) = env::var(ENV_ZERO_FILL_CHUNK) {
            config.zero_fill_chunk = chunk.trim().parse().map_err(|_| {
                DiskError::Validation(format!("{ENV_ZERO_FILL_CHUNK} must be a number: {chunk}"))
            })?;
        }
        if let Ok(flag) = env::var(ENV_PROGRESS) {
            config.show_progress = matches!(flag.trim(), "1" | "true" | "yes" | "on");
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.zero_fill_chunk == 0 {
            return Err(DiskError::Validation(
                "zero fill chunk must be greater than 0".to_string(),
            ));
        }
        self.id_suffix().map(|_| ())
    }

    /// 注册号的最后两位，例如 "202200349" -> "49"
    pub fn id_suffix(&self) -> Result<&str> {
        let id = self.registration_id.trim();
        if id.len() < 2 || !id.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(DiskError::Validation(format!(
                "registration id must have at least two ASCII alphanumerics: '{}'",
                self.registration_id
            )));
        }
        Ok(&id[id.len() - 2..])
    }
}
