#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use mini_disk::{create_disk, Config, DiskSpec, PartitionTable, Unit};
use uuid::Uuid;

/// 测试用的临时目录，drop 时删除
pub struct TempDir(PathBuf);

impl TempDir {
    pub fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("mini-disk-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).expect("create temp dir");
        Self(dir)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.0.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn config() -> Config {
    Config {
        zero_fill_chunk: 64 * 1024,
        ..Config::default()
    }
}

/// 创建一个 `kb` KB 的磁盘
pub fn small_disk(path: &Path, kb: u64) -> PartitionTable {
    create_disk(path, &DiskSpec::new(kb).unit(Unit::Kilobyte), &config()).expect("create disk")
}
