mod common;

use std::fs;

use common::{config, init_logger, small_disk, TempDir};
use mini_disk::{
    allocate_partition, destroy_disk, mount::disk_identity, read_table, Config, DiskError,
    MountSession, PartitionKind, PartitionSpec,
};

fn disk_with_primaries(dir: &TempDir, file: &str, names: &[&str]) -> std::path::PathBuf {
    let path = dir.join(file);
    small_disk(&path, 64);
    for name in names {
        allocate_partition(&path, &PartitionSpec::new(*name, 4)).unwrap();
    }
    path
}

#[test]
fn distinct_disks_get_distinct_letters() {
    init_logger();
    let dir = TempDir::new();
    let first = disk_with_primaries(&dir, "first.dsk", &["p1", "p2"]);
    let second = disk_with_primaries(&dir, "second.dsk", &["q1"]);
    let mut session = MountSession::new(&config()).unwrap();

    let a1 = session.mount(&first, "p1").unwrap();
    let b1 = session.mount(&second, "q1").unwrap();
    let a2 = session.mount(&first, "p2").unwrap();

    assert_eq!(a1.id, "491a");
    assert_eq!(b1.id, "491b");
    assert_eq!(a2.id, "492a");

    let letters: Vec<_> = session.disks().iter().map(|d| d.letter()).collect();
    assert_eq!(letters, ['a', 'b']);
    assert_eq!(session.mounted(&disk_identity(&first)).unwrap().len(), 2);
    assert_eq!(session.find_by_id("491b").unwrap().path, second);
}

#[test]
fn mount_state_is_written_to_the_table() {
    let dir = TempDir::new();
    let path = disk_with_primaries(&dir, "state.dsk", &["root", "home"]);
    let mut session = MountSession::new(&config()).unwrap();

    session.mount(&path, "home").unwrap();

    let table = read_table(&path).unwrap();
    let home = table.slot(1).unwrap();
    assert!(home.mounted);
    assert_eq!(home.id.as_deref(), Some("492a"));
    assert!(!table.slot(0).unwrap().mounted);
    assert_eq!(table.slot(0).unwrap().id, None);
}

#[test]
fn double_mount_and_wrong_kinds_fail() {
    let dir = TempDir::new();
    let path = disk_with_primaries(&dir, "kinds.dsk", &["p"]);
    allocate_partition(&path, &PartitionSpec::new("ext", 16).kind(PartitionKind::Extended))
        .unwrap();
    let mut session = MountSession::new(&config()).unwrap();

    session.mount(&path, "p").unwrap();
    assert!(matches!(
        session.mount(&path, "p"),
        Err(DiskError::AlreadyMounted(_))
    ));
    assert!(matches!(
        session.mount(&path, "ext"),
        Err(DiskError::MountKindUnsupported(_))
    ));
    assert!(matches!(
        session.mount(&path, "missing"),
        Err(DiskError::PartitionNotFound(_))
    ));
    assert!(matches!(
        session.mount(dir.join("absent.dsk"), "p"),
        Err(DiskError::NotFound(_))
    ));
}

#[test]
fn unmount_all_resets_every_disk() {
    let dir = TempDir::new();
    let first = disk_with_primaries(&dir, "one.dsk", &["a", "b"]);
    let second = disk_with_primaries(&dir, "two.dsk", &["c"]);
    let mut session = MountSession::new(&config()).unwrap();
    session.mount(&first, "a").unwrap();
    session.mount(&first, "b").unwrap();
    session.mount(&second, "c").unwrap();

    let summary = session.unmount_all().unwrap();
    assert_eq!(summary.cleaned.len(), 2);
    assert!(summary.failed.is_empty());
    assert!(session.is_empty());

    for path in [&first, &second] {
        let table = read_table(path).unwrap();
        for (_, entry) in table.entries() {
            assert!(!entry.mounted);
            assert_eq!(entry.id, None);
        }
    }

    // 会话清空后字母从 a 重新开始，分区可以再次挂载
    assert_eq!(session.mount(&second, "c").unwrap().id, "491a");
}

#[test]
fn unmount_all_skips_disks_that_fail() {
    let dir = TempDir::new();
    let kept = disk_with_primaries(&dir, "kept.dsk", &["a"]);
    let removed = disk_with_primaries(&dir, "removed.dsk", &["b"]);
    let mut session = MountSession::new(&config()).unwrap();
    session.mount(&kept, "a").unwrap();
    session.mount(&removed, "b").unwrap();

    // 删除磁盘不会清理挂载记录
    destroy_disk(&removed).unwrap();
    assert!(session.mounted(&disk_identity(&removed)).is_some());

    let summary = session.unmount_all().unwrap();
    assert_eq!(summary.cleaned, [disk_identity(&kept)]);
    assert_eq!(summary.failed, [disk_identity(&removed)]);
    assert!(session.is_empty());
    assert!(!read_table(&kept).unwrap().slot(0).unwrap().mounted);
}

#[test]
fn unmount_all_fails_when_every_disk_fails() {
    let dir = TempDir::new();
    let path = disk_with_primaries(&dir, "only.dsk", &["a"]);
    let mut session = MountSession::new(&config()).unwrap();
    session.mount(&path, "a").unwrap();
    fs::remove_file(&path).unwrap();

    assert!(matches!(session.unmount_all(), Err(DiskError::NotFound(_))));
    assert!(session.is_empty());
}

#[test]
fn empty_session_unmounts_cleanly() {
    let mut session = MountSession::new(&Config::default()).unwrap();
    let summary = session.unmount_all().unwrap();
    assert!(summary.cleaned.is_empty() && summary.failed.is_empty());
}

#[test]
fn custom_registration_id_changes_the_prefix() {
    let dir = TempDir::new();
    let path = disk_with_primaries(&dir, "custom.dsk", &["p"]);
    let config = Config {
        registration_id: "201977".to_string(),
        ..config()
    };
    let mut session = MountSession::new(&config).unwrap();

    assert_eq!(session.mount(&path, "p").unwrap().id, "771a");
}
