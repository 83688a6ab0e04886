mod common;

use std::fs;

use common::{config, init_logger, small_disk, TempDir};
use mini_disk::{
    create_disk, destroy_disk,
    disk::{open_disk, BlockDevice},
    partition::config::MBR_SIZE,
    read_table, DiskError, DiskSpec, FitPolicy, Unit,
};

#[test]
fn created_file_has_exact_capacity() {
    init_logger();
    let dir = TempDir::new();

    for (amount, unit, bytes) in [
        (1, Unit::Megabyte, 1_048_576),
        (10, Unit::Megabyte, 10_485_760),
        (5, Unit::Kilobyte, 5 * 1024),
        (1, Unit::Kilobyte, 1024),
    ] {
        let path = dir.join(&format!("{amount}{unit}.dsk"));
        let table = create_disk(&path, &DiskSpec::new(amount).unit(unit), &config()).unwrap();

        assert_eq!(fs::metadata(&path).unwrap().len(), bytes);
        assert_eq!(table.capacity, bytes);
        assert_eq!(read_table(&path).unwrap().capacity, bytes);
    }
}

#[test]
fn new_disk_is_zeroed_after_the_table() {
    let dir = TempDir::new();
    let path = dir.join("zero.dsk");
    small_disk(&path, 8);

    let bytes = fs::read(&path).unwrap();
    assert!(bytes[MBR_SIZE as usize..].iter().all(|&b| b == 0));
}

#[test]
fn table_records_fit_date_and_signature() {
    let dir = TempDir::new();
    let path = dir.join("nested/dirs/disk.dsk");

    let table = create_disk(
        &path,
        &DiskSpec::new(16).unit(Unit::Kilobyte).fit(FitPolicy::Best),
        &config(),
    )
    .unwrap();

    assert!(path.is_file());
    assert_eq!(table.fit, FitPolicy::Best);
    assert_eq!(table.created, chrono::Local::now().format("%Y-%m-%d").to_string());
    assert!(table.signature <= i32::MAX as u32);
    assert_eq!(table.populated_count(), 0);
}

#[test]
fn recreating_a_disk_resets_it() {
    let dir = TempDir::new();
    let path = dir.join("again.dsk");
    small_disk(&path, 32);
    small_disk(&path, 8);

    assert_eq!(fs::metadata(&path).unwrap().len(), 8 * 1024);
    assert_eq!(read_table(&path).unwrap().capacity, 8 * 1024);
}

#[test]
fn invalid_disk_specs_create_nothing() {
    let dir = TempDir::new();
    let path = dir.join("bad.dsk");

    for spec in [
        DiskSpec::new(0),
        DiskSpec::new(10).unit(Unit::Byte),
        DiskSpec::new(4096),
    ] {
        assert!(matches!(
            create_disk(&path, &spec, &config()),
            Err(DiskError::Validation(_))
        ));
    }
    assert!(!path.exists());
}

#[test]
fn destroy_removes_the_file() {
    let dir = TempDir::new();
    let path = dir.join("gone.dsk");
    small_disk(&path, 4);

    destroy_disk(&path).unwrap();
    assert!(!path.exists());

    assert!(matches!(destroy_disk(&path), Err(DiskError::NotFound(p)) if p == path));
}

#[test]
fn reading_a_missing_disk_is_not_found() {
    let dir = TempDir::new();
    assert!(matches!(
        read_table(dir.join("missing.dsk")),
        Err(DiskError::NotFound(_))
    ));
}

#[test]
fn opened_disk_reports_its_path_and_size() {
    let dir = TempDir::new();
    let path = dir.join("open.dsk");
    small_disk(&path, 4);

    let disk = open_disk(&path).unwrap();
    assert_eq!(disk.path(), path.as_path());
    assert_eq!(disk.capacity().unwrap(), 4096);
}
