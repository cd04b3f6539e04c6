//! Integration tests for fileperf
//!
//! Real directory trees are built with tempfile; fault injection uses
//! the in-memory root.

use fileperf::fs::{Dir, MemoryRoot};
use fileperf::walker::{CancelToken, JobStats, Scanner};
use fileperf::{FileError, Pattern, ScanError};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn drain(scanner: &Scanner, root: MemoryRoot) -> (Vec<fileperf::FileRecord>, JobStats, Option<ScanError>) {
    let mut iter = scanner.scan_dir(root).unwrap();
    let records: Vec<_> = iter.by_ref().collect();
    iter.close();
    (records, iter.statistics(), iter.error().cloned())
}

fn flat_tree(n: usize) -> MemoryRoot {
    (0..n).fold(MemoryRoot::new("/data"), |root, i| {
        root.with_file(format!("file{i:02}.dat"), vec![7u8; i + 1])
    })
}

#[test]
fn test_scan_real_directory() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("ten.bin"), [1u8; 10]).unwrap();
    fs::write(dir.path().join("twenty.bin"), [2u8; 20]).unwrap();
    fs::write(dir.path().join("empty.bin"), []).unwrap();

    let mut iter = Scanner::new().scan_dir(Dir::new(dir.path())).unwrap();
    let records: Vec<_> = iter.by_ref().collect();
    iter.close();

    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.is_ok()));
    assert_eq!(iter.error(), None);

    let stats = iter.statistics();
    assert_eq!(stats.scanned, 3);
    assert_eq!(stats.read, 3);
    assert_eq!(stats.errors, 0);
    assert_eq!(stats.total_bytes, 30);
}

#[test]
fn test_nested_real_directory_order() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("b/inner")).unwrap();
    fs::write(dir.path().join("b/inner/x.txt"), "xx").unwrap();
    fs::write(dir.path().join("b/y.txt"), "y").unwrap();
    fs::write(dir.path().join("a.txt"), "aaa").unwrap();

    let mut iter = Scanner::new().scan_dir(Dir::new(dir.path())).unwrap();
    let paths: Vec<PathBuf> = iter.by_ref().map(|r| r.path).collect();
    iter.close();

    let expected: Vec<PathBuf> = ["a.txt", "b", "b/inner", "b/inner/x.txt", "b/y.txt"]
        .iter()
        .map(PathBuf::from)
        .collect();
    assert_eq!(paths, expected);

    let stats = iter.statistics();
    assert_eq!(stats.scanned, 5);
    assert_eq!(stats.read, 3);
    assert_eq!(stats.total_bytes, 6);
}

#[test]
fn test_unreadable_file_counts_as_error() {
    let root = MemoryRoot::new("/data")
        .with_file("a.txt", "aaaa")
        .with_file("b.txt", "bb")
        .with_file("locked.txt", "secret")
        .deny_read("locked.txt");

    let (records, stats, err) = drain(&Scanner::new(), root);

    assert_eq!(err, None);
    assert_eq!(stats.errors, 1);
    assert_eq!(stats.read, 2);
    assert_eq!(stats.scanned, 3);
    assert_eq!(stats.total_bytes, 6);

    let locked = records.iter().find(|r| r.name() == "locked.txt").unwrap();
    assert!(matches!(locked.error, Some(FileError::PermissionDenied { .. })));
    assert!(!locked.is_ok());
}

#[test]
fn test_exclude_all_without_skip_reporting() {
    let scanner = Scanner::new().exclude(Pattern::new(".*").unwrap());
    let (records, stats, err) = drain(&scanner, flat_tree(5));

    assert!(records.is_empty());
    assert_eq!(err, None);
    assert_eq!(stats.scanned, 0);
    assert_eq!(stats.skipped, 5);
}

#[test]
fn test_exclude_all_with_skip_reporting() {
    let scanner = Scanner::new()
        .exclude(Pattern::new(".*").unwrap())
        .report_skipped(true);
    let (records, stats, _) = drain(&scanner, flat_tree(5));

    assert_eq!(records.len(), 5);
    assert!(records.iter().all(|r| r.skipped));
    assert_eq!(stats.scanned, 0);
    assert_eq!(stats.skipped, 5);
    assert_eq!(stats.total_bytes, 0);
}

#[test]
fn test_exclude_wins_over_include() {
    let scanner = Scanner::new()
        .include(Pattern::new(r"\.log$").unwrap())
        .exclude(Pattern::new("^debug").unwrap());
    let root = MemoryRoot::new("/logs")
        .with_file("app.log", "1")
        .with_file("debug.log", "22")
        .with_file("notes.txt", "333");

    let (records, stats, _) = drain(&scanner, root);

    let names: Vec<String> = records.iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["app.log"]);
    assert_eq!(stats.scanned, 1);
    assert_eq!(stats.skipped, 2);
    assert_eq!(stats.total_bytes, 1);
}

#[test]
fn test_every_entry_is_accounted_for() {
    let root = MemoryRoot::new("/data")
        .with_file("a/1", "1")
        .with_file("a/b/2", "2")
        .with_file("c/3", "3")
        .with_file("4", "4");
    let total = root.len() as u64;

    let scanner = Scanner::new().exclude(Pattern::new("^b$").unwrap());
    let (records, stats, _) = drain(&scanner, root);

    assert_eq!(stats.scanned + stats.skipped, total);
    assert_eq!(records.len() as u64, stats.scanned);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.read, 4);
}

#[test]
fn test_statistics_are_monotonic() {
    let root = flat_tree(20).deny_read("file03.dat").deny_stat("file11.dat");
    let mut iter = Scanner::new().scan_dir(root).unwrap();
    let signal = CancelToken::new();

    let mut previous = iter.statistics();
    let mut updates = 0;
    while iter.advance(&signal) {
        let current = iter.statistics();
        assert!(current.dominates(&previous), "{current:?} < {previous:?}");
        assert_eq!(iter.current().unwrap().index, previous.processed());
        previous = current;
        updates += 1;
    }
    iter.close();

    assert_eq!(updates, 20);
    assert!(iter.statistics().dominates(&previous));
    assert_eq!(iter.statistics().errors, 2);
}

#[test]
fn test_cancel_mid_walk() {
    let mut iter = Scanner::new().scan_dir(flat_tree(30)).unwrap();
    let signal = CancelToken::new();

    assert!(iter.advance(&signal));
    assert!(iter.advance(&signal));
    let before = iter.statistics();
    iter.cancel_handle().cancel();

    let mut delivered = 2;
    while iter.advance(&signal) {
        delivered += 1;
    }
    iter.close();

    assert_eq!(iter.error(), Some(&ScanError::Cancelled));
    let stats = iter.statistics();
    assert!(stats.dominates(&before), "{stats:?} < {before:?}");
    assert!(stats.scanned >= delivered);
    assert!(stats.scanned < 30);
}

#[test]
fn test_close_before_end_is_stable() {
    let mut iter = Scanner::new().scan_dir(flat_tree(10)).unwrap();
    assert!(iter.advance(&CancelToken::new()));
    iter.close();

    let stats = iter.statistics();
    let err = iter.error().cloned();
    assert!(iter.is_finished());

    assert!(!iter.advance(&CancelToken::new()));
    iter.close();
    assert_eq!(iter.statistics(), stats);
    assert_eq!(iter.error().cloned(), err);
}

#[test]
fn test_runs_are_independent() {
    let scanner = Scanner::new();

    let (_, first, _) = drain(&scanner, flat_tree(3));
    let (_, second, _) = drain(&scanner, flat_tree(3));
    assert_eq!(first.scanned, 3);
    assert_eq!(second.scanned, 3);
    assert_eq!(first.total_bytes, second.total_bytes);

    let (_, other, _) = drain(&scanner, flat_tree(1));
    assert_eq!(other.scanned, 1);
}

#[test]
fn test_missing_root_fails_traversal() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");

    let mut iter = Scanner::new().scan_dir(Dir::new(&missing)).unwrap();
    assert!(!iter.advance(&CancelToken::new()));
    iter.close();

    assert!(matches!(
        iter.error(),
        Some(ScanError::Traversal(FileError::NotFound { .. }))
    ));
    assert_eq!(iter.statistics(), JobStats::default());
}
