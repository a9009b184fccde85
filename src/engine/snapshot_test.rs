// Tests for snapshot cells

use super::*;
use std::thread;

#[test]
fn test_read_returns_initial_value() {
    let cell = SnapshotCell::new(vec![1, 2, 3]);
    assert_eq!(*cell.read(), vec![1, 2, 3]);
}

#[test]
fn test_publish_replaces_wholesale() {
    let cell = SnapshotCell::new(vec![1]);
    cell.publish(vec![4, 5]);
    assert_eq!(*cell.read(), vec![4, 5]);
}

#[test]
fn test_old_snapshot_stays_valid_after_publish() {
    let cell = SnapshotCell::new("old".to_string());
    let held = cell.read();
    cell.publish("new".to_string());

    // An in-flight reader keeps the snapshot it already took.
    assert_eq!(*held, "old");
    assert_eq!(*cell.read(), "new");
}

#[test]
fn test_publish_visible_across_threads() {
    let cell = Arc::new(SnapshotCell::new(0u64));
    cell.publish(42);

    let reader = {
        let cell = cell.clone();
        thread::spawn(move || *cell.read())
    };
    assert_eq!(reader.join().unwrap(), 42);
}

#[test]
fn test_concurrent_reads_during_publishes() {
    let cell = Arc::new(SnapshotCell::new(vec![0u32; 8]));

    let writer = {
        let cell = cell.clone();
        thread::spawn(move || {
            for i in 1..200u32 {
                // Each snapshot is internally consistent: all elements equal.
                cell.publish(vec![i; 8]);
            }
        })
    };

    let reader = {
        let cell = cell.clone();
        thread::spawn(move || {
            for _ in 0..200 {
                let snap = cell.read();
                let first = snap[0];
                assert!(snap.iter().all(|&v| v == first), "partial snapshot observed");
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();
}

#[test]
fn test_default_cell() {
    let cell: SnapshotCell<Vec<u8>> = SnapshotCell::default();
    assert!(cell.read().is_empty());
}
