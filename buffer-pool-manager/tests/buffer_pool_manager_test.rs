use buffer_pool_manager::ClockBufferPoolManager;
use common::api::{BpmError, BufferPoolManager, PAGE_SIZE};
use common::disk_manager::DiskManager;
use std::fs;
use std::sync::Arc;
use test_case::test_case;

const TEST_POOL_SIZE: usize = 3;

fn setup(db_file: &str, pool_size: usize) -> (Arc<DiskManager>, ClockBufferPoolManager) {
    let _ = fs::remove_file(db_file);
    let disk_manager = Arc::new(DiskManager::new(db_file, false).unwrap());
    let bpm = ClockBufferPoolManager::new(pool_size, disk_manager.clone());
    (disk_manager, bpm)
}

fn cleanup_db_file(db_file: &str) {
    let _ = fs::remove_file(db_file);
}

#[test]
fn test_new_page() {
    let db_file = "test_bpm_new_page.db";
    let (_dm, bpm) = setup(db_file, TEST_POOL_SIZE);

    let page = bpm.new_page().unwrap();
    assert_eq!(page.page_id(), 1);
    drop(page);

    let page = bpm.new_page().unwrap();
    assert_eq!(page.page_id(), 2);
    drop(page);

    cleanup_db_file(db_file);
}

#[test]
fn test_fetch_page() {
    let db_file = "test_bpm_fetch_page.db";
    let (_dm, bpm) = setup(db_file, TEST_POOL_SIZE);

    let mut page = bpm.new_page().unwrap();
    let page_id = page.page_id();
    page[0] = 0xAB;
    page[PAGE_SIZE - 1] = 0xCD;
    drop(page);

    let fetched = bpm.fetch_page(page_id).unwrap();
    assert_eq!(fetched.page_id(), page_id);
    assert_eq!(fetched[0], 0xAB);
    assert_eq!(fetched[PAGE_SIZE - 1], 0xCD);
    drop(fetched);

    cleanup_db_file(db_file);
}

#[test_case(3 ; "small_pool")]
#[test_case(8 ; "larger_pool")]
fn test_pinned_pages_block_eviction(pool_size: usize) {
    let db_file = format!("test_bpm_pinned_{}.db", pool_size);
    let (_dm, bpm) = setup(&db_file, pool_size);

    // Fill the pool and keep every page pinned.
    let mut guards = Vec::new();
    for _ in 0..pool_size {
        guards.push(bpm.new_page().unwrap());
    }

    // No frame can be evicted while all guards are alive.
    match bpm.new_page() {
        Err(BpmError::NoFreeFrames) => {}
        other => panic!("expected NoFreeFrames, got {:?}", other.map(|g| g.page_id())),
    }

    // Releasing one pin frees a frame.
    guards.pop();
    assert!(bpm.new_page().is_ok());

    cleanup_db_file(&db_file);
}

#[test]
fn test_eviction_writes_dirty_pages_back() {
    let db_file = "test_bpm_eviction_writeback.db";
    let (_dm, bpm) = setup(db_file, TEST_POOL_SIZE);

    // Create twice as many pages as there are frames, each with a marker.
    let mut page_ids = Vec::new();
    for i in 0..(2 * TEST_POOL_SIZE) {
        let mut page = bpm.new_page().unwrap();
        page[0] = i as u8;
        page_ids.push(page.page_id());
    }

    // Every page must come back with its marker, whether it survived in the
    // pool or was evicted and re-read from disk.
    for (i, &page_id) in page_ids.iter().enumerate() {
        let page = bpm.fetch_page(page_id).unwrap();
        assert_eq!(page[0], i as u8);
    }

    cleanup_db_file(db_file);
}

#[test]
fn test_flush_page_writes_to_disk() {
    let db_file = "test_bpm_flush_page.db";
    let (disk_manager, bpm) = setup(db_file, TEST_POOL_SIZE);

    let mut page = bpm.new_page().unwrap();
    let page_id = page.page_id();
    page[100] = 42;
    drop(page);

    bpm.flush_page(page_id).unwrap();

    let mut raw = [0u8; PAGE_SIZE];
    disk_manager.read_page(page_id, &mut raw).unwrap();
    assert_eq!(raw[100], 42);

    cleanup_db_file(db_file);
}

#[test]
fn test_flush_all_pages() {
    let db_file = "test_bpm_flush_all.db";
    let (disk_manager, bpm) = setup(db_file, TEST_POOL_SIZE);

    let mut page_ids = Vec::new();
    for i in 0..TEST_POOL_SIZE {
        let mut page = bpm.new_page().unwrap();
        page[0] = (i + 1) as u8;
        page_ids.push(page.page_id());
    }

    bpm.flush_all_pages().unwrap();

    let mut raw = [0u8; PAGE_SIZE];
    for (i, &page_id) in page_ids.iter().enumerate() {
        disk_manager.read_page(page_id, &mut raw).unwrap();
        assert_eq!(raw[0], (i + 1) as u8);
    }

    cleanup_db_file(db_file);
}
