//! Manages reading and writing pages to a file on disk.

use super::api::{PageId, PAGE_SIZE};
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::{FileExt, OpenOptionsExt};
use std::sync::Mutex;

/// Reads and writes fixed-size pages at `page_id * PAGE_SIZE` offsets.
///
/// Uses positioned I/O (`read_exact_at`, `write_at`) so concurrent reads and
/// writes need no lock on the file; only page allocation is serialized.
#[derive(Debug)]
pub struct DiskManager {
    db_file: File,
    next_page_id: Mutex<PageId>,
}

impl DiskManager {
    /// Opens (or creates) the database file.
    ///
    /// With `direct_io` the file is opened `O_DIRECT`, bypassing the OS page
    /// cache. Page 0 of the file is reserved as the invalid-pointer sentinel;
    /// allocation starts at page 1.
    pub fn new(db_file_path: &str, direct_io: bool) -> io::Result<Self> {
        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true);
        if direct_io {
            options.custom_flags(libc::O_DIRECT);
        }
        let file = options.open(db_file_path)?;

        let pages_on_disk = file.metadata()?.len() / PAGE_SIZE as u64;
        let next_page_id = pages_on_disk.max(1);

        Ok(Self {
            db_file: file,
            next_page_id: Mutex::new(next_page_id),
        })
    }

    /// Reads a page from the database file into the provided buffer.
    pub fn read_page(&self, page_id: PageId, data: &mut [u8]) -> io::Result<()> {
        let offset = page_id * PAGE_SIZE as u64;
        self.db_file.read_exact_at(data, offset)
    }

    /// Writes a page from the buffer into the database file.
    pub fn write_page(&self, page_id: PageId, data: &[u8]) -> io::Result<()> {
        let offset = page_id * PAGE_SIZE as u64;
        self.db_file.write_all_at(data, offset)
    }

    /// Allocates a new page ID.
    pub fn allocate_page(&self) -> PageId {
        let mut next_page_id = self.next_page_id.lock().unwrap();
        let page_id = *next_page_id;
        *next_page_id += 1;
        page_id
    }
}
