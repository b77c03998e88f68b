//! Defines the common API for all buffer pool manager implementations.

use std::fmt;
use std::ops::{Deref, DerefMut};

/// A unique identifier for a page in the database.
pub type PageId = u64;

/// Reserved null sentinel. No allocated page ever has this id, so tree nodes
/// can use it to mean "no sibling" and "no child".
pub const INVALID_PAGE_ID: PageId = 0;

/// The size of a single page in bytes.
pub const PAGE_SIZE: usize = 4096;

/// A specialized error type for buffer pool manager operations.
#[derive(Debug)]
pub enum BpmError {
    /// Returned when the pool is full and no pages can be evicted.
    NoFreeFrames,
    /// Represents an I/O error from the disk manager.
    IoError(std::io::Error),
}

impl fmt::Display for BpmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BpmError::NoFreeFrames => write!(f, "buffer pool is full and every frame is pinned"),
            BpmError::IoError(e) => write!(f, "disk i/o failed: {}", e),
        }
    }
}

impl std::error::Error for BpmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BpmError::NoFreeFrames => None,
            BpmError::IoError(e) => Some(e),
        }
    }
}

/// A smart pointer representing a pinned page.
///
/// This guard provides mutable access to the page's byte data. Holding the
/// guard is the pin: while it is alive the page stays resident and may be
/// mutated. Mutable access marks the page dirty, which authorizes write-back.
/// Dropping the guard releases the pin.
pub trait PageGuard: Deref<Target = [u8]> + DerefMut {
    /// Returns the ID of the page being held.
    fn page_id(&self) -> PageId;
}

/// The main trait defining the behavior of a Buffer Pool Manager.
///
/// This trait is designed to be object-safe, so it can be used with
/// trait objects (`Arc<dyn BufferPoolManager>`).
pub trait BufferPoolManager: Send + Sync {
    /// Fetches a page from the buffer pool, reading from disk if necessary.
    ///
    /// This method pins the page and returns a `PageGuard`. The page remains
    /// pinned until the `PageGuard` is dropped.
    fn fetch_page(&self, page_id: PageId) -> Result<Box<dyn PageGuard + '_>, BpmError>;

    /// Creates a new page in the buffer pool.
    ///
    /// Finds an available frame, allocates a new page ID, and returns the
    /// pinned page as a `PageGuard`.
    fn new_page(&self) -> Result<Box<dyn PageGuard + '_>, BpmError>;

    /// Flushes a specific page to disk if it is dirty.
    fn flush_page(&self, page_id: PageId) -> Result<(), BpmError>;

    /// Flushes all dirty pages in the buffer pool to disk.
    fn flush_all_pages(&self) -> Result<(), BpmError>;
}
