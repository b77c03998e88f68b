//! A buffer pool manager with CLOCK (second-chance) eviction.
//!
//! The pool owns a fixed vector of page frames. Fetching or creating a page
//! hands out a [`FrameGuard`] that holds the frame's write lock for its whole
//! lifetime: a held guard is a pinned page, and the victim search simply
//! skips frames it cannot lock. Dirty frames are written back before their
//! frame is reused.

use common::api::{BpmError, BufferPoolManager, PageGuard, PageId, INVALID_PAGE_ID, PAGE_SIZE};
use common::disk_manager::DiskManager;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, RwLock, RwLockWriteGuard};

type FrameId = usize;

/// A single frame in the buffer pool.
#[derive(Debug)]
struct Frame {
    page_id: PageId,
    data: [u8; PAGE_SIZE],
    is_dirty: bool,
    is_referenced: bool,
}

/// A buffer pool manager built around the CLOCK replacement algorithm.
#[derive(Debug)]
pub struct ClockBufferPoolManager {
    frames: Vec<RwLock<Frame>>,
    page_table: RwLock<HashMap<PageId, FrameId>>,
    free_list: Mutex<Vec<FrameId>>,
    disk_manager: Arc<DiskManager>,
    pool_size: usize,
    clock_hand: Mutex<usize>,
}

/// Pin guard for a frame of the clock pool.
///
/// Owns the frame's write lock until dropped, which keeps the frame out of
/// the victim search. Mutable access marks the frame dirty.
pub struct FrameGuard<'a> {
    page_id: PageId,
    frame: RwLockWriteGuard<'a, Frame>,
}

impl PageGuard for FrameGuard<'_> {
    fn page_id(&self) -> PageId {
        self.page_id
    }
}

impl Deref for FrameGuard<'_> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.frame.data
    }
}

impl DerefMut for FrameGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.frame.is_dirty = true;
        &mut self.frame.data
    }
}

impl ClockBufferPoolManager {
    /// Creates a pool with `pool_size` frames over the given disk manager.
    pub fn new(pool_size: usize, disk_manager: Arc<DiskManager>) -> Self {
        let mut frames = Vec::with_capacity(pool_size);
        let mut free_list = Vec::with_capacity(pool_size);
        for i in 0..pool_size {
            frames.push(RwLock::new(Frame {
                page_id: INVALID_PAGE_ID,
                data: [0; PAGE_SIZE],
                is_dirty: false,
                is_referenced: false,
            }));
            free_list.push(i);
        }

        Self {
            frames,
            page_table: RwLock::new(HashMap::new()),
            free_list: Mutex::new(free_list),
            disk_manager,
            pool_size,
            clock_hand: Mutex::new(0),
        }
    }

    /// Finds a reusable frame and returns it locked.
    ///
    /// Prefers the free list; otherwise runs the CLOCK sweep, clearing
    /// referenced bits on the first pass and taking the first unreferenced
    /// frame it can lock. Pinned frames hold their write lock, so `try_write`
    /// skips them.
    fn find_victim_frame(&self) -> Result<(FrameId, RwLockWriteGuard<'_, Frame>), BpmError> {
        if let Some(frame_id) = self.free_list.lock().unwrap().pop() {
            let frame = self.frames[frame_id].write().unwrap();
            return Ok((frame_id, frame));
        }

        let mut clock_hand = self.clock_hand.lock().unwrap();
        // Sweep twice so every referenced bit gets cleared before giving up.
        for _ in 0..(2 * self.pool_size) {
            let frame_id = *clock_hand;
            *clock_hand = (*clock_hand + 1) % self.pool_size;

            if let Ok(mut frame) = self.frames[frame_id].try_write() {
                if frame.is_referenced {
                    frame.is_referenced = false;
                } else {
                    return Ok((frame_id, frame));
                }
            }
        }

        Err(BpmError::NoFreeFrames)
    }

    /// Writes back the victim's old page (if dirty) and removes its mapping.
    /// Leaves the frame unmapped; the caller installs the new page.
    fn release_victim(&self, frame: &mut Frame) -> Result<(), BpmError> {
        if frame.page_id != INVALID_PAGE_ID {
            if frame.is_dirty {
                self.disk_manager
                    .write_page(frame.page_id, &frame.data)
                    .map_err(BpmError::IoError)?;
            }
            self.page_table.write().unwrap().remove(&frame.page_id);
            frame.page_id = INVALID_PAGE_ID;
            frame.is_dirty = false;
        }
        Ok(())
    }
}

impl BufferPoolManager for ClockBufferPoolManager {
    fn fetch_page(&self, page_id: PageId) -> Result<Box<dyn PageGuard + '_>, BpmError> {
        loop {
            let frame_id = self.page_table.read().unwrap().get(&page_id).copied();
            match frame_id {
                Some(frame_id) => {
                    let mut frame = self.frames[frame_id].write().unwrap();
                    if frame.page_id != page_id {
                        // The frame was evicted between the table lookup and
                        // taking its lock; look the page up again.
                        continue;
                    }
                    frame.is_referenced = true;
                    return Ok(Box::new(FrameGuard { page_id, frame }));
                }
                None => {
                    let (frame_id, mut frame) = self.find_victim_frame()?;
                    self.release_victim(&mut frame)?;

                    if let Err(e) = self.disk_manager.read_page(page_id, &mut frame.data) {
                        self.free_list.lock().unwrap().push(frame_id);
                        return Err(BpmError::IoError(e));
                    }
                    frame.page_id = page_id;
                    frame.is_referenced = true;
                    self.page_table.write().unwrap().insert(page_id, frame_id);

                    return Ok(Box::new(FrameGuard { page_id, frame }));
                }
            }
        }
    }

    fn new_page(&self) -> Result<Box<dyn PageGuard + '_>, BpmError> {
        let (frame_id, mut frame) = self.find_victim_frame()?;
        self.release_victim(&mut frame)?;

        let page_id = self.disk_manager.allocate_page();
        frame.page_id = page_id;
        frame.data = [0; PAGE_SIZE];
        frame.is_dirty = true;
        frame.is_referenced = true;
        self.page_table.write().unwrap().insert(page_id, frame_id);

        Ok(Box::new(FrameGuard { page_id, frame }))
    }

    fn flush_page(&self, page_id: PageId) -> Result<(), BpmError> {
        let frame_id = self.page_table.read().unwrap().get(&page_id).copied();
        if let Some(frame_id) = frame_id {
            let mut frame = self.frames[frame_id].write().unwrap();
            if frame.page_id == page_id && frame.is_dirty {
                self.disk_manager
                    .write_page(page_id, &frame.data)
                    .map_err(BpmError::IoError)?;
                frame.is_dirty = false;
            }
        }
        Ok(())
    }

    fn flush_all_pages(&self) -> Result<(), BpmError> {
        let mappings: Vec<(PageId, FrameId)> = self
            .page_table
            .read()
            .unwrap()
            .iter()
            .map(|(&page_id, &frame_id)| (page_id, frame_id))
            .collect();

        for (page_id, frame_id) in mappings {
            let mut frame = self.frames[frame_id].write().unwrap();
            if frame.page_id == page_id && frame.is_dirty {
                self.disk_manager
                    .write_page(page_id, &frame.data)
                    .map_err(BpmError::IoError)?;
                frame.is_dirty = false;
            }
        }
        Ok(())
    }
}
