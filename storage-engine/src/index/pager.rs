//! Node allocation and materialization.
//!
//! The tree never dereferences a raw page address; every node it touches is
//! pinned through a [`Pager`]. Two implementations live here: an in-memory
//! pager for tests and a pager over a buffer pool for persistence. The tree
//! cannot tell them apart.

use crate::index::error::IndexError;
use crate::index::key::KeySerializer;
use crate::index::node::NodeView;
use crate::index::value::ValueSerializer;
use common::api::{BufferPoolManager, PageGuard, PageId, PAGE_SIZE};
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex};

/// Allocates pages, materializes nodes and owns the serializers that fix the
/// tree's on-page key and value widths.
///
/// Every returned guard is a pinned page; dropping it releases the pin, and
/// mutable access marks it dirty for write-back.
pub trait Pager: Send + Sync {
    /// Allocates a page, writes an empty leaf header and returns it pinned.
    fn new_leaf_node(&self) -> Result<Box<dyn PageGuard + '_>, IndexError>;

    /// Allocates a page, writes an internal header with its leading child
    /// pointer and returns it pinned.
    fn new_internal_node(&self, first_child: PageId)
        -> Result<Box<dyn PageGuard + '_>, IndexError>;

    /// Pins and returns an existing node's page.
    fn get_node(&self, page_id: PageId) -> Result<Box<dyn PageGuard + '_>, IndexError>;

    /// The key codec this tree was constructed with.
    fn key_serializer(&self) -> Arc<dyn KeySerializer>;

    /// The value codec this tree was constructed with.
    fn value_serializer(&self) -> Arc<dyn ValueSerializer>;
}

/// In-memory pager for tests: a page table behind a mutex and a monotonic id
/// counter. Guards own a copy of their page and write it back on drop, the
/// same discipline a pool guard enforces with pins.
pub struct MemoryPager {
    key_ser: Arc<dyn KeySerializer>,
    val_ser: Arc<dyn ValueSerializer>,
    pages: Mutex<HashMap<PageId, Box<[u8; PAGE_SIZE]>>>,
    last_page_id: Mutex<PageId>,
}

impl MemoryPager {
    pub fn new(key_ser: Arc<dyn KeySerializer>, val_ser: Arc<dyn ValueSerializer>) -> Self {
        Self {
            key_ser,
            val_ser,
            pages: Mutex::new(HashMap::new()),
            last_page_id: Mutex::new(0),
        }
    }

    fn allocate_page(&self) -> PageId {
        let mut last = self.last_page_id.lock().unwrap();
        *last += 1;
        *last
    }

    fn new_node(&self, init: impl FnOnce(&mut NodeView<'_>)) -> Box<dyn PageGuard + '_> {
        let page_id = self.allocate_page();
        self.pages
            .lock()
            .unwrap()
            .insert(page_id, Box::new([0u8; PAGE_SIZE]));

        let mut guard = MemoryPageGuard {
            pager: self,
            page_id,
            data: Box::new([0u8; PAGE_SIZE]),
            dirty: true,
        };
        {
            let mut node = NodeView::new(&mut guard[..], &*self.key_ser, &*self.val_ser);
            init(&mut node);
        }
        Box::new(guard)
    }
}

impl Pager for MemoryPager {
    fn new_leaf_node(&self) -> Result<Box<dyn PageGuard + '_>, IndexError> {
        Ok(self.new_node(|node| node.init_leaf()))
    }

    fn new_internal_node(
        &self,
        first_child: PageId,
    ) -> Result<Box<dyn PageGuard + '_>, IndexError> {
        Ok(self.new_node(|node| node.init_internal(first_child)))
    }

    fn get_node(&self, page_id: PageId) -> Result<Box<dyn PageGuard + '_>, IndexError> {
        let data = self
            .pages
            .lock()
            .unwrap()
            .get(&page_id)
            .unwrap_or_else(|| panic!("page {} does not exist", page_id))
            .clone();
        Ok(Box::new(MemoryPageGuard {
            pager: self,
            page_id,
            data,
            dirty: false,
        }))
    }

    fn key_serializer(&self) -> Arc<dyn KeySerializer> {
        Arc::clone(&self.key_ser)
    }

    fn value_serializer(&self) -> Arc<dyn ValueSerializer> {
        Arc::clone(&self.val_ser)
    }
}

/// Guard over a memory-pager page.
pub struct MemoryPageGuard<'a> {
    pager: &'a MemoryPager,
    page_id: PageId,
    data: Box<[u8; PAGE_SIZE]>,
    dirty: bool,
}

impl PageGuard for MemoryPageGuard<'_> {
    fn page_id(&self) -> PageId {
        self.page_id
    }
}

impl Deref for MemoryPageGuard<'_> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.data[..]
    }
}

impl DerefMut for MemoryPageGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.dirty = true;
        &mut self.data[..]
    }
}

impl Drop for MemoryPageGuard<'_> {
    fn drop(&mut self) {
        if self.dirty {
            self.pager
                .pages
                .lock()
                .unwrap()
                .insert(self.page_id, self.data.clone());
        }
    }
}

/// Pager over a buffer pool: nodes are pool frames, pins are frame pins and
/// dirty write-back is the pool's eviction and flush machinery.
pub struct BufferPoolPager {
    bpm: Arc<dyn BufferPoolManager>,
    key_ser: Arc<dyn KeySerializer>,
    val_ser: Arc<dyn ValueSerializer>,
}

impl BufferPoolPager {
    pub fn new(
        bpm: Arc<dyn BufferPoolManager>,
        key_ser: Arc<dyn KeySerializer>,
        val_ser: Arc<dyn ValueSerializer>,
    ) -> Self {
        Self {
            bpm,
            key_ser,
            val_ser,
        }
    }
}

impl Pager for BufferPoolPager {
    fn new_leaf_node(&self) -> Result<Box<dyn PageGuard + '_>, IndexError> {
        let mut guard = self.bpm.new_page()?;
        NodeView::new(&mut guard[..], &*self.key_ser, &*self.val_ser).init_leaf();
        Ok(guard)
    }

    fn new_internal_node(
        &self,
        first_child: PageId,
    ) -> Result<Box<dyn PageGuard + '_>, IndexError> {
        let mut guard = self.bpm.new_page()?;
        NodeView::new(&mut guard[..], &*self.key_ser, &*self.val_ser).init_internal(first_child);
        Ok(guard)
    }

    fn get_node(&self, page_id: PageId) -> Result<Box<dyn PageGuard + '_>, IndexError> {
        Ok(self.bpm.fetch_page(page_id)?)
    }

    fn key_serializer(&self) -> Arc<dyn KeySerializer> {
        Arc::clone(&self.key_ser)
    }

    fn value_serializer(&self) -> Arc<dyn ValueSerializer> {
        Arc::clone(&self.val_ser)
    }
}
