//! In-order scans over the leaf chain.

use crate::index::error::IndexError;
use crate::index::key::{IndexKey, KeySerializer};
use crate::index::node::NodeView;
use crate::index::pager::Pager;
use crate::index::value::{IndexValue, ValueSerializer};
use common::api::{PageId, INVALID_PAGE_ID};
use std::sync::Arc;

/// Iterator over a tree's pairs in ascending key order.
///
/// Walks the forward-linked leaf chain starting from a leaf and slot chosen
/// by [`BTree::iter`] or [`BTree::iter_from`]. Only the leaf being read is
/// pinned, and only for the duration of one `next()` call.
///
/// [`BTree::iter`]: crate::index::bptree::BTree::iter
/// [`BTree::iter_from`]: crate::index::bptree::BTree::iter_from
pub struct TreeIterator {
    pager: Arc<dyn Pager>,
    key_ser: Arc<dyn KeySerializer>,
    val_ser: Arc<dyn ValueSerializer>,
    current_page_id: PageId,
    current_index: usize,
}

impl TreeIterator {
    pub fn new(pager: Arc<dyn Pager>, start_page_id: PageId, start_index: usize) -> Self {
        let key_ser = pager.key_serializer();
        let val_ser = pager.value_serializer();
        Self {
            pager,
            key_ser,
            val_ser,
            current_page_id: start_page_id,
            current_index: start_index,
        }
    }
}

impl Iterator for TreeIterator {
    type Item = Result<(IndexKey, IndexValue), IndexError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_page_id == INVALID_PAGE_ID {
                return None;
            }

            let mut guard = match self.pager.get_node(self.current_page_id) {
                Ok(guard) => guard,
                Err(e) => return Some(Err(e)),
            };
            let node = NodeView::new(&mut guard[..], &*self.key_ser, &*self.val_ser);

            // Exhausted this leaf; move along the chain.
            if self.current_index >= node.key_count() {
                self.current_page_id = node.right();
                self.current_index = 0;
                continue;
            }

            let pair = (
                node.key_at(self.current_index),
                node.value_at(self.current_index),
            );
            self.current_index += 1;
            return Some(Ok(pair));
        }
    }
}
