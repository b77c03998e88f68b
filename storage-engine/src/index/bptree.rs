//! B+ tree: root pointer, root-to-leaf descent, bottom-up split propagation
//! and underflow repair.
//!
//! The tree holds no parent pointers in nodes. Each operation records its
//! descent as a stack of `(page_id, child index)` pairs and re-pins ancestors
//! from that stack when splits or merges propagate upward. Operations run to
//! completion on a single thread; callers that want concurrency serialize
//! operations externally.

use crate::index::error::IndexError;
use crate::index::iterator::TreeIterator;
use crate::index::key::{IndexKey, KeySerializer};
use crate::index::node::{NodeView, CHILD_POINTER_SIZE, NODE_HEADER_SIZE};
use crate::index::pager::Pager;
use crate::index::value::{IndexValue, ValueSerializer};
use common::api::{PageId, PAGE_SIZE};
use std::sync::Arc;

/// One step of a root-to-leaf descent: the visited page and the child index
/// that was followed (for the leaf, the key's slot or insertion slot).
#[derive(Debug, Clone, Copy)]
struct NodeIndexPair {
    page_id: PageId,
    index: usize,
}

/// An ordered, unique key-value index over fixed-size pages.
pub struct BTree {
    degree: usize,
    root: PageId,
    pager: Arc<dyn Pager>,
    key_ser: Arc<dyn KeySerializer>,
    val_ser: Arc<dyn ValueSerializer>,
}

impl BTree {
    /// Creates an empty tree: a single leaf root.
    ///
    /// # Panics
    /// Panics when `degree < 3` or when `degree` entries cannot fit a page
    /// with the registered serializers.
    pub fn new(degree: usize, pager: Arc<dyn Pager>) -> Result<Self, IndexError> {
        let key_ser = pager.key_serializer();
        let val_ser = pager.value_serializer();
        Self::check_degree(degree, key_ser.size(), val_ser.size());

        let root_guard = pager.new_leaf_node()?;
        let root = root_guard.page_id();
        drop(root_guard);

        Ok(Self {
            degree,
            root,
            pager,
            key_ser,
            val_ser,
        })
    }

    /// Reattaches to an existing tree. The root page id is the only
    /// tree-level state; callers persist it alongside the pager's metadata.
    pub fn open(degree: usize, pager: Arc<dyn Pager>, root: PageId) -> Self {
        let key_ser = pager.key_serializer();
        let val_ser = pager.value_serializer();
        Self::check_degree(degree, key_ser.size(), val_ser.size());

        Self {
            degree,
            root,
            pager,
            key_ser,
            val_ser,
        }
    }

    fn check_degree(degree: usize, key_size: usize, value_size: usize) {
        assert!(degree >= 3, "degree must be at least 3");
        // One slot of headroom: a node holds `degree` entries between an
        // insert and the split it triggers.
        let leaf_slot = key_size + value_size;
        let internal_slot = key_size + CHILD_POINTER_SIZE;
        assert!(
            NODE_HEADER_SIZE + (degree + 1) * leaf_slot <= PAGE_SIZE,
            "degree {} leaves do not fit a {}-byte page",
            degree,
            PAGE_SIZE
        );
        assert!(
            NODE_HEADER_SIZE + CHILD_POINTER_SIZE + (degree + 1) * internal_slot <= PAGE_SIZE,
            "degree {} internal nodes do not fit a {}-byte page",
            degree,
            PAGE_SIZE
        );
    }

    /// The page holding the root node.
    pub fn root_page_id(&self) -> PageId {
        self.root
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    // ===== Lookup =====

    /// Point lookup. `None` when the key is absent.
    pub fn find(&self, key: &IndexKey) -> Result<Option<IndexValue>, IndexError> {
        let mut current = self.root;
        loop {
            let mut guard = self.pager.get_node(current)?;
            let node = NodeView::new(&mut guard[..], &*self.key_ser, &*self.val_ser);

            if node.is_leaf() {
                return Ok(match node.find_key(key) {
                    Ok(index) => Some(node.value_at(index)),
                    Err(_) => None,
                });
            }

            current = node.child_at(Self::descend_index(&node, key));
        }
    }

    /// Child index to follow for `key`: a found separator routes to the
    /// subtree on its right.
    fn descend_index(node: &NodeView<'_>, key: &IndexKey) -> usize {
        match node.find_key(key) {
            Ok(index) => index + 1,
            Err(index) => index,
        }
    }

    /// Descends to the leaf responsible for `key`, recording every visited
    /// page and the child index taken. The final pair is the leaf with the
    /// key's slot (or insertion slot); the returned flag says which.
    fn find_path(&self, key: &IndexKey) -> Result<(Vec<NodeIndexPair>, bool), IndexError> {
        let mut stack = Vec::new();
        let mut current = self.root;

        loop {
            let mut guard = self.pager.get_node(current)?;
            let node = NodeView::new(&mut guard[..], &*self.key_ser, &*self.val_ser);

            if node.is_leaf() {
                let (index, found) = match node.find_key(key) {
                    Ok(index) => (index, true),
                    Err(index) => (index, false),
                };
                stack.push(NodeIndexPair {
                    page_id: current,
                    index,
                });
                return Ok((stack, found));
            }

            let child_index = Self::descend_index(&node, key);
            stack.push(NodeIndexPair {
                page_id: current,
                index: child_index,
            });
            current = node.child_at(child_index);
        }
    }

    // ===== Insert =====

    /// Inserts a new pair; a pre-existing key is a `DuplicateKey` error.
    pub fn insert(&mut self, key: IndexKey, value: IndexValue) -> Result<(), IndexError> {
        self.insert_inner(key, value, false).map(|_| ())
    }

    /// Inserts or overwrites. Returns `true` when the key was newly
    /// inserted, `false` when an existing value was replaced.
    pub fn insert_or_replace(
        &mut self,
        key: IndexKey,
        value: IndexValue,
    ) -> Result<bool, IndexError> {
        self.insert_inner(key, value, true)
    }

    fn insert_inner(
        &mut self,
        key: IndexKey,
        value: IndexValue,
        replace: bool,
    ) -> Result<bool, IndexError> {
        // Validate both encodings up front so a rejected input leaves the
        // tree untouched.
        self.key_ser.serialize(&key)?;
        self.val_ser.serialize(&value)?;

        let (mut stack, found) = self.find_path(&key)?;
        let leaf = stack.pop().expect("descent always ends at a leaf");

        if found {
            if !replace {
                return Err(IndexError::DuplicateKey);
            }
            let mut guard = self.pager.get_node(leaf.page_id)?;
            let mut node = NodeView::new(&mut guard[..], &*self.key_ser, &*self.val_ser);
            node.set_value_at(leaf.index, &value)?;
            return Ok(false);
        }

        let mut carry_key;
        let mut carry_child;
        {
            let mut guard = self.pager.get_node(leaf.page_id)?;
            let mut node = NodeView::new(&mut guard[..], &*self.key_ser, &*self.val_ser);
            node.insert_at(leaf.index, &key, &value)?;
            if !node.is_overflow(self.degree) {
                return Ok(true);
            }
            let (right_page_id, separator) = self.split_leaf(&mut node)?;
            carry_key = separator;
            carry_child = right_page_id;
        }
        let mut split_page_id = leaf.page_id;

        // Propagate the split up the recorded path until a parent absorbs
        // the carried separator without overflowing.
        while let Some(pair) = stack.pop() {
            let mut guard = self.pager.get_node(pair.page_id)?;
            let mut node = NodeView::new(&mut guard[..], &*self.key_ser, &*self.val_ser);

            let index = Self::descend_index(&node, &carry_key);
            node.insert_key_child(index, &carry_key, carry_child)?;
            if !node.is_overflow(self.degree) {
                return Ok(true);
            }

            let (right_page_id, separator) = self.split_internal(&mut node)?;
            carry_key = separator;
            carry_child = right_page_id;
            split_page_id = pair.page_id;
        }

        // The split propagated past the root; grow the tree by one level.
        let mut root_guard = self.pager.new_internal_node(split_page_id)?;
        let new_root = root_guard.page_id();
        {
            let mut node = NodeView::new(&mut root_guard[..], &*self.key_ser, &*self.val_ser);
            node.insert_key_child(0, &carry_key, carry_child)?;
        }
        drop(root_guard);
        self.root = new_root;
        Ok(true)
    }

    /// Splits an overflowing leaf at the pivot `degree / 2`.
    ///
    /// The new right sibling takes the pivot and everything after it and is
    /// spliced into the leaf chain. Returns the sibling's page id and the
    /// separator for the parent: a copy of the pivot key, which stays in the
    /// right leaf.
    fn split_leaf(&self, left: &mut NodeView<'_>) -> Result<(PageId, IndexKey), IndexError> {
        let pivot = self.degree / 2;
        let count = left.key_count();

        let mut right_guard = self.pager.new_leaf_node()?;
        let right_page_id = right_guard.page_id();
        let mut right = NodeView::new(&mut right_guard[..], &*self.key_ser, &*self.val_ser);

        for i in pivot..count {
            right.insert_at(i - pivot, &left.key_at(i), &left.value_at(i))?;
        }
        left.set_key_count(pivot);

        right.set_right(left.right());
        left.set_right(right_page_id);

        Ok((right_page_id, right.key_at(0)))
    }

    /// Splits an overflowing internal node at the pivot `degree / 2`.
    ///
    /// Unlike a leaf split the pivot key moves up: the right sibling takes
    /// the keys after the pivot together with their children, and the pivot
    /// becomes the parent separator without staying in either half.
    fn split_internal(&self, left: &mut NodeView<'_>) -> Result<(PageId, IndexKey), IndexError> {
        let pivot = self.degree / 2;
        let count = left.key_count();
        let separator = left.key_at(pivot);

        let mut right_guard = self.pager.new_internal_node(left.child_at(pivot + 1))?;
        let right_page_id = right_guard.page_id();
        let mut right = NodeView::new(&mut right_guard[..], &*self.key_ser, &*self.val_ser);

        for i in (pivot + 1)..count {
            right.insert_key_child(i - pivot - 1, &left.key_at(i), left.child_at(i + 1))?;
        }
        left.set_key_count(pivot);

        Ok((right_page_id, separator))
    }

    // ===== Delete =====

    /// Removes a pair. Returns `false` when the key was not present.
    pub fn delete(&mut self, key: &IndexKey) -> Result<bool, IndexError> {
        let (mut stack, found) = self.find_path(key)?;
        if !found {
            return Ok(false);
        }

        let leaf = stack.pop().expect("descent always ends at a leaf");
        {
            let mut guard = self.pager.get_node(leaf.page_id)?;
            let mut node = NodeView::new(&mut guard[..], &*self.key_ser, &*self.val_ser);
            node.delete_at(leaf.index);
            if !node.is_underflow(self.degree) {
                return Ok(true);
            }
        }

        // Repair underflow bottom-up. A redistribution ends the walk (the
        // parent's shape is unchanged); a merge removes one separator from
        // the parent, which may underflow in turn.
        let mut current = leaf.page_id;
        while let Some(parent_pair) = stack.pop() {
            {
                let mut guard = self.pager.get_node(current)?;
                let node = NodeView::new(&mut guard[..], &*self.key_ser, &*self.val_ser);
                if !node.is_underflow(self.degree) {
                    return Ok(true);
                }
            }
            self.repair_underflow(current, parent_pair)?;
            current = parent_pair.page_id;
        }

        // `current` is the root. A root leaf may shrink arbitrarily; an
        // internal root left with a single child hands it the root role.
        let surviving_child = {
            let mut guard = self.pager.get_node(current)?;
            let node = NodeView::new(&mut guard[..], &*self.key_ser, &*self.val_ser);
            if node.is_leaf() || node.key_count() > 0 {
                return Ok(true);
            }
            node.child_at(0)
        };
        self.root = surviving_child;
        Ok(true)
    }

    /// Rebalances the deficient node at `page_id` using a sibling under the
    /// parent recorded on the descent stack. Siblings are found through the
    /// parent, never through leaf chain pointers, so both node kinds repair
    /// identically.
    fn repair_underflow(
        &self,
        page_id: PageId,
        parent_pair: NodeIndexPair,
    ) -> Result<(), IndexError> {
        let index_at_parent = parent_pair.index;

        let mut parent_guard = self.pager.get_node(parent_pair.page_id)?;
        let mut parent = NodeView::new(&mut parent_guard[..], &*self.key_ser, &*self.val_ser);

        let right_sibling = if index_at_parent < parent.key_count() {
            Some(parent.child_at(index_at_parent + 1))
        } else {
            None
        };
        let left_sibling = if index_at_parent > 0 {
            Some(parent.child_at(index_at_parent - 1))
        } else {
            None
        };

        let mut node_guard = self.pager.get_node(page_id)?;
        let mut node = NodeView::new(&mut node_guard[..], &*self.key_ser, &*self.val_ser);

        if let Some(right_id) = right_sibling {
            let mut right_guard = self.pager.get_node(right_id)?;
            let mut right = NodeView::new(&mut right_guard[..], &*self.key_ser, &*self.val_ser);
            if right.can_spare(self.degree) {
                return self.redistribute(&mut node, &mut right, &mut parent, index_at_parent);
            }
        }

        if let Some(left_id) = left_sibling {
            let mut left_guard = self.pager.get_node(left_id)?;
            let mut left = NodeView::new(&mut left_guard[..], &*self.key_ser, &*self.val_ser);
            if left.can_spare(self.degree) {
                return self.redistribute(&mut left, &mut node, &mut parent, index_at_parent - 1);
            }
        }

        if let Some(right_id) = right_sibling {
            let mut right_guard = self.pager.get_node(right_id)?;
            let mut right = NodeView::new(&mut right_guard[..], &*self.key_ser, &*self.val_ser);
            return self.merge(&mut node, &mut right, &mut parent, index_at_parent);
        }

        if let Some(left_id) = left_sibling {
            let mut left_guard = self.pager.get_node(left_id)?;
            let mut left = NodeView::new(&mut left_guard[..], &*self.key_ser, &*self.val_ser);
            return self.merge(&mut left, &mut node, &mut parent, index_at_parent - 1);
        }

        unreachable!("a non-root node must have at least one sibling");
    }

    /// Evens out two adjacent siblings and rewrites the separator between
    /// them. Leaves split the combined pairs down the middle; internal nodes
    /// rotate through the parent, pulling the old separator down and pushing
    /// the new split key up.
    fn redistribute(
        &self,
        left: &mut NodeView<'_>,
        right: &mut NodeView<'_>,
        parent: &mut NodeView<'_>,
        separator_index: usize,
    ) -> Result<(), IndexError> {
        if left.is_leaf() {
            let mut keys = Vec::new();
            let mut values = Vec::new();
            for i in 0..left.key_count() {
                keys.push(left.key_at(i));
                values.push(left.value_at(i));
            }
            for i in 0..right.key_count() {
                keys.push(right.key_at(i));
                values.push(right.value_at(i));
            }

            let split = keys.len() / 2;
            left.set_key_count(0);
            for i in 0..split {
                left.insert_at(i, &keys[i], &values[i])?;
            }
            right.set_key_count(0);
            for i in split..keys.len() {
                right.insert_at(i - split, &keys[i], &values[i])?;
            }

            parent.set_key_at(separator_index, &keys[split])
        } else {
            let mut keys = Vec::new();
            let mut children = Vec::new();
            for i in 0..left.key_count() {
                keys.push(left.key_at(i));
            }
            for i in 0..=left.key_count() {
                children.push(left.child_at(i));
            }
            keys.push(parent.key_at(separator_index));
            for i in 0..right.key_count() {
                keys.push(right.key_at(i));
            }
            for i in 0..=right.key_count() {
                children.push(right.child_at(i));
            }

            let split = keys.len() / 2;

            left.set_key_count(split);
            left.set_child_at(0, children[0]);
            for i in 0..split {
                left.set_key_at(i, &keys[i])?;
                left.set_child_at(i + 1, children[i + 1]);
            }

            let right_count = keys.len() - split - 1;
            right.set_key_count(right_count);
            right.set_child_at(0, children[split + 1]);
            for i in 0..right_count {
                right.set_key_at(i, &keys[split + 1 + i])?;
                right.set_child_at(i + 1, children[split + 2 + i]);
            }

            parent.set_key_at(separator_index, &keys[split])
        }
    }

    /// Folds `right` into `left` and deletes the separator (with `right`'s
    /// pointer) from the parent. A leaf merge drops the separator — it was a
    /// copy — and splices the leaf chain; an internal merge pulls it down
    /// between the two halves.
    fn merge(
        &self,
        left: &mut NodeView<'_>,
        right: &mut NodeView<'_>,
        parent: &mut NodeView<'_>,
        separator_index: usize,
    ) -> Result<(), IndexError> {
        if left.is_leaf() {
            let base = left.key_count();
            for i in 0..right.key_count() {
                left.insert_at(base + i, &right.key_at(i), &right.value_at(i))?;
            }
            left.set_right(right.right());
        } else {
            let separator = parent.key_at(separator_index);
            let base = left.key_count();
            left.insert_key_child(base, &separator, right.child_at(0))?;
            for i in 0..right.key_count() {
                left.insert_key_child(base + 1 + i, &right.key_at(i), right.child_at(i + 1))?;
            }
        }

        // The right page is dead after this; reclaiming it is the pager's
        // concern.
        parent.delete_at(separator_index);
        Ok(())
    }

    // ===== Structure =====

    /// Number of levels from root to leaf, counting both ends. An empty
    /// tree has height 1.
    pub fn height(&self) -> Result<u32, IndexError> {
        let mut height = 1;
        let mut current = self.root;
        loop {
            let mut guard = self.pager.get_node(current)?;
            let node = NodeView::new(&mut guard[..], &*self.key_ser, &*self.val_ser);
            if node.is_leaf() {
                return Ok(height);
            }
            current = node.child_at(0);
            height += 1;
        }
    }

    // ===== Iteration =====

    /// Iterator over every pair in key order, starting at the smallest key.
    pub fn iter(&self) -> Result<TreeIterator, IndexError> {
        let mut current = self.root;
        loop {
            let mut guard = self.pager.get_node(current)?;
            let node = NodeView::new(&mut guard[..], &*self.key_ser, &*self.val_ser);
            if node.is_leaf() {
                break;
            }
            current = node.child_at(0);
        }
        Ok(TreeIterator::new(Arc::clone(&self.pager), current, 0))
    }

    /// Iterator starting at `key` if present, otherwise at the smallest key
    /// greater than `key`.
    pub fn iter_from(&self, key: &IndexKey) -> Result<TreeIterator, IndexError> {
        let (stack, _) = self.find_path(key)?;
        let leaf = stack.last().expect("descent always ends at a leaf");
        Ok(TreeIterator::new(
            Arc::clone(&self.pager),
            leaf.page_id,
            leaf.index,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::key::BigIntKeySerializer;
    use crate::index::pager::MemoryPager;
    use crate::index::value::{SlotPointer, SlotPointerValueSerializer};

    fn new_tree(degree: usize) -> BTree {
        let pager = Arc::new(MemoryPager::new(
            Arc::new(BigIntKeySerializer),
            Arc::new(SlotPointerValueSerializer),
        ));
        BTree::new(degree, pager).unwrap()
    }

    fn slot(i: i64) -> IndexValue {
        IndexValue::Slot(SlotPointer {
            page_id: i,
            slot_index: (i % 1000) as i16,
        })
    }

    #[test]
    fn test_find_on_empty_tree() {
        let tree = new_tree(3);
        assert_eq!(tree.find(&IndexKey::BigInt(42)).unwrap(), None);
        assert_eq!(tree.height().unwrap(), 1);
    }

    #[test]
    fn test_insert_splits_root_at_degree_keys() {
        let mut tree = new_tree(3);
        tree.insert(IndexKey::BigInt(1), slot(1)).unwrap();
        tree.insert(IndexKey::BigInt(5), slot(5)).unwrap();
        tree.insert(IndexKey::BigInt(3), slot(3)).unwrap();

        // Three inserts at degree 3 split the root leaf; the separator
        // promoted into the new root is the pivot key 3.
        assert_eq!(tree.height().unwrap(), 2);
        {
            let mut guard = tree.pager.get_node(tree.root_page_id()).unwrap();
            let root = NodeView::new(&mut guard[..], &*tree.key_ser, &*tree.val_ser);
            assert!(!root.is_leaf());
            assert_eq!(root.key_at(0), IndexKey::BigInt(3));
        }

        assert_eq!(tree.find(&IndexKey::BigInt(5)).unwrap(), Some(slot(5)));
        assert_eq!(tree.find(&IndexKey::BigInt(3)).unwrap(), Some(slot(3)));
        assert_eq!(tree.find(&IndexKey::BigInt(1)).unwrap(), Some(slot(1)));
        assert_eq!(tree.find(&IndexKey::BigInt(2)).unwrap(), None);
    }

    #[test]
    fn test_insert_duplicate_key_is_an_error() {
        let mut tree = new_tree(4);
        tree.insert(IndexKey::BigInt(7), slot(7)).unwrap();

        assert!(matches!(
            tree.insert(IndexKey::BigInt(7), slot(8)),
            Err(IndexError::DuplicateKey)
        ));
        // The stored value is untouched.
        assert_eq!(tree.find(&IndexKey::BigInt(7)).unwrap(), Some(slot(7)));
    }

    #[test]
    fn test_insert_or_replace_semantics() {
        let mut tree = new_tree(4);

        assert!(tree
            .insert_or_replace(IndexKey::BigInt(7), slot(7))
            .unwrap());
        assert!(!tree
            .insert_or_replace(IndexKey::BigInt(7), slot(70))
            .unwrap());
        assert_eq!(tree.find(&IndexKey::BigInt(7)).unwrap(), Some(slot(70)));
    }

    #[test]
    fn test_delete_returns_false_for_missing_key() {
        let mut tree = new_tree(4);
        tree.insert(IndexKey::BigInt(1), slot(1)).unwrap();

        assert!(!tree.delete(&IndexKey::BigInt(2)).unwrap());
        assert!(tree.delete(&IndexKey::BigInt(1)).unwrap());
        assert!(!tree.delete(&IndexKey::BigInt(1)).unwrap());
    }

    #[test]
    fn test_height_growth_by_degree() {
        // (degree, keys inserted in order, expected height)
        let cases = [(3, 9, 4), (4, 4, 2), (5, 5, 2)];
        for (degree, n, expected) in cases {
            let mut tree = new_tree(degree);
            for i in 1..=n {
                tree.insert(IndexKey::BigInt(i), slot(i)).unwrap();
            }
            assert_eq!(
                tree.height().unwrap(),
                expected,
                "degree {} with {} keys",
                degree,
                n
            );
        }
    }

    #[test]
    fn test_leaf_redistribution_borrows_from_right_sibling() {
        let mut tree = new_tree(4);
        for i in 1..=7 {
            tree.insert(IndexKey::BigInt(i), slot(i)).unwrap();
        }

        // Leaves are now [1,2] [3,4] [5,6,7]. Deleting 3 underflows the
        // middle leaf; its right sibling can spare a key.
        assert!(tree.delete(&IndexKey::BigInt(3)).unwrap());

        assert_eq!(tree.height().unwrap(), 2);
        for i in [1, 2, 4, 5, 6, 7] {
            assert_eq!(tree.find(&IndexKey::BigInt(i)).unwrap(), Some(slot(i)));
        }
        assert_eq!(tree.find(&IndexKey::BigInt(3)).unwrap(), None);
    }

    #[test]
    fn test_leaf_redistribution_borrows_from_left_sibling() {
        let mut tree = new_tree(4);
        for i in 1..=7 {
            tree.insert(IndexKey::BigInt(i), slot(i)).unwrap();
        }
        assert!(tree.delete(&IndexKey::BigInt(3)).unwrap());
        // Rebuild a heavy left sibling next to the rightmost leaf.
        tree.insert(IndexKey::BigInt(3), slot(3)).unwrap();

        // Now deleting 7 underflows the rightmost leaf, which has no right
        // sibling; the left one spares a key instead.
        assert!(tree.delete(&IndexKey::BigInt(7)).unwrap());

        for i in 1..=6 {
            assert_eq!(tree.find(&IndexKey::BigInt(i)).unwrap(), Some(slot(i)));
        }
        assert_eq!(tree.find(&IndexKey::BigInt(7)).unwrap(), None);
    }

    #[test]
    fn test_internal_redistribution_keeps_height() {
        let mut tree = new_tree(4);
        for i in 1..=10 {
            tree.insert(IndexKey::BigInt(i), slot(i)).unwrap();
        }
        assert_eq!(tree.height().unwrap(), 3);

        // Deleting 10 merges the two rightmost leaves and underflows their
        // parent, which borrows from its left sibling through the root.
        assert!(tree.delete(&IndexKey::BigInt(10)).unwrap());

        assert_eq!(tree.height().unwrap(), 3);
        for i in 1..=9 {
            assert_eq!(tree.find(&IndexKey::BigInt(i)).unwrap(), Some(slot(i)));
        }
    }

    #[test]
    fn test_root_collapses_when_internal_root_empties() {
        let mut tree = new_tree(4);
        for i in 1..=10 {
            tree.insert(IndexKey::BigInt(i), slot(i)).unwrap();
        }
        for key in [10, 9, 8] {
            assert!(tree.delete(&IndexKey::BigInt(key)).unwrap());
        }

        assert_eq!(tree.height().unwrap(), 2);
        for i in 1..=7 {
            assert_eq!(tree.find(&IndexKey::BigInt(i)).unwrap(), Some(slot(i)));
        }
    }

    #[test]
    fn test_delete_down_to_empty_tree() {
        let mut tree = new_tree(3);
        for i in 0..20 {
            tree.insert(IndexKey::BigInt(i), slot(i)).unwrap();
        }
        for i in 0..20 {
            assert!(tree.delete(&IndexKey::BigInt(i)).unwrap(), "delete {}", i);
        }

        assert_eq!(tree.height().unwrap(), 1);
        for i in 0..20 {
            assert_eq!(tree.find(&IndexKey::BigInt(i)).unwrap(), None);
        }
    }
}
