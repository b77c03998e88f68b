//! B+ tree index.
//!
//! An ordered key-value mapping over fixed-size pages:
//! - point lookups, inserts, insert-or-replace and deletes with
//!   rebalancing (redistribute or merge on underflow),
//! - range scans over the forward-linked leaf chain,
//! - a pluggable [`Pager`] so the same tree runs in memory for tests and
//!   over a buffer pool for persistence,
//! - fixed-width key and value serializers that make persisted nodes
//!   byte-deterministic.

pub mod bptree;
pub mod error;
pub mod iterator;
pub mod key;
pub mod metadata;
pub mod node;
pub mod pager;
pub mod value;

// Re-export main types
pub use bptree::BTree;
pub use error::IndexError;
pub use iterator::TreeIterator;
pub use key::{BigIntKeySerializer, IndexKey, KeySerializer, TextKeySerializer};
pub use metadata::IndexMetadata;
pub use pager::{BufferPoolPager, MemoryPager, Pager};
pub use value::{
    IndexValue, SlotPointer, SlotPointerValueSerializer, TextValueSerializer, ValueSerializer,
};
