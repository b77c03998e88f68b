//! Index metadata page.
//!
//! The root page id is the only tree-level state that lives outside the node
//! pages. Callers that want a self-describing index file serialize this
//! struct into a dedicated page and reopen the tree from it.

use common::api::{PageId, INVALID_PAGE_ID};

/// Durable description of one B+ tree.
///
/// Memory layout:
/// - Bytes 0-7: root_page_id (u64, big-endian)
/// - Bytes 8-11: degree (u32, big-endian)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexMetadata {
    /// The page id of the root node of the B+ tree.
    pub root_page_id: PageId,
    /// Maximum occupancy configured at tree construction.
    pub degree: u32,
}

impl IndexMetadata {
    /// Serialized byte length.
    pub const SERIALIZED_SIZE: usize = 12;

    pub fn new(degree: u32) -> Self {
        Self {
            root_page_id: INVALID_PAGE_ID,
            degree,
        }
    }

    /// Serializes the metadata for storage in a page.
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::SERIALIZED_SIZE);
        bytes.extend_from_slice(&self.root_page_id.to_be_bytes());
        bytes.extend_from_slice(&self.degree.to_be_bytes());
        bytes
    }

    /// Deserializes metadata from a page prefix.
    ///
    /// # Panics
    /// Panics if the buffer is shorter than `SERIALIZED_SIZE`.
    pub fn deserialize(bytes: &[u8]) -> Self {
        assert!(
            bytes.len() >= Self::SERIALIZED_SIZE,
            "invalid metadata bytes: too short"
        );
        let root_page_id = u64::from_be_bytes(bytes[0..8].try_into().unwrap());
        let degree = u32::from_be_bytes(bytes[8..12].try_into().unwrap());
        Self {
            root_page_id,
            degree,
        }
    }
}
