//! Values and value serializers.
//!
//! Leaf nodes store opaque payloads; the canonical payload is a
//! [`SlotPointer`] referencing a row in a heap page. Internal nodes store
//! child page ids directly and never go through a value serializer.

use crate::index::error::IndexError;

/// Reference into a heap page: the page and the slot within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotPointer {
    pub page_id: i64,
    pub slot_index: i16,
}

/// A value stored in a leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexValue {
    /// A heap row reference.
    Slot(SlotPointer),
    /// A fixed-width byte string payload.
    Text(String),
}

/// Fixed-width byte codec for leaf values, mirroring [`KeySerializer`].
///
/// [`KeySerializer`]: crate::index::key::KeySerializer
pub trait ValueSerializer: Send + Sync {
    /// Encodes the value into exactly `size()` bytes.
    fn serialize(&self, value: &IndexValue) -> Result<Vec<u8>, IndexError>;

    /// Decodes a value from the first `size()` bytes of `data`.
    ///
    /// # Panics
    /// Panics on malformed bytes.
    fn deserialize(&self, data: &[u8]) -> IndexValue;

    /// Byte length of every serialized value.
    fn size(&self) -> usize;
}

/// Serializer for `IndexValue::Slot`: 10 bytes, big-endian
/// (`page_id` then `slot_index`).
pub struct SlotPointerValueSerializer;

impl ValueSerializer for SlotPointerValueSerializer {
    fn serialize(&self, value: &IndexValue) -> Result<Vec<u8>, IndexError> {
        match value {
            IndexValue::Slot(slot) => {
                let mut buf = Vec::with_capacity(10);
                buf.extend_from_slice(&slot.page_id.to_be_bytes());
                buf.extend_from_slice(&slot.slot_index.to_be_bytes());
                Ok(buf)
            }
            other => Err(IndexError::Serialization(format!(
                "expected a Slot value, got {:?}",
                other
            ))),
        }
    }

    fn deserialize(&self, data: &[u8]) -> IndexValue {
        let page_id = i64::from_be_bytes(data[0..8].try_into().unwrap());
        let slot_index = i16::from_be_bytes(data[8..10].try_into().unwrap());
        IndexValue::Slot(SlotPointer {
            page_id,
            slot_index,
        })
    }

    fn size(&self) -> usize {
        10
    }
}

/// Serializer for `IndexValue::Text`: fixed length, NUL-padded.
pub struct TextValueSerializer {
    pub len: usize,
}

impl ValueSerializer for TextValueSerializer {
    fn serialize(&self, value: &IndexValue) -> Result<Vec<u8>, IndexError> {
        match value {
            IndexValue::Text(s) => {
                if s.len() > self.len {
                    return Err(IndexError::Serialization(format!(
                        "value {:?} is longer than the fixed width of {} bytes",
                        s, self.len
                    )));
                }
                let mut buf = vec![0u8; self.len];
                buf[..s.len()].copy_from_slice(s.as_bytes());
                Ok(buf)
            }
            other => Err(IndexError::Serialization(format!(
                "expected a Text value, got {:?}",
                other
            ))),
        }
    }

    fn deserialize(&self, data: &[u8]) -> IndexValue {
        let data = &data[..self.len];
        let end = data.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        let s = String::from_utf8(data[..end].to_vec()).expect("invalid UTF-8 in text value");
        IndexValue::Text(s)
    }

    fn size(&self) -> usize {
        self.len
    }
}
