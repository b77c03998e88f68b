//! Key abstraction for B+ tree indexes.
//!
//! Keys are opaque to the tree apart from their total order; the serializer
//! registered on the pager fixes their on-page width.

use crate::index::error::IndexError;
use std::cmp::Ordering;

/// A key value that can be stored in a B+ tree index.
///
/// All keys of one tree are the same variant; the tree's key serializer
/// decides which.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexKey {
    /// A 64-bit signed integer, compared numerically.
    BigInt(i64),
    /// A byte string, compared lexicographically.
    Text(String),
}

impl IndexKey {
    /// Compares this key with another key.
    ///
    /// # Panics
    /// Panics if comparing keys of different types.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (IndexKey::BigInt(a), IndexKey::BigInt(b)) => a.cmp(b),
            (IndexKey::Text(a), IndexKey::Text(b)) => a.cmp(b),
            _ => panic!("cannot compare keys of different types"),
        }
    }
}

impl PartialOrd for IndexKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

impl Ord for IndexKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

/// Fixed-width byte codec binding a key type to a tree.
///
/// Every serialized key has exactly `size()` bytes. That is what makes slot
/// arithmetic, in-place shifting and binary search over the raw page
/// possible.
pub trait KeySerializer: Send + Sync {
    /// Encodes the key into exactly `size()` bytes, or fails without the
    /// tree having been touched (e.g. an oversized string).
    fn serialize(&self, key: &IndexKey) -> Result<Vec<u8>, IndexError>;

    /// Decodes a key from the first `size()` bytes of `data`.
    ///
    /// # Panics
    /// Panics on malformed bytes; a page that does not round-trip is a bug.
    fn deserialize(&self, data: &[u8]) -> IndexKey;

    /// Byte length of every serialized key.
    fn size(&self) -> usize;
}

/// Serializer for `IndexKey::BigInt`: 8 bytes, big-endian.
pub struct BigIntKeySerializer;

impl KeySerializer for BigIntKeySerializer {
    fn serialize(&self, key: &IndexKey) -> Result<Vec<u8>, IndexError> {
        match key {
            IndexKey::BigInt(v) => Ok(v.to_be_bytes().to_vec()),
            other => Err(IndexError::Serialization(format!(
                "expected a BigInt key, got {:?}",
                other
            ))),
        }
    }

    fn deserialize(&self, data: &[u8]) -> IndexKey {
        IndexKey::BigInt(i64::from_be_bytes(data[0..8].try_into().unwrap()))
    }

    fn size(&self) -> usize {
        8
    }
}

/// Serializer for `IndexKey::Text`: fixed length, NUL-padded.
///
/// Padding with zero bytes preserves lexicographic order for prefixes, so
/// comparing deserialized keys agrees with comparing the raw slots.
pub struct TextKeySerializer {
    pub len: usize,
}

impl KeySerializer for TextKeySerializer {
    fn serialize(&self, key: &IndexKey) -> Result<Vec<u8>, IndexError> {
        match key {
            IndexKey::Text(s) => {
                if s.len() > self.len {
                    return Err(IndexError::Serialization(format!(
                        "key {:?} is longer than the fixed width of {} bytes",
                        s, self.len
                    )));
                }
                let mut buf = vec![0u8; self.len];
                buf[..s.len()].copy_from_slice(s.as_bytes());
                Ok(buf)
            }
            other => Err(IndexError::Serialization(format!(
                "expected a Text key, got {:?}",
                other
            ))),
        }
    }

    fn deserialize(&self, data: &[u8]) -> IndexKey {
        let data = &data[..self.len];
        let end = data.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        let s = String::from_utf8(data[..end].to_vec()).expect("invalid UTF-8 in text key");
        IndexKey::Text(s)
    }

    fn size(&self) -> usize {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bigint_key_serialization() {
        let serializer = BigIntKeySerializer;
        let key = IndexKey::BigInt(-42);

        let bytes = serializer.serialize(&key).unwrap();
        assert_eq!(bytes.len(), serializer.size());
        assert_eq!(serializer.deserialize(&bytes), key);
    }

    #[test]
    fn test_text_key_serialization_pads_and_trims() {
        let serializer = TextKeySerializer { len: 8 };
        let key = IndexKey::Text("abc".to_string());

        let bytes = serializer.serialize(&key).unwrap();
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[..3], b"abc");
        assert_eq!(&bytes[3..], &[0u8; 5]);
        assert_eq!(serializer.deserialize(&bytes), key);
    }

    #[test]
    fn test_text_key_rejects_oversized_input() {
        let serializer = TextKeySerializer { len: 4 };
        let key = IndexKey::Text("too long".to_string());

        assert!(matches!(
            serializer.serialize(&key),
            Err(IndexError::Serialization(_))
        ));
    }

    #[test]
    fn test_bigint_key_comparison() {
        let a = IndexKey::BigInt(10);
        let b = IndexKey::BigInt(20);

        assert_eq!(a.compare(&b), Ordering::Less);
        assert_eq!(b.compare(&a), Ordering::Greater);
        assert_eq!(a.compare(&IndexKey::BigInt(10)), Ordering::Equal);
    }

    #[test]
    fn test_text_key_comparison_is_lexicographic() {
        let apple = IndexKey::Text("apple".to_string());
        let banana = IndexKey::Text("banana".to_string());

        assert_eq!(apple.compare(&banana), Ordering::Less);
        assert_eq!(banana.compare(&apple), Ordering::Greater);
    }

    #[test]
    fn test_padded_order_matches_key_order() {
        let serializer = TextKeySerializer { len: 6 };
        let short = serializer
            .serialize(&IndexKey::Text("ab".to_string()))
            .unwrap();
        let long = serializer
            .serialize(&IndexKey::Text("abc".to_string()))
            .unwrap();

        // NUL padding sorts before every other byte, so prefix order holds
        // on the raw slots too.
        assert!(short < long);
    }
}
