//! Error type for index operations.

use common::api::BpmError;
use std::fmt;

/// Errors surfaced by B+ tree operations.
///
/// A missing key is not an error: `find` returns `None` and `delete` returns
/// `false`. Internal inconsistencies panic instead of returning a variant;
/// they indicate a bug, not a caller mistake.
#[derive(Debug)]
pub enum IndexError {
    /// `insert` was called with a key that is already present.
    DuplicateKey,
    /// A serializer rejected its input. The tree is unchanged.
    Serialization(String),
    /// The underlying pager failed; the current operation was aborted and
    /// every pin released.
    Pager(BpmError),
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexError::DuplicateKey => write!(f, "key already exists"),
            IndexError::Serialization(msg) => write!(f, "serialization failed: {}", msg),
            IndexError::Pager(e) => write!(f, "pager failure: {}", e),
        }
    }
}

impl std::error::Error for IndexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IndexError::Pager(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BpmError> for IndexError {
    fn from(e: BpmError) -> Self {
        IndexError::Pager(e)
    }
}
