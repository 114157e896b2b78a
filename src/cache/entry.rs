//! Cache Entry Module
//!
//! Defines the in-process stored entry with lazy TTL support.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::error::{CacheError, Result};

// == Slot ==
/// What a key holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// A single blob
    Value(Vec<u8>),
    /// Field to blob, iterated in field order
    Hash(BTreeMap<String, Vec<u8>>),
}

// == Stored Entry ==
/// A stored blob (or hash of blobs) with its expiration instant.
#[derive(Debug, Clone)]
pub struct StoredEntry {
    /// The stored data
    pub slot: Slot,
    /// Expiration instant, None = no expiration
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredEntry {
    // == Constructors ==
    /// Creates a scalar entry with optional TTL in seconds.
    ///
    /// Fails with `InsufficientArguments` when the expiry instant cannot be
    /// represented.
    pub fn value(data: Vec<u8>, ttl_seconds: Option<u64>) -> Result<Self> {
        Ok(Self {
            slot: Slot::Value(data),
            expires_at: ttl_seconds.map(expiry_from_ttl).transpose()?,
        })
    }

    /// Creates an empty hash entry that never expires.
    pub fn hash() -> Self {
        Self {
            slot: Slot::Hash(BTreeMap::new()),
            expires_at: None,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches its expiration
    /// instant.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => Utc::now() >= expires,
            None => false,
        }
    }

    /// Every blob held by the entry, in field order for hashes.
    pub fn blobs(&self) -> Vec<Vec<u8>> {
        match &self.slot {
            Slot::Value(data) => vec![data.clone()],
            Slot::Hash(fields) => fields.values().cloned().collect(),
        }
    }
}

/// Expiry instant `ttl` seconds from now.
pub(crate) fn expiry_from_ttl(ttl: u64) -> Result<DateTime<Utc>> {
    i64::try_from(ttl)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|delta| Utc::now().checked_add_signed(delta))
        .ok_or_else(|| CacheError::InsufficientArguments(format!("ttl of {} seconds is out of range", ttl)))
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_entry_creation_no_ttl() {
        let entry = StoredEntry::value(b"test_value".to_vec(), None).unwrap();

        assert_eq!(entry.slot, Slot::Value(b"test_value".to_vec()));
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_expiration() {
        let entry = StoredEntry::value(b"test_value".to_vec(), Some(1)).unwrap();

        assert!(!entry.is_expired());

        sleep(std::time::Duration::from_millis(1100));

        assert!(entry.is_expired());
    }

    #[test]
    fn test_out_of_range_ttl() {
        for ttl in [u64::MAX, u64::MAX / 2, 10_000_000_000_000] {
            let result = StoredEntry::value(b"v".to_vec(), Some(ttl));
            assert!(matches!(result, Err(CacheError::InsufficientArguments(_))), "ttl {}", ttl);
        }
        assert!(StoredEntry::value(b"v".to_vec(), Some(86_400 * 365)).is_ok());
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = StoredEntry {
            slot: Slot::Value(b"test".to_vec()),
            expires_at: Some(Utc::now()),
        };

        assert!(entry.is_expired(), "Entry should be expired at boundary");
    }

    #[test]
    fn test_hash_blobs_in_field_order() {
        let mut entry = StoredEntry::hash();
        if let Slot::Hash(fields) = &mut entry.slot {
            fields.insert("b".to_string(), b"2".to_vec());
            fields.insert("a".to_string(), b"1".to_vec());
        }

        assert_eq!(entry.blobs(), vec![b"1".to_vec(), b"2".to_vec()]);
    }
}
