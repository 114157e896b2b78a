//! Backend contract shared by the in-process and Redis stores.

use crate::cache::entry::expiry_from_ttl;
use crate::cache::{CacheKey, Item, StorableValue};
use crate::error::{CacheError, Result};

// == Set Entry ==
/// A plain write: key, value, and optional TTL in seconds.
#[derive(Debug, Clone)]
pub struct SetEntry {
    pub key: String,
    pub value: StorableValue,
    pub ttl: Option<u64>,
}

impl SetEntry {
    pub fn new(key: impl Into<String>, value: impl Into<StorableValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            ttl: None,
        }
    }

    pub fn with_ttl(mut self, ttl: u64) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// TTL that actually expires, `None` for absent or zero.
    pub fn effective_ttl(&self) -> Option<u64> {
        self.ttl.filter(|t| *t > 0)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.key.is_empty() {
            return Err(CacheError::InsufficientArguments(
                "set requires a non-empty key".to_string(),
            ));
        }
        if let Some(ttl) = self.effective_ttl() {
            expiry_from_ttl(ttl)?;
        }
        Ok(())
    }

    /// Builds the tagged write for an item.
    pub fn from_item(item: &Item) -> Result<Self> {
        Ok(Self {
            key: item.key().to_string(),
            value: StorableValue::Bytes(item.encode()?),
            ttl: item.ttl_secs(),
        })
    }
}

// == Cache Backend ==
/// Operations every storage backend provides.
///
/// Key arguments accept strings, bytes, or an [`Item`]; only the key is used
/// except by [`CacheBackend::hset`], which also stores the item's
/// dependencies.
pub trait CacheBackend: Send + Sync {
    /// Returns the decoded value. `NotFound` when absent or expired.
    fn get(&self, key: &dyn CacheKey) -> Result<Vec<u8>>;

    /// Stores the value as-is, overwriting any previous record.
    fn set(&self, entry: SetEntry) -> Result<()>;

    /// Stores an item as a tagged record carrying its dependencies.
    fn set_item(&self, item: &Item) -> Result<()> {
        self.set(SetEntry::from_item(item)?)
    }

    /// Deletes the closure of every key, waiting for the store to confirm.
    fn del(&self, keys: &[&dyn CacheKey]) -> Result<()>;

    /// Deletes the closure of every key, letting the store reclaim memory
    /// asynchronously where it can.
    fn unlink(&self, keys: &[&dyn CacheKey]) -> Result<()>;

    /// Adds one to a decimal counter, creating it at 1. Returns the new value.
    fn increment(&self, key: &dyn CacheKey) -> Result<i64>;

    /// Decoded values aligned with `keys`; absent keys yield `None`.
    fn mget(&self, keys: &[&dyn CacheKey]) -> Result<Vec<Option<Vec<u8>>>>;

    /// Stores `value` under `field` of the hash at `key`.
    fn hset(&self, key: &dyn CacheKey, field: &str, value: StorableValue) -> Result<()>;

    /// Number of fields in the hash at `key`, 0 when absent.
    fn hlen(&self, key: &dyn CacheKey) -> Result<usize>;

    /// Decoded value of `field` in the hash at `key`.
    fn hget(&self, key: &dyn CacheKey, field: &str) -> Result<Vec<u8>>;

    /// Removes every key.
    fn purge(&self) -> Result<()>;

    /// Releases resources. Calling it again is a no-op.
    fn close(&self) -> Result<()>;

    /// Sorted list of stored keys.
    fn dump(&self) -> Result<Vec<String>>;

    /// The keys a delete of `key` would remove.
    fn resolve(&self, key: &dyn CacheKey) -> Result<Vec<String>>;
}

/// Resolves the closure of every key and concatenates the results.
pub(crate) fn collect_closures<F>(keys: &[&dyn CacheKey], mut resolve_one: F) -> Result<Vec<String>>
where
    F: FnMut(&str) -> Result<Vec<String>>,
{
    let mut all = Vec::new();
    for key in keys {
        let key = key.cache_key()?;
        all.extend(resolve_one(&key)?);
    }
    Ok(all)
}

/// Stored form of a hash field: tagged when the key carries dependencies.
pub(crate) fn hash_field_blob(key: &dyn CacheKey, value: StorableValue) -> Result<Vec<u8>> {
    let deps = key.dependencies();
    if deps.is_empty() {
        Ok(value.into_bytes())
    } else {
        crate::cache::encode(&deps, value.as_bytes())
    }
}
