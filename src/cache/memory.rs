//! In-process Backend Module
//!
//! A mutex-guarded map with lazy TTL expiry. Expired entries are dropped
//! when they are next touched, either directly or by a wildcard scan.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use crate::cache::backend::{collect_closures, hash_field_blob};
use crate::cache::pattern::to_regex;
use crate::cache::{
    decode, resolve, CacheBackend, CacheKey, CacheOptions, Item, KeySource, SetEntry, Slot,
    StorableValue, StoredEntry,
};
use crate::error::{CacheError, Result};

// == Memory Cache ==
/// In-process backend.
#[derive(Debug, Default)]
pub struct MemoryCache {
    /// Key to stored entry
    entries: Mutex<HashMap<String, StoredEntry>>,
    options: CacheOptions,
}

impl MemoryCache {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CacheOptions) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            options,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, StoredEntry>>> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Internal("cache lock poisoned".to_string()))
    }

    /// Number of stored keys, including ones expired but not yet evicted.
    pub fn len(&self) -> usize {
        self.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remove_all(&self, keys: &[String]) -> Result<()> {
        if keys.is_empty() {
            debug!("delete set is empty, skipped");
            return Ok(());
        }
        self.options
            .debug_sink
            .line(format_args!("[DEL] delete relevant caches {:?}", keys));

        let mut entries = self.lock()?;
        for key in keys {
            entries.remove(key);
        }
        debug!(count = keys.len(), "deleted closure");
        Ok(())
    }
}

/// Returns the live entry for `key`, evicting it first if it has expired.
fn live_entry<'a>(
    entries: &'a mut HashMap<String, StoredEntry>,
    key: &str,
) -> Option<&'a mut StoredEntry> {
    if entries.get(key).is_some_and(StoredEntry::is_expired) {
        entries.remove(key);
        return None;
    }
    entries.get_mut(key)
}

fn scalar<'a>(entry: &'a StoredEntry, key: &str) -> Result<&'a [u8]> {
    match &entry.slot {
        Slot::Value(data) => Ok(data),
        Slot::Hash(_) => Err(CacheError::TypeMismatch(format!("{} holds a hash", key))),
    }
}

// == Key Source ==
impl KeySource for MemoryCache {
    fn fetch_blobs(&self, key: &str) -> Result<Option<Vec<Vec<u8>>>> {
        let mut entries = self.lock()?;
        Ok(live_entry(&mut entries, key).map(|e| e.blobs()))
    }

    fn list_matching(&self, pattern: &str) -> Result<Vec<String>> {
        let re = to_regex(pattern)?;
        let mut entries = self.lock()?;

        entries.retain(|k, e| !(re.is_match(k) && e.is_expired()));
        let mut matches: Vec<String> = entries.keys().filter(|k| re.is_match(k)).cloned().collect();
        matches.sort();

        self.options
            .debug_sink
            .line(format_args!("[REL-WILDCARD] {} is relevant to {:?}", pattern, matches));
        Ok(matches)
    }
}

// == Cache Backend ==
impl CacheBackend for MemoryCache {
    fn get(&self, key: &dyn CacheKey) -> Result<Vec<u8>> {
        let key = key.cache_key()?;
        let mut entries = self.lock()?;
        let entry = live_entry(&mut entries, &key).ok_or_else(|| CacheError::NotFound(key.clone()))?;
        Ok(decode(scalar(entry, &key)?).value)
    }

    fn set(&self, entry: SetEntry) -> Result<()> {
        entry.validate()?;
        let ttl = entry.effective_ttl();
        debug!(key = %entry.key, ttl = ?ttl, "set");

        let stored = StoredEntry::value(entry.value.into_bytes(), ttl)?;
        self.lock()?.insert(entry.key, stored);
        Ok(())
    }

    fn set_item(&self, item: &Item) -> Result<()> {
        self.options.debug_sink.line(format_args!(
            "[SET] cache key {} is relevant to {:?}",
            item.key(),
            item.relevant_keys()
        ));
        self.set(SetEntry::from_item(item)?)
    }

    fn del(&self, keys: &[&dyn CacheKey]) -> Result<()> {
        let closure = collect_closures(keys, |k| self.resolve(&k))?;
        self.remove_all(&closure)
    }

    fn unlink(&self, keys: &[&dyn CacheKey]) -> Result<()> {
        self.del(keys)
    }

    fn increment(&self, key: &dyn CacheKey) -> Result<i64> {
        let key = key.cache_key()?;
        let mut entries = self.lock()?;

        let Some(entry) = live_entry(&mut entries, &key) else {
            entries.insert(key, StoredEntry::value(b"1".to_vec(), None)?);
            return Ok(1);
        };

        let text = std::str::from_utf8(scalar(entry, &key)?)
            .map_err(|_| CacheError::TypeMismatch(format!("{} is not a decimal counter", key)))?;
        let next = text
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|n| n.checked_add(1))
            .ok_or_else(|| CacheError::TypeMismatch(format!("{} is not a decimal counter", key)))?;

        entry.slot = Slot::Value(next.to_string().into_bytes());
        Ok(next)
    }

    fn mget(&self, keys: &[&dyn CacheKey]) -> Result<Vec<Option<Vec<u8>>>> {
        let keys = keys
            .iter()
            .map(|k| k.cache_key())
            .collect::<Result<Vec<_>>>()?;
        let mut entries = self.lock()?;

        Ok(keys
            .iter()
            .map(|key| match live_entry(&mut entries, key).map(|e| &e.slot) {
                Some(Slot::Value(data)) => Some(decode(data).value),
                _ => None,
            })
            .collect())
    }

    fn hset(&self, key: &dyn CacheKey, field: &str, value: StorableValue) -> Result<()> {
        let blob = hash_field_blob(key, value)?;
        let key = key.cache_key()?;
        let mut entries = self.lock()?;

        if live_entry(&mut entries, &key).is_none() {
            entries.insert(key.clone(), StoredEntry::hash());
        }
        match entries.get_mut(&key).map(|e| &mut e.slot) {
            Some(Slot::Hash(fields)) => {
                fields.insert(field.to_string(), blob);
                Ok(())
            }
            _ => Err(CacheError::TypeMismatch(format!("{} holds a scalar value", key))),
        }
    }

    fn hlen(&self, key: &dyn CacheKey) -> Result<usize> {
        let key = key.cache_key()?;
        let mut entries = self.lock()?;

        match live_entry(&mut entries, &key).map(|e| &e.slot) {
            None => Ok(0),
            Some(Slot::Hash(fields)) => Ok(fields.len()),
            Some(Slot::Value(_)) => Err(CacheError::TypeMismatch(format!("{} holds a scalar value", key))),
        }
    }

    fn hget(&self, key: &dyn CacheKey, field: &str) -> Result<Vec<u8>> {
        let key = key.cache_key()?;
        let mut entries = self.lock()?;

        match live_entry(&mut entries, &key).map(|e| &e.slot) {
            Some(Slot::Hash(fields)) => fields
                .get(field)
                .map(|blob| decode(blob).value)
                .ok_or_else(|| CacheError::NotFound(format!("{}.{}", key, field))),
            Some(Slot::Value(_)) => Err(CacheError::TypeMismatch(format!("{} holds a scalar value", key))),
            None => Err(CacheError::NotFound(key)),
        }
    }

    fn purge(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }

    fn dump(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.lock()?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn resolve(&self, key: &dyn CacheKey) -> Result<Vec<String>> {
        let key = key.cache_key()?;
        let keys = resolve(self, &key)?;
        self.options
            .debug_sink
            .line(format_args!("[REL] {} is relevant to {:?}", key, keys));
        Ok(keys)
    }
}
