//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::cache::{Item, SetEntry};

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: The value to store
/// - `ttl`: Optional TTL in seconds (no expiry if not specified)
/// - `relevant`: Keys (or `*` patterns) deleted together with this key
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: String,
    /// Optional TTL in seconds
    #[serde(default)]
    pub ttl: Option<u64>,
    /// Dependency keys
    #[serde(default)]
    pub relevant: Vec<String>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.relevant.iter().any(String::is_empty) {
            return Some("Relevant keys cannot be empty".to_string());
        }
        None
    }

    /// True when the write must carry a dependency list.
    pub fn has_dependencies(&self) -> bool {
        !self.relevant.is_empty()
    }

    /// Plain write, stored untagged.
    pub fn to_entry(&self) -> SetEntry {
        let entry = SetEntry::new(self.key.clone(), self.value.clone());
        match self.ttl {
            Some(ttl) => entry.with_ttl(ttl),
            None => entry,
        }
    }

    /// Tagged write carrying `relevant`.
    pub fn to_item(&self) -> Item {
        to_item(&self.key, &self.relevant)
            .value(self.value.clone())
            .ttl(self.ttl.unwrap_or(0))
    }
}

/// Request body for PUT /hset
#[derive(Debug, Clone, Deserialize)]
pub struct HSetRequest {
    pub key: String,
    pub field: String,
    pub value: String,
    #[serde(default)]
    pub relevant: Vec<String>,
}

impl HSetRequest {
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.field.is_empty() {
            return Some("Field cannot be empty".to_string());
        }
        None
    }

    /// Hash key as an item so its dependencies travel with each field.
    pub fn to_item(&self) -> Item {
        to_item(&self.key, &self.relevant)
    }
}

/// Request body for POST /mget
#[derive(Debug, Clone, Deserialize)]
pub struct MGetRequest {
    pub keys: Vec<String>,
}

fn to_item(key: &str, relevant: &[String]) -> Item {
    relevant
        .iter()
        .fold(Item::new(&[&key]), |item, dep| item.relevant_to(&[dep]))
}
