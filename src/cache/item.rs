//! Cache Item Module
//!
//! Defines the pending cache write: key, TTL, value, and declared
//! dependencies.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::cache::{build_key, codec, wildcard_key};
use crate::error::Result;

// == Storable Value ==
/// Payload stored under a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StorableValue {
    /// UTF-8 text
    Text(String),
    /// Raw bytes
    Bytes(Vec<u8>),
}

impl StorableValue {
    /// Borrows the payload as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            StorableValue::Text(s) => s.as_bytes(),
            StorableValue::Bytes(b) => b,
        }
    }

    /// Consumes the payload into bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            StorableValue::Text(s) => s.into_bytes(),
            StorableValue::Bytes(b) => b,
        }
    }
}

impl Default for StorableValue {
    fn default() -> Self {
        StorableValue::Text(String::new())
    }
}

impl From<&str> for StorableValue {
    fn from(value: &str) -> Self {
        StorableValue::Text(value.to_string())
    }
}

impl From<String> for StorableValue {
    fn from(value: String) -> Self {
        StorableValue::Text(value)
    }
}

impl From<Vec<u8>> for StorableValue {
    fn from(value: Vec<u8>) -> Self {
        StorableValue::Bytes(value)
    }
}

impl From<&[u8]> for StorableValue {
    fn from(value: &[u8]) -> Self {
        StorableValue::Bytes(value.to_vec())
    }
}

macro_rules! storable_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for StorableValue {
                fn from(value: $ty) -> Self {
                    StorableValue::Text(value.to_string())
                }
            }
        )*
    };
}

storable_from_integer!(i32, i64, u32, u64, usize);

// == Item ==
/// A cache entry waiting to be stored.
///
/// The key is fixed at construction. Dependencies are appended one at a
/// time; deleting this item's key later also deletes every dependency.
///
/// # Example
/// ```
/// use relevant_cache::cache::Item;
///
/// let item = Item::new(&[&"child", &10])
///     .value("payload")
///     .ttl(60)
///     .relevant_to(&[&"parent", &1]);
///
/// assert_eq!(item.key(), "child_10");
/// assert_eq!(item.relevant_keys(), vec!["parent_1".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Item {
    key: String,
    relevant: Vec<Item>,
    ttl: u64,
    value: StorableValue,
}

impl Item {
    // == Constructor ==
    /// Creates an item whose key is built from `parts`.
    pub fn new(parts: &[&dyn Display]) -> Self {
        Self {
            key: build_key(parts),
            ..Self::default()
        }
    }

    // == Builders ==
    /// Declares a dependency on the key built from `parts`.
    pub fn relevant_to(mut self, parts: &[&dyn Display]) -> Self {
        self.relevant.push(Item::new(parts));
        self
    }

    /// Declares a dependency on every stored key matching `parts` followed by
    /// the wildcard marker.
    pub fn relevant_to_wildcard(mut self, parts: &[&dyn Display]) -> Self {
        self.relevant.push(Item {
            key: wildcard_key(parts),
            ..Self::default()
        });
        self
    }

    /// Sets the TTL in seconds. `0` disables expiration.
    pub fn ttl(mut self, ttl: u64) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the stored value.
    pub fn value(mut self, value: impl Into<StorableValue>) -> Self {
        self.value = value.into();
        self
    }

    // == Accessors ==
    /// Returns the item's key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the keys of the declared dependencies, in declaration order.
    pub fn relevant_keys(&self) -> Vec<String> {
        self.relevant.iter().map(|r| r.key.clone()).collect()
    }

    /// Returns the TTL in seconds, `None` when the item never expires.
    pub fn ttl_secs(&self) -> Option<u64> {
        (self.ttl > 0).then_some(self.ttl)
    }

    /// Returns the stored value.
    pub fn stored_value(&self) -> &StorableValue {
        &self.value
    }

    // == Encode ==
    /// Produces the tagged record carrying the dependency list and the value.
    pub fn encode(&self) -> Result<Vec<u8>> {
        codec::encode(&self.relevant_keys(), self.value.as_bytes())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_defaults() {
        let item = Item::new(&[&"child", &1]);

        assert_eq!(item.key(), "child_1");
        assert!(item.relevant_keys().is_empty());
        assert!(item.ttl_secs().is_none());
        assert_eq!(item.stored_value().as_bytes(), b"");
    }

    #[test]
    fn test_relevant_keys_keep_declaration_order() {
        let item = Item::new(&[&"root"])
            .relevant_to(&[&"b"])
            .relevant_to(&[&"a", &2])
            .relevant_to_wildcard(&[&"list"]);

        assert_eq!(item.relevant_keys(), vec!["b", "a_2", "list_*"]);
    }

    #[test]
    fn test_ttl_zero_means_no_expiry() {
        assert!(Item::new(&[&"k"]).ttl(0).ttl_secs().is_none());
        assert_eq!(Item::new(&[&"k"]).ttl(5).ttl_secs(), Some(5));
    }

    #[test]
    fn test_storable_value_conversions() {
        assert_eq!(StorableValue::from("text").as_bytes(), b"text");
        assert_eq!(StorableValue::from(vec![1u8, 2]).into_bytes(), vec![1, 2]);
        assert_eq!(StorableValue::from(42i64).as_bytes(), b"42");
    }

    #[test]
    fn test_encode_carries_dependencies() {
        let item = Item::new(&[&"child"]).value("v").relevant_to(&[&"parent"]);
        let record = codec::decode(&item.encode().unwrap());

        assert_eq!(record.dependencies, Some(vec!["parent".to_string()]));
        assert_eq!(record.value, b"v");
    }
}
