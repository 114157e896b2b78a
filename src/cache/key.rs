//! Cache Key Module
//!
//! Canonical key construction and the uniform key argument accepted by
//! every backend operation.

use std::fmt::Display;

use crate::cache::{Item, KEY_DELIMITER, WILDCARD};
use crate::error::{CacheError, Result};

// == Key Construction ==
/// Builds a key by joining the textual form of each part with [`KEY_DELIMITER`].
///
/// The same ordered parts always produce the same key.
///
/// # Example
/// ```
/// use relevant_cache::cache::build_key;
///
/// assert_eq!(build_key(&[&"user", &42]), "user_42");
/// ```
pub fn build_key(parts: &[&dyn Display]) -> String {
    parts
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(KEY_DELIMITER)
}

/// Builds a wildcard key: the parts followed by a trailing wildcard marker.
pub fn wildcard_key(parts: &[&dyn Display]) -> String {
    let wildcard = WILDCARD;
    let mut all: Vec<&dyn Display> = parts.to_vec();
    all.push(&wildcard);
    build_key(&all)
}

/// Returns true when the key is a pattern rather than a literal key.
pub fn is_wildcard(key: &str) -> bool {
    key.contains(WILDCARD)
}

// == Cache Key Trait ==
/// A value usable as a key argument: a string, raw bytes, or an [`Item`].
pub trait CacheKey {
    /// Returns the key string, or `InvalidKeyType` if none can be derived.
    fn cache_key(&self) -> Result<String>;

    /// Dependency keys carried alongside the key. Empty for plain keys.
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }
}

impl CacheKey for str {
    fn cache_key(&self) -> Result<String> {
        Ok(self.to_string())
    }
}

impl CacheKey for String {
    fn cache_key(&self) -> Result<String> {
        Ok(self.clone())
    }
}

impl CacheKey for [u8] {
    fn cache_key(&self) -> Result<String> {
        std::str::from_utf8(self)
            .map(str::to_string)
            .map_err(|e| CacheError::InvalidKeyType(format!("byte key is not UTF-8: {}", e)))
    }
}

impl CacheKey for Vec<u8> {
    fn cache_key(&self) -> Result<String> {
        self.as_slice().cache_key()
    }
}

impl CacheKey for Item {
    fn cache_key(&self) -> Result<String> {
        Ok(self.key().to_string())
    }

    fn dependencies(&self) -> Vec<String> {
        self.relevant_keys()
    }
}

impl<T: CacheKey + ?Sized> CacheKey for &T {
    fn cache_key(&self) -> Result<String> {
        (**self).cache_key()
    }

    fn dependencies(&self) -> Vec<String> {
        (**self).dependencies()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_key_joins_parts() {
        assert_eq!(build_key(&[&"child", &10]), "child_10");
        assert_eq!(build_key(&[&"single"]), "single");
        assert_eq!(build_key(&[]), "");
    }

    #[test]
    fn test_build_key_is_deterministic() {
        let a = build_key(&[&"post", &7, &true]);
        let b = build_key(&[&"post", &7, &true]);
        assert_eq!(a, b);
        assert_eq!(a, "post_7_true");
    }

    #[test]
    fn test_wildcard_key() {
        let key = wildcard_key(&[&"asterisk"]);
        assert_eq!(key, "asterisk_*");
        assert!(is_wildcard(&key));
        assert!(!is_wildcard("asterisk_1"));
    }

    #[test]
    fn test_key_forms() {
        let item = Item::new(&[&"child", &1]);
        let keys: [&dyn CacheKey; 4] = [&"child_1", &item, &b"child_1".to_vec(), &String::from("child_1")];

        for key in keys {
            assert_eq!(key.cache_key().unwrap(), "child_1");
        }
    }

    #[test]
    fn test_invalid_byte_key() {
        let key = vec![0xff, 0xfe];
        let result = key.cache_key();
        assert!(matches!(result, Err(CacheError::InvalidKeyType(_))));
    }

    #[test]
    fn test_item_dependencies() {
        let item = Item::new(&[&"child"]).relevant_to(&[&"parent", &1]);
        let key: &dyn CacheKey = &item;
        assert_eq!(key.dependencies(), vec!["parent_1".to_string()]);
        assert!("plain".cache_key().is_ok());
        assert!(CacheKey::dependencies(&"plain").is_empty());
    }
}
