//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check codec and closure properties.

use proptest::prelude::*;

use crate::cache::{
    decode, encode, CacheBackend, CacheKey, Item, MemoryCache, SetEntry, RESERVED, SIGNATURE,
};
use crate::error::CacheError;

// == Strategies ==
/// Generates literal cache keys (no wildcard, no record delimiter)
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,32}".prop_map(|s| s)
}

fn value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..256)
}

/// Blobs that cannot carry the tagged header
fn untagged_strategy() -> impl Strategy<Value = Vec<u8>> {
    value_strategy().prop_filter("must not start with the signature pair", |b| {
        !(b.len() >= 2 && b[0] == SIGNATURE && b[1] == RESERVED)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Encoding then decoding returns the same dependency list and value.
    #[test]
    fn prop_codec_roundtrip(
        deps in prop::collection::vec(key_strategy(), 0..8),
        value in value_strategy()
    ) {
        let record = decode(&encode(&deps, &value).unwrap());
        prop_assert_eq!(record.dependencies, Some(deps));
        prop_assert_eq!(record.value, value);
    }

    // Foreign blobs decode to no dependencies and the blob itself.
    #[test]
    fn prop_untagged_compatibility(blob in untagged_strategy()) {
        let record = decode(&blob);
        prop_assert!(record.dependencies.is_none());
        prop_assert_eq!(record.value, blob);
    }

    // Decoding arbitrary bytes never panics and never loses the tail.
    #[test]
    fn prop_decode_is_total(blob in value_strategy()) {
        let record = decode(&blob);
        prop_assert!(record.value.len() <= blob.len());
        prop_assert!(blob.ends_with(&record.value));
    }

    // Deleting the head of a chain removes every link; deleting the tail
    // leaves the rest in place.
    #[test]
    fn prop_chain_deletion(len in 2usize..8) {
        let keys: Vec<String> = (0..len).map(|i| format!("node_{}", i)).collect();
        let cache = MemoryCache::new();
        for (i, key) in keys.iter().enumerate() {
            let mut item = Item::new(&[key]).value(i);
            if let Some(next) = keys.get(i + 1) {
                item = item.relevant_to(&[next]);
            }
            cache.set_item(&item).unwrap();
        }

        let tail: &dyn CacheKey = &keys[len - 1];
        cache.del(&[tail]).unwrap();
        for key in &keys[..len - 1] {
            prop_assert!(cache.get(key).is_ok());
        }

        let head: &dyn CacheKey = &keys[0];
        cache.del(&[head]).unwrap();
        for key in &keys {
            prop_assert!(matches!(cache.get(key), Err(CacheError::NotFound(_))));
        }
    }

    // An untagged value is returned unchanged by Get.
    #[test]
    fn prop_set_get_roundtrip(key in key_strategy(), value in untagged_strategy()) {
        let cache = MemoryCache::new();
        cache.set(SetEntry::new(key.clone(), value.clone())).unwrap();
        prop_assert_eq!(cache.get(&key).unwrap(), value);
    }
}
