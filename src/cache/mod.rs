//! Cache Module
//!
//! Dependency-aware caching: items declare which other keys depend on them,
//! and deleting a key removes its whole dependency closure.

mod backend;
mod codec;
mod entry;
mod item;
mod key;
mod memory;
mod options;
mod pattern;
mod redis_cache;
mod resolver;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use backend::{CacheBackend, SetEntry};
pub use codec::{decode, decode_strict, encode, Record};
pub use entry::{Slot, StoredEntry};
pub use item::{Item, StorableValue};
pub use key::{build_key, is_wildcard, wildcard_key, CacheKey};
pub use memory::MemoryCache;
pub use options::{CacheOptions, DebugSink};
pub use redis_cache::RedisCache;
pub use resolver::{resolve, KeySource};

// == Public Constants ==
/// Joins the parts of a key built by [`build_key`].
pub const KEY_DELIMITER: &str = "_";

/// Joins dependency keys inside a tagged record.
pub const RELEVANT_DELIMITER: &str = "|";

/// First byte of a tagged record.
pub const SIGNATURE: u8 = b'$';

/// Second byte of a tagged record.
pub const RESERVED: u8 = 0x00;

/// Marks a dependency key as a pattern.
pub const WILDCARD: char = '*';

/// Signature, reserved byte and the big-endian length field.
pub const HEADER_LEN: usize = 4;

/// URL scheme that selects a TLS connection for [`RedisCache`].
pub const TLS_SCHEME: &str = "tls";
