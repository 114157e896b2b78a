//! Relevant Cache - dependency-aware cache invalidation
//!
//! Items declare which other keys depend on them. Deleting a key deletes
//! everything reachable through those declarations, including keys matched
//! by `*` wildcard dependencies. Works over an in-process map or Redis.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;

pub use api::AppState;
pub use cache::{CacheBackend, CacheKey, CacheOptions, Item, MemoryCache, RedisCache, SetEntry};
pub use config::Config;
pub use error::{CacheError, Result};
