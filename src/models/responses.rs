//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

/// Response body for the GET operation (GET /get/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: String,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Response body for the SET operation (PUT /set)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
        }
    }
}

/// Response body for DELETE /del/:key and DELETE /unlink/:key
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key whose closure was deleted
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' and its relevant keys deleted successfully", key),
            key,
        }
    }
}

/// Response body for GET /relevant/:key
#[derive(Debug, Clone, Serialize)]
pub struct RelevantResponse {
    /// The root key
    pub key: String,
    /// Keys a delete of `key` would remove, root first
    pub relevant: Vec<String>,
}

/// Response body for POST /incr/:key
#[derive(Debug, Clone, Serialize)]
pub struct IncrementResponse {
    pub key: String,
    pub value: i64,
}

/// Response body for POST /mget
#[derive(Debug, Clone, Serialize)]
pub struct MGetResponse {
    /// Values aligned with the requested keys, null when absent
    pub values: Vec<Option<String>>,
}

/// Response body for GET /hget/:key/:field
#[derive(Debug, Clone, Serialize)]
pub struct HGetResponse {
    pub key: String,
    pub field: String,
    pub value: String,
}

/// Response body for GET /hlen/:key
#[derive(Debug, Clone, Serialize)]
pub struct HLenResponse {
    pub key: String,
    pub len: usize,
}

/// Response body for GET /dump
#[derive(Debug, Clone, Serialize)]
pub struct DumpResponse {
    /// Number of stored keys
    pub count: usize,
    /// Stored keys, sorted
    pub keys: Vec<String>,
    /// Snapshot time in ISO 8601 format
    pub timestamp: String,
}

impl DumpResponse {
    pub fn new(keys: Vec<String>) -> Self {
        Self {
            count: keys.len(),
            keys,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Generic acknowledgement (DELETE /purge, PUT /hset)
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
