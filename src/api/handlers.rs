//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint. Backend calls are
//! blocking, so each one runs on tokio's blocking pool.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::cache::{CacheBackend, CacheKey, MemoryCache};
use crate::error::{CacheError, Result};
use crate::models::{
    DeleteResponse, DumpResponse, GetResponse, HGetResponse, HLenResponse, HSetRequest,
    HealthResponse, IncrementResponse, MGetRequest, MGetResponse, MessageResponse,
    RelevantResponse, SetRequest, SetResponse,
};

/// Application state shared across all handlers.
///
/// Holds the backend behind an `Arc<dyn CacheBackend>` so the memory and
/// Redis stores are interchangeable.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache backend
    pub cache: Arc<dyn CacheBackend>,
}

impl AppState {
    /// Creates a new AppState over the given backend.
    pub fn new(cache: impl CacheBackend + 'static) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Creates a new AppState over a fresh in-process backend.
    pub fn in_memory() -> Self {
        Self::new(MemoryCache::new())
    }

    /// Runs a backend call on the blocking pool.
    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn CacheBackend) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let cache = Arc::clone(&self.cache);
        tokio::task::spawn_blocking(move || f(cache.as_ref()))
            .await
            .map_err(|e| CacheError::Internal(format!("blocking task failed: {}", e)))?
    }
}

fn text(bytes: Vec<u8>) -> String {
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Handler for PUT /set
///
/// Stores a value, tagged with its relevant keys when any are given.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InsufficientArguments(error_msg));
    }

    let key = req.key.clone();
    state
        .run(move |cache| {
            if req.has_dependencies() {
                cache.set_item(&req.to_item())
            } else {
                cache.set(req.to_entry())
            }
        })
        .await?;

    Ok(Json(SetResponse::new(key)))
}

/// Handler for GET /get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let lookup = key.clone();
    let value = state.run(move |cache| cache.get(&lookup)).await?;

    Ok(Json(GetResponse::new(key, text(value))))
}

/// Handler for DELETE /del/:key
///
/// Deletes the key and everything relevant to it.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let target = key.clone();
    state.run(move |cache| cache.del(&[&target])).await?;

    info!(key = %key, "deleted with relevant keys");
    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for DELETE /unlink/:key
pub async fn unlink_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let target = key.clone();
    state.run(move |cache| cache.unlink(&[&target])).await?;

    info!(key = %key, "unlinked with relevant keys");
    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /relevant/:key
///
/// Reports what a delete of the key would remove, without deleting.
pub async fn relevant_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<RelevantResponse>> {
    let root = key.clone();
    let relevant = state.run(move |cache| cache.resolve(&root)).await?;

    Ok(Json(RelevantResponse { key, relevant }))
}

/// Handler for POST /incr/:key
pub async fn increment_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<IncrementResponse>> {
    let counter = key.clone();
    let value = state.run(move |cache| cache.increment(&counter)).await?;

    Ok(Json(IncrementResponse { key, value }))
}

/// Handler for POST /mget
pub async fn mget_handler(
    State(state): State<AppState>,
    Json(req): Json<MGetRequest>,
) -> Result<Json<MGetResponse>> {
    let values = state
        .run(move |cache| {
            let keys: Vec<&dyn CacheKey> = req.keys.iter().map(|k| k as &dyn CacheKey).collect();
            cache.mget(&keys)
        })
        .await?;

    Ok(Json(MGetResponse {
        values: values.into_iter().map(|v| v.map(text)).collect(),
    }))
}

/// Handler for PUT /hset
pub async fn hset_handler(
    State(state): State<AppState>,
    Json(req): Json<HSetRequest>,
) -> Result<Json<MessageResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InsufficientArguments(error_msg));
    }

    let message = format!("Field '{}' of '{}' set successfully", req.field, req.key);
    state
        .run(move |cache| cache.hset(&req.to_item(), &req.field, req.value.into()))
        .await?;

    Ok(Json(MessageResponse::new(message)))
}

/// Handler for GET /hget/:key/:field
pub async fn hget_handler(
    State(state): State<AppState>,
    Path((key, field)): Path<(String, String)>,
) -> Result<Json<HGetResponse>> {
    let (k, f) = (key.clone(), field.clone());
    let value = state.run(move |cache| cache.hget(&k, &f)).await?;

    Ok(Json(HGetResponse {
        key,
        field,
        value: text(value),
    }))
}

/// Handler for GET /hlen/:key
pub async fn hlen_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<HLenResponse>> {
    let lookup = key.clone();
    let len = state.run(move |cache| cache.hlen(&lookup)).await?;

    Ok(Json(HLenResponse { key, len }))
}

/// Handler for GET /dump
pub async fn dump_handler(State(state): State<AppState>) -> Result<Json<DumpResponse>> {
    let keys = state.run(|cache| cache.dump()).await?;
    Ok(Json(DumpResponse::new(keys)))
}

/// Handler for DELETE /purge
pub async fn purge_handler(State(state): State<AppState>) -> Result<Json<MessageResponse>> {
    state.run(|cache| cache.purge()).await?;

    info!("cache purged");
    Ok(Json(MessageResponse::new("Cache purged")))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_request(key: &str, value: &str, relevant: &[&str]) -> SetRequest {
        SetRequest {
            key: key.to_string(),
            value: value.to_string(),
            ttl: None,
            relevant: relevant.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_set_and_get_handler() {
        let state = AppState::in_memory();

        let req = set_request("test_key", "test_value", &[]);
        let result = set_handler(State(state.clone()), Json(req)).await;
        assert!(result.is_ok());

        let result = get_handler(State(state.clone()), Path("test_key".to_string())).await;
        let response = result.unwrap();
        assert_eq!(response.value, "test_value");
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let state = AppState::in_memory();

        let result = get_handler(State(state), Path("nonexistent".to_string())).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_handler_removes_relevant() {
        let state = AppState::in_memory();

        set_handler(State(state.clone()), Json(set_request("parent", "p", &[])))
            .await
            .unwrap();
        set_handler(State(state.clone()), Json(set_request("child", "c", &["parent"])))
            .await
            .unwrap();

        let result = delete_handler(State(state.clone()), Path("child".to_string())).await;
        assert!(result.is_ok());

        let result = get_handler(State(state), Path("parent".to_string())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_relevant_handler() {
        let state = AppState::in_memory();

        set_handler(State(state.clone()), Json(set_request("a", "1", &["b"])))
            .await
            .unwrap();

        let response = relevant_handler(State(state), Path("a".to_string()))
            .await
            .unwrap();
        assert_eq!(response.relevant, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_increment_handler() {
        let state = AppState::in_memory();

        increment_handler(State(state.clone()), Path("hits".to_string()))
            .await
            .unwrap();
        let response = increment_handler(State(state), Path("hits".to_string()))
            .await
            .unwrap();
        assert_eq!(response.value, 2);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[tokio::test]
    async fn test_set_invalid_request() {
        let state = AppState::in_memory();

        let req = set_request("", "value", &[]);
        let result = set_handler(State(state), Json(req)).await;
        assert!(matches!(result, Err(CacheError::InsufficientArguments(_))));
    }
}
