//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_handler, dump_handler, get_handler, health_handler, hget_handler, hlen_handler,
    hset_handler, increment_handler, mget_handler, purge_handler, relevant_handler, set_handler,
    unlink_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /set` - Store a value, optionally with relevant keys
/// - `GET /get/:key` - Retrieve a value by key
/// - `DELETE /del/:key` - Delete a key and its relevant keys
/// - `DELETE /unlink/:key` - Same as del, reclaimed asynchronously by Redis
/// - `GET /relevant/:key` - Keys a delete would remove
/// - `POST /incr/:key` - Increment a counter
/// - `POST /mget` - Retrieve several values
/// - `PUT /hset` - Store a hash field
/// - `GET /hget/:key/:field` - Retrieve a hash field
/// - `GET /hlen/:key` - Count hash fields
/// - `GET /dump` - List stored keys
/// - `DELETE /purge` - Remove every key
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/set", put(set_handler))
        .route("/get/:key", get(get_handler))
        .route("/del/:key", delete(delete_handler))
        .route("/unlink/:key", delete(unlink_handler))
        .route("/relevant/:key", get(relevant_handler))
        .route("/incr/:key", post(increment_handler))
        .route("/mget", post(mget_handler))
        .route("/hset", put(hset_handler))
        .route("/hget/:key/:field", get(hget_handler))
        .route("/hlen/:key", get(hlen_handler))
        .route("/dump", get(dump_handler))
        .route("/purge", delete(purge_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        create_router(AppState::in_memory())
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_dump_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/dump").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_set_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/set")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"key":"test","value":"hello","relevant":["other"]}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/get/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_ok() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/del/ghost")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
