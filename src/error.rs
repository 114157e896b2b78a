//! Error types for the relevant cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache backends and the HTTP front-end.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key argument is not one of the accepted forms
    #[error("Invalid key type: {0}")]
    InvalidKeyType(String),

    /// Key is absent or has expired
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Tagged record whose header disagrees with its payload
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// Set called without a key
    #[error("Insufficient arguments: {0}")]
    InsufficientArguments(String),

    /// Stored value has the wrong shape for the operation
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// Underlying store call failed
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    /// Wildcard could not be turned into a match pattern
    #[error("Pattern error: {0}")]
    PatternError(String),

    /// Dependency chain loops back onto one of its ancestors
    #[error("Cyclic dependency: {0}")]
    CyclicDependency(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == Conversions ==
impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        if err.code() == Some("WRONGTYPE") || err.kind() == redis::ErrorKind::TypeError {
            CacheError::TypeMismatch(err.to_string())
        } else {
            CacheError::TransportFailure(err.to_string())
        }
    }
}

impl From<regex::Error> for CacheError {
    fn from(err: regex::Error) -> Self {
        CacheError::PatternError(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidKeyType(_)
            | CacheError::InsufficientArguments(_)
            | CacheError::TypeMismatch(_)
            | CacheError::PatternError(_) => StatusCode::BAD_REQUEST,
            CacheError::CyclicDependency(_) => StatusCode::CONFLICT,
            CacheError::MalformedRecord(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CacheError::TransportFailure(_) => StatusCode::BAD_GATEWAY,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (CacheError::NotFound("k".into()), StatusCode::NOT_FOUND),
            (CacheError::TypeMismatch("k".into()), StatusCode::BAD_REQUEST),
            (CacheError::CyclicDependency("a".into()), StatusCode::CONFLICT),
            (CacheError::TransportFailure("down".into()), StatusCode::BAD_GATEWAY),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_redis_error_kinds() {
        let type_error = redis::RedisError::from((redis::ErrorKind::TypeError, "incompatible reply"));
        assert!(matches!(CacheError::from(type_error), CacheError::TypeMismatch(_)));

        let io_error = redis::RedisError::from((redis::ErrorKind::IoError, "connection refused"));
        assert!(matches!(CacheError::from(io_error), CacheError::TransportFailure(_)));
    }

    #[test]
    fn test_regex_error_becomes_pattern_error() {
        let err: CacheError = regex::Regex::new("(").unwrap_err().into();
        assert!(matches!(err, CacheError::PatternError(_)));
    }
}
