//! Configuration Module
//!
//! Handles loading server configuration from environment variables.

use std::env;

use crate::cache::CacheOptions;

/// Which store backs the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Memory,
    Redis,
}

impl BackendKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Some(BackendKind::Memory),
            "redis" => Some(BackendKind::Redis),
            _ => None,
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend to construct at startup
    pub backend: BackendKind,
    /// Redis endpoint; `tls://` selects TLS
    pub redis_url: String,
    /// Skip TLS certificate verification
    pub skip_tls_verify: bool,
    /// SCAN COUNT hint for wildcard listing, None = use KEYS
    pub scan_count: Option<usize>,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_BACKEND` - `memory` or `redis` (default: memory)
    /// - `REDIS_URL` - Redis endpoint (default: redis://127.0.0.1:6379)
    /// - `SKIP_TLS_VERIFY` - `true`/`1` to skip certificate checks (default: false)
    /// - `SCAN_COUNT` - Use SCAN with this COUNT for wildcards (default: unset)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend: env::var("CACHE_BACKEND")
                .ok()
                .and_then(|v| BackendKind::parse(&v))
                .unwrap_or(defaults.backend),
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            skip_tls_verify: env::var("SKIP_TLS_VERIFY")
                .ok()
                .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "yes"))
                .unwrap_or(defaults.skip_tls_verify),
            scan_count: env::var("SCAN_COUNT").ok().and_then(|v| v.parse().ok()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
        }
    }

    /// Backend construction options derived from this configuration.
    pub fn cache_options(&self) -> CacheOptions {
        let options = CacheOptions::new().with_skip_tls_verify(self.skip_tls_verify);
        match self.scan_count {
            Some(count) => options.with_scan_count(count),
            None => options,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::Memory,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            skip_tls_verify: false,
            scan_count: None,
            server_port: 3000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.backend, BackendKind::Memory);
        assert_eq!(config.redis_url, "redis://127.0.0.1:6379");
        assert!(!config.skip_tls_verify);
        assert!(config.scan_count.is_none());
        assert_eq!(config.server_port, 3000);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_BACKEND");
        env::remove_var("REDIS_URL");
        env::remove_var("SKIP_TLS_VERIFY");
        env::remove_var("SCAN_COUNT");
        env::remove_var("SERVER_PORT");

        let config = Config::from_env();
        assert_eq!(config.backend, BackendKind::Memory);
        assert_eq!(config.server_port, 3000);
        assert!(config.scan_count.is_none());
    }

    #[test]
    fn test_backend_kind_parse() {
        assert_eq!(BackendKind::parse("Redis"), Some(BackendKind::Redis));
        assert_eq!(BackendKind::parse(" memory "), Some(BackendKind::Memory));
        assert_eq!(BackendKind::parse("sqlite"), None);
    }

    #[test]
    fn test_cache_options() {
        let config = Config {
            skip_tls_verify: true,
            scan_count: Some(100),
            ..Config::default()
        };
        let options = config.cache_options();
        assert!(options.skip_tls_verify);
        assert_eq!(options.scan_count, Some(100));
    }
}
