//! Redis Backend Module
//!
//! The backend contract over a Redis server. Every primitive is one command,
//! and closure resolution costs one round trip per visited key, so latency
//! grows with dependency depth and wildcard fan-out. Keep chains shallow.
//!
//! Deletes are not atomic with respect to other writers: a key can be
//! rewritten between being read for its dependencies and being deleted.

use std::sync::{Mutex, MutexGuard};

use redis::{Client, Connection, ErrorKind, RedisError};
use tracing::{debug, info};
use url::Url;

use crate::cache::backend::{collect_closures, hash_field_blob};
use crate::cache::pattern::to_glob;
use crate::cache::{
    decode, resolve, CacheBackend, CacheKey, CacheOptions, Item, KeySource, SetEntry,
    StorableValue, TLS_SCHEME,
};
use crate::error::{CacheError, Result};

// == Redis Cache ==
/// Networked backend.
pub struct RedisCache {
    /// None once closed
    conn: Mutex<Option<Connection>>,
    options: CacheOptions,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl RedisCache {
    // == Constructor ==
    /// Connects to `endpoint` and checks the server answers PING.
    ///
    /// `tls://host:port` connects over TLS, any other scheme in plaintext.
    pub fn connect(endpoint: &str, options: CacheOptions) -> Result<Self> {
        let url = connection_url(endpoint, options.skip_tls_verify)?;
        let client = Client::open(url.as_str())?;
        let mut conn = client.get_connection()?;

        let pong: String = redis::cmd("PING").query(&mut conn)?;
        if pong != "PONG" {
            return Err(CacheError::TransportFailure(format!(
                "expected PONG from server, got {}",
                pong
            )));
        }
        info!(endpoint = %redact(&url), "connected to redis");

        Ok(Self {
            conn: Mutex::new(Some(conn)),
            options,
        })
    }

    /// Runs `f` against the open connection.
    fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> redis::RedisResult<T>) -> Result<T> {
        let mut guard: MutexGuard<'_, Option<Connection>> = self
            .conn
            .lock()
            .map_err(|_| CacheError::Internal("connection lock poisoned".to_string()))?;
        let conn = guard
            .as_mut()
            .ok_or_else(|| CacheError::TransportFailure("connection is closed".to_string()))?;
        Ok(f(conn)?)
    }

    fn scan_keys(&self, glob: &str, count: usize) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut cursor: u64 = 0;
            let mut keys = Vec::new();
            loop {
                let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                    .arg(cursor)
                    .arg("MATCH")
                    .arg(glob)
                    .arg("COUNT")
                    .arg(count)
                    .query(&mut *conn)?;
                keys.extend(batch);
                if next == 0 {
                    break;
                }
                cursor = next;
            }
            Ok(keys)
        })
    }

    fn remove_all(&self, command: &str, keys: Vec<String>) -> Result<()> {
        if keys.is_empty() {
            debug!("delete set is empty, skipped");
            return Ok(());
        }
        self.options
            .debug_sink
            .line(format_args!("[{}] delete relevant caches {:?}", command, keys));

        let removed: usize = self.with_conn(|conn| redis::cmd(command).arg(&keys).query(conn))?;
        debug!(command, requested = keys.len(), removed, "deleted closure");
        Ok(())
    }
}

/// Maps the endpoint onto a redis crate URL.
fn connection_url(endpoint: &str, skip_tls_verify: bool) -> Result<Url> {
    let parsed = Url::parse(endpoint)
        .map_err(|e| CacheError::TransportFailure(format!("invalid endpoint {}: {}", endpoint, e)))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| CacheError::TransportFailure(format!("endpoint {} has no host", endpoint)))?;

    let scheme = if parsed.scheme() == TLS_SCHEME { "rediss" } else { "redis" };
    let mut url = format!("{}://", scheme);
    if !parsed.username().is_empty() || parsed.password().is_some() {
        url.push_str(parsed.username());
        if let Some(password) = parsed.password() {
            url.push(':');
            url.push_str(password);
        }
        url.push('@');
    }
    url.push_str(host);
    if let Some(port) = parsed.port() {
        url.push_str(&format!(":{}", port));
    }
    url.push_str(parsed.path());
    if scheme == "rediss" && skip_tls_verify {
        url.push_str("#insecure");
    }

    Url::parse(&url).map_err(|e| CacheError::TransportFailure(format!("invalid endpoint {}: {}", endpoint, e)))
}

fn redact(url: &Url) -> String {
    let mut shown = url.clone();
    if shown.password().is_some() {
        let _ = shown.set_password(Some("***"));
    }
    shown.to_string()
}

/// INCR answers a plain `ERR` reply when the stored value is not a decimal
/// counter or would overflow.
fn counter_error(key: &str, err: RedisError) -> CacheError {
    match err.kind() {
        ErrorKind::ResponseError => {
            CacheError::TypeMismatch(format!("{} is not a decimal counter: {}", key, err))
        }
        _ => err.into(),
    }
}

// == Key Source ==
impl KeySource for RedisCache {
    fn fetch_blobs(&self, key: &str) -> Result<Option<Vec<Vec<u8>>>> {
        self.with_conn(|conn| {
            match redis::cmd("GET").arg(key).query::<Option<Vec<u8>>>(&mut *conn) {
                Ok(blob) => Ok(blob.map(|b| vec![b])),
                Err(e) if e.code() == Some("WRONGTYPE") => {
                    let fields: Vec<Vec<u8>> = redis::cmd("HVALS").arg(key).query(conn)?;
                    Ok(Some(fields))
                }
                Err(e) => Err(e),
            }
        })
    }

    fn list_matching(&self, pattern: &str) -> Result<Vec<String>> {
        let glob = to_glob(pattern);
        let matches = match self.options.scan_count {
            Some(count) => self.scan_keys(&glob, count)?,
            None => self.with_conn(|conn| redis::cmd("KEYS").arg(&glob).query(conn))?,
        };
        self.options
            .debug_sink
            .line(format_args!("[REL-WILDCARD] {} is relevant to {:?}", pattern, matches));
        Ok(matches)
    }
}

// == Cache Backend ==
impl CacheBackend for RedisCache {
    fn get(&self, key: &dyn CacheKey) -> Result<Vec<u8>> {
        let key = key.cache_key()?;
        let blob: Option<Vec<u8>> = self.with_conn(|conn| redis::cmd("GET").arg(&key).query(conn))?;
        blob.map(|b| decode(&b).value)
            .ok_or(CacheError::NotFound(key))
    }

    fn set(&self, entry: SetEntry) -> Result<()> {
        entry.validate()?;
        let ttl = entry.effective_ttl();
        debug!(key = %entry.key, ttl = ?ttl, "set");

        let mut cmd = redis::cmd("SET");
        cmd.arg(&entry.key).arg(entry.value.as_bytes());
        if let Some(ttl) = ttl {
            cmd.arg("EX").arg(ttl);
        }
        self.with_conn(|conn| cmd.query::<()>(conn))
    }

    fn set_item(&self, item: &Item) -> Result<()> {
        self.options.debug_sink.line(format_args!(
            "[SET] cache key {} is relevant to {:?}",
            item.key(),
            item.relevant_keys()
        ));
        self.set(SetEntry::from_item(item)?)
    }

    fn del(&self, keys: &[&dyn CacheKey]) -> Result<()> {
        let closure = collect_closures(keys, |k| self.resolve(&k))?;
        self.remove_all("DEL", closure)
    }

    fn unlink(&self, keys: &[&dyn CacheKey]) -> Result<()> {
        let closure = collect_closures(keys, |k| self.resolve(&k))?;
        self.remove_all("UNLINK", closure)
    }

    fn increment(&self, key: &dyn CacheKey) -> Result<i64> {
        let key = key.cache_key()?;
        let reply = self.with_conn(|conn| Ok(redis::cmd("INCR").arg(&key).query::<i64>(conn)))?;
        reply.map_err(|e| counter_error(&key, e))
    }

    fn mget(&self, keys: &[&dyn CacheKey]) -> Result<Vec<Option<Vec<u8>>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let keys = keys
            .iter()
            .map(|k| k.cache_key())
            .collect::<Result<Vec<_>>>()?;

        let blobs: Vec<Option<Vec<u8>>> =
            self.with_conn(|conn| redis::cmd("MGET").arg(&keys).query(conn))?;
        Ok(blobs
            .into_iter()
            .map(|blob| blob.map(|b| decode(&b).value))
            .collect())
    }

    fn hset(&self, key: &dyn CacheKey, field: &str, value: StorableValue) -> Result<()> {
        let blob = hash_field_blob(key, value)?;
        let key = key.cache_key()?;
        self.with_conn(|conn| redis::cmd("HSET").arg(&key).arg(field).arg(blob).query::<()>(conn))
    }

    fn hlen(&self, key: &dyn CacheKey) -> Result<usize> {
        let key = key.cache_key()?;
        self.with_conn(|conn| redis::cmd("HLEN").arg(&key).query(conn))
    }

    fn hget(&self, key: &dyn CacheKey, field: &str) -> Result<Vec<u8>> {
        let key = key.cache_key()?;
        let blob: Option<Vec<u8>> =
            self.with_conn(|conn| redis::cmd("HGET").arg(&key).arg(field).query(conn))?;
        blob.map(|b| decode(&b).value)
            .ok_or_else(|| CacheError::NotFound(format!("{}.{}", key, field)))
    }

    fn purge(&self) -> Result<()> {
        self.with_conn(|conn| redis::cmd("FLUSHDB").query::<()>(conn))
    }

    fn close(&self) -> Result<()> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|_| CacheError::Internal("connection lock poisoned".to_string()))?;
        if guard.take().is_some() {
            info!("redis connection closed");
        }
        Ok(())
    }

    fn dump(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.with_conn(|conn| redis::cmd("KEYS").arg("*").query(conn))?;
        keys.sort();
        Ok(keys)
    }

    fn resolve(&self, key: &dyn CacheKey) -> Result<Vec<String>> {
        let key = key.cache_key()?;
        let keys = resolve(self, &key)?;
        self.options
            .debug_sink
            .line(format_args!("[REL] {} is relevant to {:?}", key, keys));
        Ok(keys)
    }
}
