//! Closure Resolver Module
//!
//! Walks the dependency graph from a root key and collects every key that
//! must be deleted with it.

use tracing::{debug, warn};

use crate::cache::{decode_strict, is_wildcard};
use crate::error::{CacheError, Result};

// == Key Source ==
/// Read access a backend gives the resolver.
pub trait KeySource {
    /// Blobs stored under `key`: one for a scalar value, one per field for a
    /// hash. `None` when the key is absent or expired.
    fn fetch_blobs(&self, key: &str) -> Result<Option<Vec<Vec<u8>>>>;

    /// Keys currently stored that match the wildcard `pattern`.
    fn list_matching(&self, pattern: &str) -> Result<Vec<String>>;
}

struct Frame {
    key: String,
    depth: usize,
    from_wildcard: bool,
}

// == Resolve ==
/// Returns the closure of `root`: the root first, then each dependency's
/// closure in declaration order.
///
/// - Wildcard keys are replaced by their matches and never emitted.
/// - Absent keys are emitted but not expanded.
/// - A tagged record with a broken header is emitted but not expanded.
/// - A literal dependency that loops back to an ancestor fails with
///   `CyclicDependency`. A wildcard match that is an ancestor, or a wildcard
///   pattern already being expanded higher up, is skipped.
///
/// Keys shared by several parents may appear more than once.
pub fn resolve<S: KeySource + ?Sized>(source: &S, root: &str) -> Result<Vec<String>> {
    let mut resolved = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut stack = vec![Frame {
        key: root.to_string(),
        depth: 0,
        from_wildcard: false,
    }];

    while let Some(frame) = stack.pop() {
        path.truncate(frame.depth);

        if path.contains(&frame.key) {
            if frame.from_wildcard || is_wildcard(&frame.key) {
                debug!(key = %frame.key, "wildcard already on the path, skipped");
                continue;
            }
            return Err(CacheError::CyclicDependency(format!(
                "{} -> {}",
                path.join(" -> "),
                frame.key
            )));
        }

        let children: Vec<(String, bool)> = if is_wildcard(&frame.key) {
            let matches = source.list_matching(&frame.key)?;
            debug!(pattern = %frame.key, matches = ?matches, "expanded wildcard");
            matches.into_iter().map(|k| (k, true)).collect()
        } else {
            resolved.push(frame.key.clone());
            match source.fetch_blobs(&frame.key)? {
                Some(blobs) => node_dependencies(&frame.key, &blobs)
                    .into_iter()
                    .map(|k| (k, false))
                    .collect(),
                None => Vec::new(),
            }
        };

        let depth = frame.depth + 1;
        path.push(frame.key);
        for (key, from_wildcard) in children.into_iter().rev() {
            stack.push(Frame {
                key,
                depth,
                from_wildcard,
            });
        }
    }

    Ok(resolved)
}

/// Merges the dependency lists of every blob stored under one key.
fn node_dependencies(key: &str, blobs: &[Vec<u8>]) -> Vec<String> {
    let mut deps: Vec<String> = Vec::new();
    for blob in blobs {
        match decode_strict(blob) {
            Ok(record) => {
                for dep in record.dependency_keys() {
                    if !deps.contains(dep) {
                        deps.push(dep.clone());
                    }
                }
            }
            Err(e) => warn!(key, error = %e, "not expanding malformed record"),
        }
    }
    deps
}
