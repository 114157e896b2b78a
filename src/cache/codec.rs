//! Record Codec Module
//!
//! Packs a dependency list and a raw value into one stored blob.
//!
//! Tagged layout:
//!
//! ```text
//! SIGNATURE(1) | RESERVED(1) | LEN(2, big-endian) | DEP_LIST(LEN) | VALUE(..)
//! ```
//!
//! Blobs that do not start with the signature pair are plain values with no
//! dependencies, so keys written by other clients stay readable.

use crate::cache::{HEADER_LEN, RELEVANT_DELIMITER, RESERVED, SIGNATURE};
use crate::error::{CacheError, Result};

// == Record ==
/// A decoded blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Declared dependency keys, `None` for untagged blobs
    pub dependencies: Option<Vec<String>>,
    /// The raw value
    pub value: Vec<u8>,
}

impl Record {
    fn untagged(blob: &[u8]) -> Self {
        Self {
            dependencies: None,
            value: blob.to_vec(),
        }
    }

    /// Dependency keys, empty for untagged blobs.
    pub fn dependency_keys(&self) -> &[String] {
        self.dependencies.as_deref().unwrap_or(&[])
    }
}

// == Encode ==
/// Builds a tagged blob from `dependencies` and `value`.
///
/// Fails with `MalformedRecord` when the joined dependency list does not fit
/// the 16-bit length field.
pub fn encode(dependencies: &[String], value: &[u8]) -> Result<Vec<u8>> {
    let joined = dependencies.join(RELEVANT_DELIMITER);
    let len = u16::try_from(joined.len()).map_err(|_| {
        CacheError::MalformedRecord(format!(
            "dependency list is {} bytes, limit is {}",
            joined.len(),
            u16::MAX
        ))
    })?;

    let mut blob = Vec::with_capacity(HEADER_LEN + joined.len() + value.len());
    blob.push(SIGNATURE);
    blob.push(RESERVED);
    blob.extend_from_slice(&len.to_be_bytes());
    blob.extend_from_slice(joined.as_bytes());
    blob.extend_from_slice(value);
    Ok(blob)
}

// == Decode ==
/// Splits a stored blob into dependencies and value. Never fails.
pub fn decode(blob: &[u8]) -> Record {
    decode_strict(blob).unwrap_or_else(|_| Record::untagged(blob))
}

/// Like [`decode`], but reports a tagged header that overruns its payload
/// as `MalformedRecord`.
pub fn decode_strict(blob: &[u8]) -> Result<Record> {
    if blob.len() < HEADER_LEN || blob[0] != SIGNATURE || blob[1] != RESERVED {
        return Ok(Record::untagged(blob));
    }

    let len = u16::from_be_bytes([blob[2], blob[3]]) as usize;
    let payload = &blob[HEADER_LEN..];
    if len > payload.len() {
        return Err(CacheError::MalformedRecord(format!(
            "length field says {} bytes, only {} present",
            len,
            payload.len()
        )));
    }

    let (deps, value) = payload.split_at(len);
    let deps = std::str::from_utf8(deps)
        .map_err(|e| CacheError::MalformedRecord(format!("dependency list is not UTF-8: {}", e)))?;

    let dependencies = if deps.is_empty() {
        Vec::new()
    } else {
        deps.split(RELEVANT_DELIMITER).map(str::to_string).collect()
    };

    Ok(Record {
        dependencies: Some(dependencies),
        value: value.to_vec(),
    })
}
