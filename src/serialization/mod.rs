//! Postcard-based cache serialization with versioned envelopes.
//!
//! Every cached analytics payload follows this format:
//! ```text
//! ┌─────────────────┬─────────────────┬──────────────────────────┐
//! │  MAGIC (4 bytes)│VERSION (varint) │POSTCARD PAYLOAD (N bytes)│
//! └─────────────────┴─────────────────┴──────────────────────────┘
//!   "SALE"              u32                postcard::to_allocvec(T)
//! ```
//!
//! Encoding is deterministic: the same result always produces identical
//! bytes, so two consecutive cache hits hand back byte-identical payloads.
//!
//! # Example
//!
//! ```rust
//! use sales_analytics::serialization::{serialize_for_cache, deserialize_from_cache};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Summary {
//!     customer_id: String,
//!     total: f64,
//! }
//!
//! # fn main() -> sales_analytics::Result<()> {
//! let summary = Summary { customer_id: "C1".to_string(), total: 35.0 };
//! let bytes = serialize_for_cache(&summary)?;
//! let decoded: Summary = deserialize_from_cache(&bytes)?;
//! assert_eq!(summary, decoded);
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Magic header for analytics cache entries: b"SALE"
pub const CACHE_MAGIC: [u8; 4] = *b"SALE";

/// Current payload schema version.
///
/// Increment when a cached result type changes shape (fields added, removed,
/// reordered or retyped). Entries written under another version are treated
/// as misses and recomputed.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Versioned envelope for cache entries.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CacheEnvelope<T> {
    /// Magic header: must be b"SALE"
    pub magic: [u8; 4],
    /// Schema version: must match CURRENT_SCHEMA_VERSION
    pub version: u32,
    /// The cached result
    pub payload: T,
}

impl<T> CacheEnvelope<T> {
    /// Create a new envelope with current magic and version.
    pub fn new(payload: T) -> Self {
        Self {
            magic: CACHE_MAGIC,
            version: CURRENT_SCHEMA_VERSION,
            payload,
        }
    }
}

/// Serialize a value with envelope for cache storage.
///
/// # Errors
///
/// Returns `Error::Serialization` if Postcard serialization fails.
pub fn serialize_for_cache<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let envelope = CacheEnvelope::new(value);
    postcard::to_allocvec(&envelope).map_err(|e| {
        log::error!("Cache serialization failed: {}", e);
        Error::Serialization(e.to_string())
    })
}

/// Deserialize a value from cache storage with validation.
///
/// Checks, in order: the envelope decodes, the magic is `b"SALE"`, and the
/// version equals [`CURRENT_SCHEMA_VERSION`].
///
/// # Errors
///
/// - `Error::Deserialization`: corrupted or truncated payload
/// - `Error::InvalidCacheEntry`: foreign magic header
/// - `Error::VersionMismatch`: written by another schema version
pub fn deserialize_from_cache<'de, T: Deserialize<'de>>(bytes: &'de [u8]) -> Result<T> {
    let envelope: CacheEnvelope<T> = postcard::from_bytes(bytes).map_err(|e| {
        log::warn!("Cache deserialization failed: {}", e);
        Error::Deserialization(e.to_string())
    })?;

    if envelope.magic != CACHE_MAGIC {
        log::warn!(
            "Invalid cache entry: expected magic {:?}, got {:?}",
            CACHE_MAGIC,
            envelope.magic
        );
        return Err(Error::InvalidCacheEntry(format!(
            "Invalid magic: expected {:?}, got {:?}",
            CACHE_MAGIC, envelope.magic
        )));
    }

    if envelope.version != CURRENT_SCHEMA_VERSION {
        log::warn!(
            "Cache version mismatch: expected {}, got {}",
            CURRENT_SCHEMA_VERSION,
            envelope.version
        );
        return Err(Error::VersionMismatch {
            expected: CURRENT_SCHEMA_VERSION,
            found: envelope.version,
        });
    }

    Ok(envelope.payload)
}
