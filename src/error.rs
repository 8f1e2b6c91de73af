//! Error types for the analytics layer.

use thiserror::Error;

/// Result type for analytics operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the analytics layer.
///
/// Domain-level absences (unknown customer, unknown product, no orders) are
/// never errors; they surface as `None` or as an unsuccessful
/// `PlaceOrderPayload`. The variants below are caller mistakes or
/// infrastructure failures.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Caller supplied malformed input.
    ///
    /// Raised for:
    /// - Empty customer identifiers
    /// - Non-positive `limit`, `page`, `pageSize` or item quantity
    /// - Dates that cannot be parsed as calendar timestamps
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization failed when converting a result payload to cache bytes.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization failed when converting cache bytes to a result payload.
    ///
    /// **Recovery:** the query layer treats this as a miss and recomputes.
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Cache entry envelope is corrupted or carries a foreign magic header.
    #[error("Invalid cache entry: {0}")]
    InvalidCacheEntry(String),

    /// Cache entry was written by a different payload schema version.
    #[error("Cache version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Expected schema version (from compiled code)
        expected: u32,
        /// Found schema version (from cached entry)
        found: u32,
    },

    /// Cache store error (Redis unreachable, pool exhausted, protocol error).
    ///
    /// Never fatal for reads: the query layer degrades to the data store.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Data store error (database unreachable, query failed).
    ///
    /// Propagates to the API surface as a failed operation.
    #[error("Store error: {0}")]
    Store(String),

    /// Invalid configuration value.
    #[error("Config error: {0}")]
    Config(String),

    /// Malformed bulk-import input.
    #[error("Import error: {0}")]
    Import(String),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl Error {
    /// Stable machine-readable code reported to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "BAD_USER_INPUT",
            _ => "INTERNAL_SERVER_ERROR",
        }
    }

    /// True when the error was caused by the caller rather than the system.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            Error::Io(e.to_string())
        } else if e.is_syntax() || e.is_data() || e.is_eof() {
            Error::Deserialization(e.to_string())
        } else {
            Error::Serialization(e.to_string())
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Import(e.to_string())
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        Error::Store(format!("Postgres error: {}", e))
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::migrate::MigrateError> for Error {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        Error::Store(format!("Migration failed: {}", e))
    }
}
