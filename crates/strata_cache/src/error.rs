//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur during cache operations.
///
/// Reads are fail-safe: header, version, checksum and decoding problems are
/// reported through this enum internally but surface to callers as cache
/// misses. Construction, configuration and write failures propagate.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// A schema-defining file required to compute the producer version is missing.
    #[error("schema file {path} must exist")]
    MissingSchemaFile {
        /// The missing file.
        path: PathBuf,
    },

    /// No cache root directory is configured.
    #[error("no cache directory defined")]
    NotConfigured,

    /// The artifact identity is the empty string.
    #[error("cache identity must not be empty")]
    EmptyIdentity,

    /// An I/O error occurred while reading or writing cache files.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An entry file has an invalid or missing header.
    #[error("invalid entry header in {path}: {reason}")]
    InvalidHeader {
        /// The entry file path.
        path: PathBuf,
        /// Description of the header problem.
        reason: String,
    },

    /// The entry format version does not match the current version.
    #[error("version mismatch in {path}: expected {expected}, got {actual}")]
    VersionMismatch {
        /// The entry file path.
        path: PathBuf,
        /// The expected format version.
        expected: u32,
        /// The actual format version found in the file.
        actual: u32,
    },

    /// The stored checksum does not match the computed checksum of the payload.
    #[error("checksum mismatch in {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The entry file path.
        path: PathBuf,
        /// The checksum recorded in the header.
        expected: String,
        /// The checksum computed from the payload.
        actual: String,
    },

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}
