//! Persistent, fingerprinted cache for derived analysis artifacts.
//!
//! A caller that derives an artifact from a source file stores it under the
//! file's identity together with a fingerprint of the identity, the raw
//! content and the producer version. A later read with the same content gets
//! the artifact back; any change to the content or to the producer's schema
//! files turns the entry stale, and the read removes it.

#![warn(missing_docs)]

pub mod entry;
pub mod error;
pub mod producer;
pub mod store;

pub use error::CacheError;
pub use producer::ProducerVersion;
pub use store::{CacheStats, CacheStore, EntryStatus, FILE_CACHE_DIRECTORY};
