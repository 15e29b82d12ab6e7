//! Shared foundational types used across the strata cache.
//!
//! This crate provides the digest types that name and validate cache entries
//! and the normalized identity under which an artifact is cached.

#![warn(missing_docs)]

pub mod digest;
pub mod identity;

pub use digest::{CacheKey, ContentChecksum, Fingerprint};
pub use identity::Identity;
