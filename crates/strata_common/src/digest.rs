//! Digests that name, fingerprint and checksum cache entries.

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fmt;

use crate::identity::Identity;

/// Writes `bytes` as lowercase hex.
fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for byte in bytes {
        write!(f, "{byte:02x}")?;
    }
    Ok(())
}

/// The 160-bit SHA-1 digest of an entry's normalized identity.
///
/// Rendered as 40 lowercase hex characters and used directly as the entry's
/// filename. Two identities sharing a key is accepted at SHA-1 collision
/// probability; the literal identity is never stored.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 20]);

impl CacheKey {
    /// Derives the cache key for a normalized identity.
    pub fn for_identity(identity: &Identity) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(identity.as_str().as_bytes());
        Self(hasher.finalize().into())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex(f, &self.0)
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CacheKey({self})")
    }
}

/// Staleness fingerprint of a cache entry.
///
/// The SHA-1 digest of `identity + " " + raw_content + seed`, where `seed` is
/// the producer-version string. A change to the content, the identity or the
/// producer's schema files yields a different fingerprint.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint([u8; 20]);

impl Fingerprint {
    /// Computes the fingerprint of `raw_content` cached under `identity`.
    pub fn compute(identity: &Identity, raw_content: &[u8], seed: &str) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(identity.as_str().as_bytes());
        hasher.update(b" ");
        hasher.update(raw_content);
        hasher.update(seed.as_bytes());
        Self(hasher.finalize().into())
    }

    /// Returns the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex(f, &self.0)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

/// A 128-bit XXH3 checksum guarding an entry payload against corruption.
///
/// Not collision resistant; it only detects torn or damaged files.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentChecksum([u8; 16]);

impl ContentChecksum {
    /// Computes the checksum of a byte slice using XXH3-128.
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = xxhash_rust::xxh3::xxh3_128(data);
        Self(hash.to_le_bytes())
    }
}

impl fmt::Display for ContentChecksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex(f, &self.0)
    }
}

impl fmt::Debug for ContentChecksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentChecksum({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}
