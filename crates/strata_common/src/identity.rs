//! Logical identities of cached artifacts.

use std::fmt;

/// The normalized logical identity (usually a source path) of a cached artifact.
///
/// Identities are lowercased on construction, so `Foo.txt` and `foo.TXT`
/// address the same entry. This mirrors filesystems that are already
/// case-insensitive and makes the cache case-insensitive everywhere else.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    /// Normalizes a raw identity by lowercasing it.
    pub fn new(raw: &str) -> Self {
        Self(raw.to_lowercase())
    }

    /// Returns the normalized identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the identity is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({:?})", self.0)
    }
}
