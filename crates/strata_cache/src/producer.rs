//! Producer-version seed derived from schema file modification times.
//!
//! The artifacts in the cache have no version field. Instead, the files that
//! define the artifact's shape are named in configuration, and their
//! modification times are folded into every fingerprint. Touching any of those
//! files turns every existing entry stale.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::error::CacheError;

/// The producer-version seed appended to every fingerprint.
///
/// Computed once when a store is built and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProducerVersion {
    seed: String,
}

impl ProducerVersion {
    /// Builds the seed from the modification times of `schema_files`.
    ///
    /// Each file contributes a space followed by its mtime in decimal Unix
    /// seconds, in the given order. A missing file is a deployment error and
    /// yields [`CacheError::MissingSchemaFile`].
    pub fn from_schema_files(schema_files: &[PathBuf]) -> Result<Self, CacheError> {
        let mut seed = String::new();
        for path in schema_files {
            let secs = modified_secs(path)?;
            seed.push(' ');
            seed.push_str(&secs.to_string());
        }
        debug!(
            "producer version from {} schema files: {:?}",
            schema_files.len(),
            seed
        );
        Ok(Self { seed })
    }

    /// Wraps an explicit seed string.
    pub fn from_seed(seed: impl Into<String>) -> Self {
        Self { seed: seed.into() }
    }

    /// Returns the seed string.
    pub fn seed(&self) -> &str {
        &self.seed
    }
}

/// Returns the modification time of `path` in Unix seconds.
fn modified_secs(path: &Path) -> Result<i64, CacheError> {
    let metadata = fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CacheError::MissingSchemaFile {
                path: path.to_path_buf(),
            }
        } else {
            CacheError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    let modified = metadata.modified().map_err(|e| CacheError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(unix_secs(modified))
}

fn unix_secs(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_secs() as i64,
        Err(before) => -(before.duration().as_secs() as i64),
    }
}
