//! Path resolution: anchoring relative config paths to the config file's directory.

use crate::types::CacheConfig;
use std::path::{Path, PathBuf};

fn anchor(base_dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}

/// Resolves relative paths in a cache configuration against `base_dir`.
///
/// Absolute paths are left untouched. The cache directory and every schema
/// file are resolved, so a store built from the result does not depend on the
/// process working directory.
pub fn resolve_paths(config: CacheConfig, base_dir: &Path) -> CacheConfig {
    CacheConfig {
        directory: config.directory.map(|dir| anchor(base_dir, dir)),
        schema_files: config
            .schema_files
            .into_iter()
            .map(|path| anchor(base_dir, path))
            .collect(),
    }
}
