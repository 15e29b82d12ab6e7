//! Shared helpers for CLI commands: config discovery and store construction.

use std::path::{Path, PathBuf};

use strata_cache::CacheStore;
use strata_config::{load_config_file, CONFIG_FILE_NAME};
use tracing::debug;

use crate::GlobalArgs;

/// Walks up from `start` looking for the nearest directory containing `strata.toml`.
pub fn find_config_file(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Ok(candidate);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE_NAME} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the config file from global CLI args.
///
/// If `--config` is specified, uses that path (dir → `<dir>/strata.toml`).
/// Otherwise walks up from the current directory.
pub fn resolve_config_file(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match global.config {
        Some(ref config) => {
            let p = PathBuf::from(config);
            if p.is_dir() {
                Ok(p.join(CONFIG_FILE_NAME))
            } else {
                Ok(p)
            }
        }
        None => find_config_file(&std::env::current_dir()?),
    }
}

/// Loads configuration and builds the cache store.
///
/// `global.cache_dir_override` replaces the configured cache root when set.
/// A missing schema file aborts here, before any command touches the cache.
pub fn open_store(global: &GlobalArgs) -> Result<CacheStore, Box<dyn std::error::Error>> {
    let config_file = resolve_config_file(global)?;
    debug!("using config {}", config_file.display());
    let config = load_config_file(&config_file)?;
    let cache = config
        .cache
        .apply_directory_override(global.cache_dir_override.clone());
    let store = CacheStore::new(&cache)?;
    Ok(store)
}
