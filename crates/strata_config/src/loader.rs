//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::resolve::resolve_paths;
use crate::types::StrataConfig;
use std::collections::HashSet;
use std::path::Path;

/// Name of the configuration file looked up in a project directory.
pub const CONFIG_FILE_NAME: &str = "strata.toml";

/// Loads and validates `strata.toml` from a project directory.
///
/// Reads `<project_dir>/strata.toml`; relative paths inside it are resolved
/// against `project_dir`.
pub fn load_config(project_dir: &Path) -> Result<StrataConfig, ConfigError> {
    load_config_file(&project_dir.join(CONFIG_FILE_NAME))
}

/// Loads and validates an explicit configuration file.
///
/// Relative paths inside it are resolved against the file's parent directory.
pub fn load_config_file(config_path: &Path) -> Result<StrataConfig, ConfigError> {
    let content = std::fs::read_to_string(config_path)?;
    let mut config = load_config_from_str(&content)?;
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    config.cache = resolve_paths(config.cache, base_dir);
    Ok(config)
}

/// Parses and validates a `strata.toml` configuration from a string.
///
/// Paths are returned exactly as written. Useful for testing without
/// filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<StrataConfig, ConfigError> {
    let config: StrataConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that schema file entries are non-empty and unique.
fn validate_config(config: &StrataConfig) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for path in &config.cache.schema_files {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "cache.schema_files contains an empty path".to_string(),
            ));
        }
        if !seen.insert(path) {
            return Err(ConfigError::ValidationError(format!(
                "cache.schema_files lists {} more than once",
                path.display()
            )));
        }
    }
    Ok(())
}
