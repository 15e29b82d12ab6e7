//! Parsing and validation of `strata.toml` cache configuration files.
//!
//! This crate reads the configuration file and produces a strongly-typed
//! [`StrataConfig`] whose [`CacheConfig`] section tells the cache store where
//! its root directory lives and which schema files seed its producer version.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE_NAME};
pub use resolve::resolve_paths;
pub use types::*;
