//! Configuration types deserialized from `strata.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

/// Environment variable that overrides `cache.directory` when set and non-empty.
pub const CACHE_DIR_ENV: &str = "STRATA_CACHE_DIR";

/// The top-level configuration parsed from `strata.toml`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StrataConfig {
    /// Cache store settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Settings consumed by the cache store.
///
/// Both fields are optional in the file. A missing or empty `directory` leaves
/// the cache unconfigured: stores built from it report every operation as a
/// configuration error. An empty `schema_files` list yields an empty producer
/// seed.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// Root directory under which `file_cache/` is created.
    #[serde(default, deserialize_with = "deserialize_optional_path")]
    pub directory: Option<PathBuf>,

    /// Files whose modification times seed the producer-version fingerprint,
    /// in the order they are folded into the seed.
    ///
    /// Accepts either a single string or a list of strings.
    #[serde(default, deserialize_with = "deserialize_path_or_vec")]
    pub schema_files: Vec<PathBuf>,
}

impl CacheConfig {
    /// Creates a configuration with the given root directory and schema files.
    pub fn new(directory: impl Into<PathBuf>, schema_files: Vec<PathBuf>) -> Self {
        Self {
            directory: Some(directory.into()),
            schema_files,
        }
    }

    /// Returns the configured cache root, treating an empty path as unset.
    pub fn cache_directory(&self) -> Option<&Path> {
        self.directory
            .as_deref()
            .filter(|dir| !dir.as_os_str().is_empty())
    }

    /// Replaces the cache root with `value` when it is present and non-empty.
    pub fn apply_directory_override(mut self, value: Option<String>) -> Self {
        if let Some(dir) = value.filter(|v| !v.is_empty()) {
            self.directory = Some(PathBuf::from(dir));
        }
        self
    }
}

/// Deserializes an optional path, mapping the empty string to `None`.
fn deserialize_optional_path<'de, D>(deserializer: D) -> Result<Option<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).map(PathBuf::from))
}

/// Deserializes a field that can be either a single path string or a list of them.
///
/// Allows both `schema_files = "src/artifact.rs"` and
/// `schema_files = ["src/artifact.rs", "src/function.rs"]`.
fn deserialize_path_or_vec<'de, D>(deserializer: D) -> Result<Vec<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PathOrVec;

    impl<'de> Visitor<'de> for PathOrVec {
        type Value = Vec<PathBuf>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a path string or a list of path strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![PathBuf::from(v)])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(PathBuf::from(val));
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(PathOrVec)
}
