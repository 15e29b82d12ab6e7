//! The cache store: key derivation, staleness checks and entry I/O.
//!
//! Entries live in a single flat directory, `<root>/file_cache/`, one file per
//! cache key. The store keeps no in-memory state besides its root and the
//! producer version; every operation goes straight to the filesystem.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use strata_common::{CacheKey, ContentChecksum, Fingerprint, Identity};
use strata_config::CacheConfig;
use tracing::{debug, warn};

use crate::entry;
use crate::error::CacheError;
use crate::producer::ProducerVersion;

/// Subdirectory of the cache root holding entry files.
pub const FILE_CACHE_DIRECTORY: &str = "file_cache";

/// Extension of the temporary file an entry is written to before it is
/// renamed into place.
const TEMP_EXT: &str = "tmp";

/// Freshness of an entry relative to the current content and producer version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// No entry file exists for the identity.
    Missing,
    /// The stored fingerprint matches.
    Fresh,
    /// The stored fingerprint differs; a read would delete the entry.
    Stale,
    /// The entry file cannot be decoded.
    Corrupt,
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Missing => "missing",
            Self::Fresh => "fresh",
            Self::Stale => "stale",
            Self::Corrupt => "corrupt",
        };
        f.write_str(name)
    }
}

/// Entry count and disk usage of the cache directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of entry files.
    pub entries: usize,
    /// Combined size of the entry files in bytes.
    pub total_bytes: u64,
}

/// Persistent cache of derived artifacts keyed by source identity.
///
/// Entries are validated against a fingerprint of the lowercased identity,
/// the raw source content and the producer version. A mismatching entry is
/// deleted on read. Undecodable entries read as misses.
///
/// Assumes at most one writer per key; there is no locking.
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Root directory; `file_cache/` is created beneath it.
    root: Option<PathBuf>,

    /// Seed folded into every fingerprint.
    producer: ProducerVersion,
}

impl CacheStore {
    /// Builds a store from configuration.
    ///
    /// Fails with [`CacheError::MissingSchemaFile`] if any schema file is
    /// absent. Callers must treat that as fatal. An unset cache directory is
    /// not an error here; it surfaces as [`CacheError::NotConfigured`] on use.
    pub fn new(config: &CacheConfig) -> Result<Self, CacheError> {
        let producer = ProducerVersion::from_schema_files(&config.schema_files)?;
        Ok(Self::with_producer_version(
            config.cache_directory().map(Path::to_path_buf),
            producer,
        ))
    }

    /// Builds a store from an explicit root and producer version.
    pub fn with_producer_version(root: Option<PathBuf>, producer: ProducerVersion) -> Self {
        Self {
            root: root.filter(|dir| !dir.as_os_str().is_empty()),
            producer,
        }
    }

    /// Returns the producer version this store fingerprints with.
    pub fn producer_version(&self) -> &ProducerVersion {
        &self.producer
    }

    /// Returns `<root>/file_cache`, or [`CacheError::NotConfigured`].
    pub fn cache_dir(&self) -> Result<PathBuf, CacheError> {
        self.root
            .as_ref()
            .map(|root| root.join(FILE_CACHE_DIRECTORY))
            .ok_or(CacheError::NotConfigured)
    }

    /// Returns the entry file an identity maps to.
    pub fn entry_path(&self, identity: &str) -> Result<PathBuf, CacheError> {
        let identity = normalize(identity)?;
        self.locate(&identity)
    }

    /// Computes the fingerprint of `raw_content` under `identity` with this
    /// store's producer version.
    pub fn fingerprint(&self, identity: &Identity, raw_content: &[u8]) -> Fingerprint {
        Fingerprint::compute(identity, raw_content, self.producer.seed())
    }

    /// Persists `artifact` as the entry for `identity`.
    ///
    /// The entry is written to a temporary file in the cache directory and
    /// renamed over any previous entry, so readers never see a partial file.
    /// Returns the fingerprint stored with the entry.
    pub fn write<A: Serialize + ?Sized>(
        &self,
        identity: &str,
        raw_content: &[u8],
        artifact: &A,
    ) -> Result<Fingerprint, CacheError> {
        let identity = normalize(identity)?;
        let dir = self.cache_dir()?;
        let key = CacheKey::for_identity(&identity);
        let fingerprint = self.fingerprint(&identity, raw_content);

        fs::create_dir_all(&dir).map_err(|e| CacheError::Io {
            path: dir.clone(),
            source: e,
        })?;

        let image = entry::encode_entry(fingerprint, artifact)?;
        let path = dir.join(key.to_string());
        let temp_path = dir.join(format!("{key}.{TEMP_EXT}"));

        if let Err(e) = fs::write(&temp_path, &image) {
            remove_temp(&temp_path);
            return Err(CacheError::Io {
                path: temp_path,
                source: e,
            });
        }
        if let Err(e) = fs::rename(&temp_path, &path) {
            remove_temp(&temp_path);
            return Err(CacheError::Io { path, source: e });
        }

        debug!("cached {} as {} ({} bytes)", identity, key, image.len());
        Ok(fingerprint)
    }

    /// Returns the cached artifact for `identity` if it is still fresh.
    ///
    /// A missing, undecodable or stale entry yields `Ok(None)`. A stale entry
    /// is deleted before returning. Only an unset cache directory or an empty
    /// identity is reported as an error.
    pub fn read<A: DeserializeOwned>(
        &self,
        identity: &str,
        raw_content: &[u8],
    ) -> Result<Option<A>, CacheError> {
        let identity = normalize(identity)?;
        let path = self.locate(&identity)?;

        let Some(raw) = read_entry_file(&path) else {
            debug!("cache miss for {}", identity);
            return Ok(None);
        };

        let (header, payload) = match entry::decode_header(&raw, &path) {
            Ok(parts) => parts,
            Err(e) => {
                warn!("ignoring unreadable cache entry for {}: {}", identity, e);
                return Ok(None);
            }
        };

        if header.fingerprint != self.fingerprint(&identity, raw_content) {
            debug!("stale cache entry for {}, removing", identity);
            discard(&path);
            return Ok(None);
        }

        match entry::decode_payload(&header, payload, &path) {
            Ok(artifact) => {
                debug!("cache hit for {}", identity);
                Ok(Some(artifact))
            }
            Err(e) => {
                warn!("ignoring unreadable cache entry for {}: {}", identity, e);
                Ok(None)
            }
        }
    }

    /// Classifies the entry for `identity` without decoding its payload type
    /// or modifying the cache.
    ///
    /// A `Fresh` status means the header fingerprint matches and the payload
    /// checksum verifies.
    pub fn probe(&self, identity: &str, raw_content: &[u8]) -> Result<EntryStatus, CacheError> {
        let identity = normalize(identity)?;
        let path = self.locate(&identity)?;

        if !path.exists() {
            return Ok(EntryStatus::Missing);
        }
        let Some(raw) = read_entry_file(&path) else {
            return Ok(EntryStatus::Corrupt);
        };
        let Ok((header, payload)) = entry::decode_header(&raw, &path) else {
            return Ok(EntryStatus::Corrupt);
        };
        if header.fingerprint != self.fingerprint(&identity, raw_content) {
            return Ok(EntryStatus::Stale);
        }
        if ContentChecksum::from_bytes(payload) != header.checksum {
            return Ok(EntryStatus::Corrupt);
        }
        Ok(EntryStatus::Fresh)
    }

    /// Deletes the entry for `identity` regardless of freshness.
    ///
    /// Returns `true` if a file was removed. A missing entry is not an error.
    pub fn invalidate(&self, identity: &str) -> Result<bool, CacheError> {
        let identity = normalize(identity)?;
        let path = self.locate(&identity)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("invalidated cache entry for {}", identity);
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::Io { path, source: e }),
        }
    }

    /// Removes every file in the cache directory.
    ///
    /// Returns the number of entries removed. Leftover temporary files are
    /// deleted too but not counted, matching [`CacheStore::stats`]. A missing
    /// directory counts as already clear.
    pub fn clear(&self) -> Result<usize, CacheError> {
        let dir = self.cache_dir()?;
        let mut removed = 0;
        for path in list_files(&dir)? {
            let temp = is_temp_file(&path);
            match fs::remove_file(&path) {
                Ok(()) if temp => {}
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(CacheError::Io { path, source: e }),
            }
        }
        debug!("cleared {} cache files from {}", removed, dir.display());
        Ok(removed)
    }

    /// Counts entry files and their combined size.
    ///
    /// Leftover temporary files are not counted.
    pub fn stats(&self) -> Result<CacheStats, CacheError> {
        let dir = self.cache_dir()?;
        let mut stats = CacheStats::default();
        for path in list_files(&dir)? {
            if is_temp_file(&path) {
                continue;
            }
            let len = fs::metadata(&path)
                .map_err(|e| CacheError::Io {
                    path: path.clone(),
                    source: e,
                })?
                .len();
            stats.entries += 1;
            stats.total_bytes += len;
        }
        Ok(stats)
    }

    fn locate(&self, identity: &Identity) -> Result<PathBuf, CacheError> {
        let key = CacheKey::for_identity(identity);
        Ok(self.cache_dir()?.join(key.to_string()))
    }
}

fn normalize(identity: &str) -> Result<Identity, CacheError> {
    let identity = Identity::new(identity);
    if identity.is_empty() {
        return Err(CacheError::EmptyIdentity);
    }
    Ok(identity)
}

/// Reads an entry file. Absence and read failures both yield `None`; the
/// latter is logged.
fn read_entry_file(path: &Path) -> Option<Vec<u8>> {
    match fs::read(path) {
        Ok(raw) => Some(raw),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            warn!("failed to read cache entry {}: {}", path.display(), e);
            None
        }
    }
}

/// Deletes a stale entry. A file that is already gone counts as deleted, and
/// other failures are logged and swallowed.
fn discard(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("failed to remove stale cache entry {}: {}", path.display(), e),
    }
}

/// Removes a temporary file left by a failed write.
fn remove_temp(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("failed to remove temporary cache file {}: {}", path.display(), e),
    }
}

fn is_temp_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(TEMP_EXT)
}

/// Lists regular files directly inside `dir`; a missing directory is empty.
fn list_files(dir: &Path) -> Result<Vec<PathBuf>, CacheError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(CacheError::Io {
                path: dir.to_path_buf(),
                source: e,
            })
        }
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CacheError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct FileStorage {
        file_path: String,
        classes: Vec<String>,
        functions: Vec<String>,
    }

    fn storage(path: &str) -> FileStorage {
        FileStorage {
            file_path: path.to_string(),
            classes: vec!["Parser".to_string()],
            functions: vec!["parse".to_string(), "lex".to_string()],
        }
    }

    fn make_store() -> (tempfile::TempDir, CacheStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::with_producer_version(
            Some(dir.path().to_path_buf()),
            ProducerVersion::from_seed(" 1700000000"),
        );
        (dir, store)
    }

    #[test]
    fn write_then_read_roundtrip() {
        let (_dir, store) = make_store();
        let artifact = storage("src/Parser.php");
        store
            .write("src/Parser.php", b"<?php class Parser {}", &artifact)
            .unwrap();

        let back: Option<FileStorage> = store
            .read("src/Parser.php", b"<?php class Parser {}")
            .unwrap();
        assert_eq!(back, Some(artifact));
    }

    #[test]
    fn read_unknown_is_miss() {
        let (_dir, store) = make_store();
        let back: Option<FileStorage> = store.read("never-written", b"anything").unwrap();
        assert!(back.is_none());
    }

    #[test]
    fn changed_content_deletes_entry() {
        let (_dir, store) = make_store();
        store.write("a.php", b"v1", &storage("a.php")).unwrap();
        let path = store.entry_path("a.php").unwrap();
        assert!(path.exists());

        let back: Option<FileStorage> = store.read("a.php", b"v2").unwrap();
        assert!(back.is_none());
        assert!(!path.exists());
    }

    #[test]
    fn stale_read_twice_is_safe() {
        let (_dir, store) = make_store();
        store.write("a.php", b"v1", &storage("a.php")).unwrap();

        let first: Option<FileStorage> = store.read("a.php", b"v2").unwrap();
        let second: Option<FileStorage> = store.read("a.php", b"v2").unwrap();
        assert!(first.is_none());
        assert!(second.is_none());
    }

    #[test]
    fn identity_case_is_ignored() {
        let (_dir, store) = make_store();
        store.write("Foo.txt", b"same", &storage("Foo.txt")).unwrap();
        let back: Option<FileStorage> = store.read("foo.TXT", b"same").unwrap();
        assert_eq!(back, Some(storage("Foo.txt")));
        assert_eq!(
            store.entry_path("Foo.txt").unwrap(),
            store.entry_path("foo.TXT").unwrap()
        );
    }

    #[test]
    fn producer_change_invalidates() {
        let (dir, store) = make_store();
        store.write("a.php", b"same", &storage("a.php")).unwrap();

        let upgraded = CacheStore::with_producer_version(
            Some(dir.path().to_path_buf()),
            ProducerVersion::from_seed(" 1700000999"),
        );
        let back: Option<FileStorage> = upgraded.read("a.php", b"same").unwrap();
        assert!(back.is_none());
        assert!(!upgraded.entry_path("a.php").unwrap().exists());
    }

    #[test]
    fn entry_path_layout() {
        let (dir, store) = make_store();
        let path = store.entry_path("abc").unwrap();
        assert_eq!(
            path,
            dir.path()
                .join(FILE_CACHE_DIRECTORY)
                .join("a9993e364706816aba3e25717850c26c9cd0d89d")
        );
    }

    #[test]
    fn write_creates_directory_tree() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("cache");
        let store =
            CacheStore::with_producer_version(Some(root.clone()), ProducerVersion::default());
        store.write("a.php", b"x", &storage("a.php")).unwrap();
        assert!(root.join(FILE_CACHE_DIRECTORY).is_dir());
    }

    #[test]
    fn write_leaves_no_temp_file() {
        let (_dir, store) = make_store();
        store.write("a.php", b"x", &storage("a.php")).unwrap();
        let files = list_files(&store.cache_dir().unwrap()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].extension().is_none());
    }

    #[test]
    fn overwrite_replaces_entry() {
        let (_dir, store) = make_store();
        store.write("a.php", b"v1", &storage("old")).unwrap();
        store.write("a.php", b"v2", &storage("new")).unwrap();

        let back: Option<FileStorage> = store.read("a.php", b"v2").unwrap();
        assert_eq!(back, Some(storage("new")));
        assert_eq!(store.stats().unwrap().entries, 1);
    }

    #[test]
    fn write_returns_stored_fingerprint() {
        let (_dir, store) = make_store();
        let fp = store.write("A.php", b"body", &storage("a")).unwrap();
        assert_eq!(fp, store.fingerprint(&Identity::new("a.php"), b"body"));
    }

    #[test]
    fn unconfigured_store_errors() {
        let store = CacheStore::with_producer_version(None, ProducerVersion::default());
        assert!(matches!(
            store.write("a", b"x", &storage("a")),
            Err(CacheError::NotConfigured)
        ));
        assert!(matches!(
            store.read::<FileStorage>("a", b"x"),
            Err(CacheError::NotConfigured)
        ));
        assert!(matches!(store.clear(), Err(CacheError::NotConfigured)));
    }

    #[test]
    fn empty_root_is_unconfigured() {
        let store =
            CacheStore::with_producer_version(Some(PathBuf::new()), ProducerVersion::default());
        assert!(matches!(store.cache_dir(), Err(CacheError::NotConfigured)));
    }

    #[test]
    fn empty_identity_rejected() {
        let (_dir, store) = make_store();
        assert!(matches!(
            store.write("", b"x", &storage("")),
            Err(CacheError::EmptyIdentity)
        ));
    }

    #[test]
    fn corrupt_entry_reads_as_miss_and_is_kept() {
        let (_dir, store) = make_store();
        store.write("a.php", b"x", &storage("a.php")).unwrap();
        let path = store.entry_path("a.php").unwrap();
        fs::write(&path, b"garbage data").unwrap();

        let back: Option<FileStorage> = store.read("a.php", b"x").unwrap();
        assert!(back.is_none());
        assert!(path.exists());
        assert_eq!(store.probe("a.php", b"x").unwrap(), EntryStatus::Corrupt);
    }

    #[test]
    fn wrong_artifact_type_reads_as_miss() {
        let (_dir, store) = make_store();
        store.write("a.php", b"x", "plain string").unwrap();
        let back: Option<FileStorage> = store.read("a.php", b"x").unwrap();
        assert!(back.is_none());
    }

    #[test]
    fn probe_reports_each_status() {
        let (_dir, store) = make_store();
        assert_eq!(store.probe("a.php", b"v1").unwrap(), EntryStatus::Missing);

        store.write("a.php", b"v1", &storage("a.php")).unwrap();
        assert_eq!(store.probe("a.php", b"v1").unwrap(), EntryStatus::Fresh);
        assert_eq!(store.probe("a.php", b"v2").unwrap(), EntryStatus::Stale);

        // probing never deletes
        assert!(store.entry_path("a.php").unwrap().exists());
    }

    #[test]
    fn invalidate_removes_entry() {
        let (_dir, store) = make_store();
        store.write("a.php", b"x", &storage("a.php")).unwrap();
        assert!(store.invalidate("A.PHP").unwrap());
        assert!(!store.invalidate("a.php").unwrap());
        assert_eq!(store.probe("a.php", b"x").unwrap(), EntryStatus::Missing);
    }

    #[test]
    fn clear_and_stats() {
        let (_dir, store) = make_store();
        assert_eq!(store.stats().unwrap(), CacheStats::default());
        assert_eq!(store.clear().unwrap(), 0);

        store.write("a.php", b"a", &storage("a.php")).unwrap();
        store.write("b.php", b"b", &storage("b.php")).unwrap();
        let stats = store.stats().unwrap();
        assert_eq!(stats.entries, 2);
        assert!(stats.total_bytes > 0);

        assert_eq!(store.clear().unwrap(), 2);
        assert_eq!(store.stats().unwrap().entries, 0);
    }

    #[test]
    fn stats_skip_temp_files() {
        let (_dir, store) = make_store();
        store.write("a.php", b"a", &storage("a.php")).unwrap();
        let dir = store.cache_dir().unwrap();
        fs::write(dir.join("deadbeef.tmp"), b"partial").unwrap();
        assert_eq!(store.stats().unwrap().entries, 1);
    }

    #[test]
    fn clear_counts_entries_not_temp_files() {
        let (_dir, store) = make_store();
        store.write("a.php", b"a", &storage("a.php")).unwrap();
        let dir = store.cache_dir().unwrap();
        fs::write(dir.join("deadbeef.tmp"), b"partial").unwrap();

        assert_eq!(store.stats().unwrap().entries, 1);
        assert_eq!(store.clear().unwrap(), 1);
        assert!(list_files(&dir).unwrap().is_empty());
    }

    #[test]
    fn write_onto_directory_fails_without_temp_leftover() {
        let (_dir, store) = make_store();
        let path = store.entry_path("a.php").unwrap();
        fs::create_dir_all(&path).unwrap();

        let err = store.write("a.php", b"x", &storage("a.php")).unwrap_err();
        assert!(matches!(err, CacheError::Io { .. }));
        assert!(list_files(&store.cache_dir().unwrap()).unwrap().is_empty());
        assert!(path.is_dir());
    }

    #[test]
    fn write_under_file_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("not-a-dir");
        fs::write(&root, b"plain file").unwrap();
        let store = CacheStore::with_producer_version(Some(root), ProducerVersion::default());

        let err = store.write("a.php", b"x", &storage("a.php")).unwrap_err();
        assert!(matches!(err, CacheError::Io { .. }));
    }

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot encode"))
        }
    }

    #[test]
    fn unencodable_artifact_is_not_written() {
        let (_dir, store) = make_store();
        let err = store.write("a.php", b"x", &Unencodable).unwrap_err();
        assert!(matches!(err, CacheError::Serialization { .. }));
        assert!(!store.entry_path("a.php").unwrap().exists());
        assert!(list_files(&store.cache_dir().unwrap()).unwrap().is_empty());
    }

    #[test]
    fn status_display() {
        assert_eq!(EntryStatus::Missing.to_string(), "missing");
        assert_eq!(EntryStatus::Fresh.to_string(), "fresh");
        assert_eq!(EntryStatus::Stale.to_string(), "stale");
        assert_eq!(EntryStatus::Corrupt.to_string(), "corrupt");
    }

    #[test]
    fn new_reads_schema_files() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("file_storage.rs");
        fs::write(&schema, "pub struct FileStorage;").unwrap();
        let config = CacheConfig::new(dir.path().join("cache"), vec![schema]);

        let store = CacheStore::new(&config).unwrap();
        assert!(store.producer_version().seed().starts_with(' '));
    }

    #[test]
    fn new_fails_on_missing_schema_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = CacheConfig::new(
            dir.path().join("cache"),
            vec![dir.path().join("missing.rs")],
        );
        assert!(matches!(
            CacheStore::new(&config),
            Err(CacheError::MissingSchemaFile { .. })
        ));
    }
}
