//! `strata key` and `strata check`: read-only views of cache entries.

use strata_cache::EntryStatus;
use strata_common::{CacheKey, Identity};

use crate::project::open_store;
use crate::{CheckArgs, GlobalArgs};

/// Runs the `strata key` command.
///
/// Prints the normalized identity, its cache key and the entry path.
pub fn run_key(identity: &str, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let store = open_store(global)?;
    let path = store.entry_path(identity)?;
    let normalized = Identity::new(identity);

    println!("identity: {normalized}");
    println!("key:      {}", CacheKey::for_identity(&normalized));
    println!("path:     {}", path.display());
    Ok(0)
}

/// Runs the `strata check` command.
///
/// Reads the file's current content and probes its entry without modifying
/// the cache. Returns exit code 0 if the entry is fresh, 1 otherwise.
pub fn run_check(args: &CheckArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let store = open_store(global)?;
    let content = std::fs::read(&args.file)
        .map_err(|e| format!("failed to read {}: {e}", args.file))?;
    let identity = args.identity.as_deref().unwrap_or(&args.file);

    let status = store.probe(identity, &content)?;
    if !global.quiet {
        println!("{status}");
    }
    Ok(exit_code(status))
}

fn exit_code(status: EntryStatus) -> i32 {
    match status {
        EntryStatus::Fresh => 0,
        EntryStatus::Missing | EntryStatus::Stale | EntryStatus::Corrupt => 1,
    }
}
