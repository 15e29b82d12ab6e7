//! `strata stats`, `strata clear` and `strata invalidate`.

use crate::project::open_store;
use crate::{GlobalArgs, ReportFormat};

/// Runs the `strata stats` command.
pub fn run_stats(
    format: ReportFormat,
    global: &GlobalArgs,
) -> Result<i32, Box<dyn std::error::Error>> {
    let store = open_store(global)?;
    let stats = store.stats()?;

    match format {
        ReportFormat::Text => {
            println!("directory: {}", store.cache_dir()?.display());
            println!("entries:   {}", stats.entries);
            println!("bytes:     {}", stats.total_bytes);
        }
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&stats)?;
            println!("{json}");
        }
    }
    Ok(0)
}

/// Runs the `strata clear` command.
pub fn run_clear(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let store = open_store(global)?;
    let removed = store.clear()?;
    if !global.quiet {
        eprintln!("     Removed {removed} cache files");
    }
    Ok(0)
}

/// Runs the `strata invalidate` command.
///
/// Returns exit code 0 whether or not an entry existed.
pub fn run_invalidate(
    identity: &str,
    global: &GlobalArgs,
) -> Result<i32, Box<dyn std::error::Error>> {
    let store = open_store(global)?;
    let removed = store.invalidate(identity)?;
    if !global.quiet {
        if removed {
            eprintln!(" Invalidated {identity}");
        } else {
            eprintln!("     No entry for {identity}");
        }
    }
    Ok(0)
}
