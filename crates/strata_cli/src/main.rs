//! strata CLI: inspection and maintenance of a strata artifact cache.
//!
//! Provides `strata key` to show where an identity is cached, `strata check`
//! to test whether a file's entry is still fresh, `strata stats` for entry
//! counts, and `strata clear` / `strata invalidate` to remove entries.

#![warn(missing_docs)]

mod inspect;
mod maintain;
mod project;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use strata_config::CACHE_DIR_ENV;
use tracing_subscriber::EnvFilter;

/// strata: a fingerprinted cache for derived analysis artifacts.
#[derive(Parser, Debug)]
#[command(name = "strata", version, about = "Strata artifact cache")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a `strata.toml` file or the directory containing it.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the cache key and entry path for an identity.
    Key {
        /// Logical identity (usually a source path).
        identity: String,
    },
    /// Report whether a file's cache entry is fresh.
    Check(CheckArgs),
    /// Show entry count and disk usage.
    Stats {
        /// Output format.
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
    /// Remove every cache entry.
    Clear,
    /// Remove the entry for one identity.
    Invalidate {
        /// Logical identity (usually a source path).
        identity: String,
    },
}

/// Arguments for the `strata check` subcommand.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Source file whose current content is checked against the cache.
    pub file: String,

    /// Identity the file is cached under (default: the path as given).
    #[arg(long)]
    pub identity: Option<String>,
}

/// Output format for reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Optional path to a config file or directory.
    pub config: Option<String>,
    /// Cache root taken from `STRATA_CACHE_DIR`, overriding the config file.
    pub cache_dir_override: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let global = GlobalArgs {
        quiet: cli.quiet,
        config: cli.config,
        cache_dir_override: std::env::var(CACHE_DIR_ENV).ok(),
    };

    let result = match cli.command {
        Command::Key { ref identity } => inspect::run_key(identity, &global),
        Command::Check(ref args) => inspect::run_check(args, &global),
        Command::Stats { format } => maintain::run_stats(format, &global),
        Command::Clear => maintain::run_clear(&global),
        Command::Invalidate { ref identity } => maintain::run_invalidate(identity, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` wins over the flags.
fn init_logging(quiet: bool, verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match (quiet, verbose) {
            (true, _) => "strata_cache=error,strata_cli=error",
            (false, true) => "strata_cache=debug,strata_cli=debug",
            (false, false) => "strata_cache=warn,strata_cli=warn",
        })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
