//! autorun: manage programs that start when you sign in to Windows.
//!
//! # Usage
//!
//! ```text
//! autorun [--cache <PATH>] [-v...]
//! ```
//!
//! Opens an interactive menu (add program, remove, status, add command,
//! enable, disable, exit) over the `HKCU\...\CurrentVersion\Run` key. A JSON
//! cache beside the executable remembers disabled entries.

mod commands;
mod prompt;
mod shell;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use autorun_core::{paths, JsonCacheStore, Reconciler};

use prompt::Prompt;
use shell::Shell;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "autorun",
    version,
    about = "Manage programs that start when you sign in to Windows",
    long_about = None,
)]
struct Cli {
    /// Cache file to use instead of autostart.json beside the executable.
    #[arg(long, value_name = "PATH")]
    cache: Option<PathBuf>,

    /// Log more to stderr (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let run_key = open_run_key()?;
    let cache_path = match cli.cache {
        Some(path) => path,
        None => paths::default_cache_path()
            .context("could not locate the cache file beside the executable")?,
    };
    tracing::debug!(cache = %cache_path.display(), "using cache file");

    let reconciler = Reconciler::new(run_key, JsonCacheStore::new(cache_path));
    let stdin = io::stdin();
    let mut shell = Shell::new(Prompt::new(stdin.lock(), io::stdout()), reconciler);
    shell.run().context("console I/O failed")
}

#[cfg(windows)]
fn open_run_key() -> Result<autorun_core::WindowsRunKey> {
    Ok(autorun_core::WindowsRunKey::open())
}

#[cfg(not(windows))]
fn open_run_key() -> Result<autorun_core::MemoryRunKey> {
    anyhow::bail!(
        "the HKCU Run key ({}) is only available on Windows",
        paths::RUN_KEY_PATH
    )
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}
