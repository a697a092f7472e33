//! dwat — open pull requests for Grafana dashboards missing from a Helm chart.
//!
//! # Usage
//!
//! ```text
//! dwat sync [--dry-run]
//! dwat diff [--json]
//! ```
//!
//! Connection settings come from flags or the environment (`GRAFANA_API_URL`,
//! `GRAFANA_API_TOKEN`, `GITHUB_TOKEN`, `GITHUB_REPO_NAME`, `FOLDER_NAME`,
//! `FILE_NAME`, `BRANCH_PREFIX`, `TIMEOUT`, ...). A `.env` file in the working
//! directory is loaded first.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use commands::{diff::DiffArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "dwat",
    version,
    about = "Keep Grafana dashboards and their Helm values file in sync",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open one pull request per missing or drifted dashboard.
    Sync(SyncArgs),

    /// List dashboards that differ between Grafana and the repository.
    Diff(DiffArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    load_dotenv()?;
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Diff(args) => args.run(),
    }
}

/// A missing `.env` is fine; one that exists but does not parse is not.
fn load_dotenv() -> Result<()> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(err).context("failed to load .env"),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
