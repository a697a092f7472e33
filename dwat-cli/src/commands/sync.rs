//! `dwat sync` — open a pull request for every missing or drifted dashboard.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use dwat_core::DriftReason;
use dwat_sync::{
    pipeline::{self, Outcome, RunMode},
    GithubClient, GrafanaClient,
};

use super::config::ConfigArgs;

/// Arguments for `dwat sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Print the change each pull request would make instead of opening it.
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let dry_run = self.dry_run;
        let config = self.config.into_config();
        let grafana = GrafanaClient::new(&config);
        let github = GithubClient::new(&config);

        let plan = pipeline::plan(&config, &grafana, &github)
            .with_context(|| format!("failed to compare Grafana with {}", config.github_repo))?;
        if plan.is_up_to_date() {
            println!("All dashboards in Grafana are up-to-date on GitHub.");
            return Ok(());
        }

        let mode = if dry_run {
            println!("[dry-run] Pull Requests that would be created:");
            RunMode::DryRun
        } else {
            println!("Creating Pull Requests for missing or different dashboards...");
            RunMode::Publish
        };

        let outcomes = pipeline::execute(&config, &plan, &github, mode, print_outcome)
            .context("sync aborted; pull requests listed above were created")?;

        let prefix = if dry_run { "[dry-run] " } else { "" };
        println!("{prefix}✓ {} dashboard(s) processed", outcomes.len());
        Ok(())
    }
}

fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Published(change) => {
            println!("PR created: {}", change.url);
        }
        Outcome::WouldPublish(change) => {
            println!(
                "  {} {} ({})",
                reason_label(change.reason),
                change.pull_request_title,
                change.branch
            );
            println!("    commit: {}", change.commit_message);
            print!("{}", change.unified_diff);
            if !change.unified_diff.ends_with('\n') {
                println!();
            }
        }
    }
}

fn reason_label(reason: DriftReason) -> String {
    match reason {
        DriftReason::Missing => "missing".yellow().bold().to_string(),
        DriftReason::Different => "different".cyan().bold().to_string(),
    }
}
