//! `dwat diff` — show which dashboards a sync would open pull requests for.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use dwat_sync::{pipeline, GithubClient, GrafanaClient};

use super::config::ConfigArgs;

/// Arguments for `dwat diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct DriftJson {
    uid: String,
    title: String,
    reason: String,
    folder_uid: String,
    folder_title: String,
    tags: Vec<String>,
    branch: String,
}

#[derive(Tabled)]
struct DriftRow {
    #[tabled(rename = "uid")]
    uid: String,
    #[tabled(rename = "title")]
    title: String,
    #[tabled(rename = "folder")]
    folder: String,
    #[tabled(rename = "tags")]
    tags: String,
    #[tabled(rename = "reason")]
    reason: String,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let config = self.config.into_config();
        let grafana = GrafanaClient::new(&config);
        let github = GithubClient::new(&config);

        let plan = pipeline::plan(&config, &grafana, &github)
            .with_context(|| format!("failed to compare Grafana with {}", config.github_repo))?;

        if self.json {
            let payload: Vec<DriftJson> = plan
                .drifts
                .iter()
                .map(|d| DriftJson {
                    uid: d.uid.clone(),
                    title: d.entry.title.clone(),
                    reason: d.reason.to_string(),
                    folder_uid: d.entry.folder_uid.clone(),
                    folder_title: d.entry.folder_title.clone(),
                    tags: d.entry.tags.clone(),
                    branch: config.branch_name(&d.uid),
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize drift JSON")?
            );
            return Ok(());
        }

        println!(
            "dwat v{} | {} tagged dashboards in Grafana | {} to sync into {}:{}",
            env!("CARGO_PKG_VERSION"),
            plan.remote.len(),
            plan.drifts.len(),
            config.github_repo,
            config.values_path(),
        );
        if plan.is_up_to_date() {
            println!("All dashboards in Grafana are up-to-date on GitHub.");
            return Ok(());
        }

        let rows: Vec<DriftRow> = plan
            .drifts
            .iter()
            .map(|d| DriftRow {
                uid: d.uid.clone(),
                title: d.entry.title.clone(),
                folder: d.entry.folder_title.clone(),
                tags: d.entry.tags.join(", "),
                reason: d.reason.to_string(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        println!("Run 'dwat sync' to open pull requests.");
        Ok(())
    }
}
