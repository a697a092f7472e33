//! Connection settings shared by every subcommand.

use std::time::Duration;

use clap::Args;

use dwat_core::config::{
    DEFAULT_BASE_BRANCH, DEFAULT_BRANCH_PREFIX, DEFAULT_FILE_NAME, DEFAULT_GITHUB_API_URL,
};
use dwat_core::SyncConfig;

/// Grafana and GitHub endpoints, from flags or environment variables.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Grafana HTTP API base URL, e.g. https://grafana.example.com/api.
    #[arg(long, env = "GRAFANA_API_URL")]
    pub grafana_url: String,

    /// Grafana service account token.
    #[arg(long, env = "GRAFANA_API_TOKEN", hide_env_values = true)]
    pub grafana_token: String,

    /// GitHub token allowed to push branches and open pull requests.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: String,

    /// Target repository as owner/name.
    #[arg(long = "repo", env = "GITHUB_REPO_NAME")]
    pub github_repo: String,

    /// GitHub REST API base URL (GitHub Enterprise installs differ).
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_GITHUB_API_URL)]
    pub github_api_url: String,

    /// Directory of the values file inside the repository.
    #[arg(long = "folder", env = "FOLDER_NAME", default_value = "")]
    pub folder_name: String,

    /// Name of the values file.
    #[arg(long = "file", env = "FILE_NAME", default_value = DEFAULT_FILE_NAME)]
    pub file_name: String,

    /// Prefix for pull request branches; the dashboard uid is appended.
    #[arg(long, env = "BRANCH_PREFIX", default_value = DEFAULT_BRANCH_PREFIX)]
    pub branch_prefix: String,

    /// Branch the values file is read from and pull requests target.
    #[arg(long, env = "BASE_BRANCH", default_value = DEFAULT_BASE_BRANCH)]
    pub base_branch: String,

    /// Per-request timeout in seconds.
    #[arg(long, env = "TIMEOUT", default_value_t = 30)]
    pub timeout: u64,
}

impl ConfigArgs {
    pub fn into_config(self) -> SyncConfig {
        SyncConfig {
            grafana_url: self.grafana_url,
            grafana_token: self.grafana_token,
            github_api_url: self.github_api_url,
            github_token: self.github_token,
            github_repo: self.github_repo,
            folder_name: self.folder_name,
            file_name: self.file_name,
            branch_prefix: self.branch_prefix,
            base_branch: self.base_branch,
            timeout: Duration::from_secs(self.timeout),
        }
    }
}
