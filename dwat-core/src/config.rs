//! Run configuration.
//!
//! Built once at process start (the CLI fills it from flags and environment
//! variables) and passed by reference into every component.

use std::fmt;
use std::time::Duration;

pub const DEFAULT_FILE_NAME: &str = "values.yaml";
pub const DEFAULT_BRANCH_PREFIX: &str = "update-dashboard-";
pub const DEFAULT_BASE_BRANCH: &str = "main";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything a reconciliation run needs to know about its two endpoints.
#[derive(Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Grafana HTTP API base, e.g. `https://grafana.example.com/api`.
    pub grafana_url: String,
    pub grafana_token: String,
    pub github_api_url: String,
    pub github_token: String,
    /// `owner/name`.
    pub github_repo: String,
    /// Directory of the values file inside the repository; empty for the root.
    pub folder_name: String,
    pub file_name: String,
    pub branch_prefix: String,
    pub base_branch: String,
    /// Applied independently to every HTTP request.
    pub timeout: Duration,
}

impl SyncConfig {
    /// A config with every optional field at its default.
    pub fn new(
        grafana_url: impl Into<String>,
        grafana_token: impl Into<String>,
        github_token: impl Into<String>,
        github_repo: impl Into<String>,
    ) -> Self {
        Self {
            grafana_url: grafana_url.into(),
            grafana_token: grafana_token.into(),
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            github_token: github_token.into(),
            github_repo: github_repo.into(),
            folder_name: String::new(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            branch_prefix: DEFAULT_BRANCH_PREFIX.to_string(),
            base_branch: DEFAULT_BASE_BRANCH.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// `{folder}/{file}`, or just `{file}` when no folder is configured.
    pub fn values_path(&self) -> String {
        let folder = self.folder_name.trim_matches('/');
        if folder.is_empty() {
            self.file_name.clone()
        } else {
            format!("{folder}/{}", self.file_name)
        }
    }

    /// Branch a pull request for `uid` is opened from.
    pub fn branch_name(&self, uid: &str) -> String {
        format!("{}{uid}", self.branch_prefix)
    }
}

impl fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfig")
            .field("grafana_url", &self.grafana_url)
            .field("grafana_token", &"<redacted>")
            .field("github_api_url", &self.github_api_url)
            .field("github_token", &"<redacted>")
            .field("github_repo", &self.github_repo)
            .field("folder_name", &self.folder_name)
            .field("file_name", &self.file_name)
            .field("branch_prefix", &self.branch_prefix)
            .field("base_branch", &self.base_branch)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn config() -> SyncConfig {
        SyncConfig::new("http://grafana/api", "g-secret", "gh-secret", "acme/charts")
    }

    #[rstest]
    #[case("charts/grafana", "charts/grafana/values.yaml")]
    #[case("charts/grafana/", "charts/grafana/values.yaml")]
    #[case("", "values.yaml")]
    fn values_path_joins_folder_and_file(#[case] folder: &str, #[case] expected: &str) {
        let mut cfg = config();
        cfg.folder_name = folder.to_string();
        assert_eq!(cfg.values_path(), expected);
    }

    #[test]
    fn branch_name_uses_prefix() {
        assert_eq!(config().branch_name("u1"), "update-dashboard-u1");
    }

    #[test]
    fn defaults() {
        let cfg = config();
        assert_eq!(cfg.base_branch, "main");
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert_eq!(cfg.github_api_url, "https://api.github.com");
    }

    #[test]
    fn debug_redacts_tokens() {
        let rendered = format!("{:?}", config());
        assert!(!rendered.contains("g-secret"));
        assert!(!rendered.contains("gh-secret"));
        assert!(rendered.contains("acme/charts"));
    }
}
