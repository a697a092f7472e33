//! GitHub side: values file read, branch creation, file commit, pull request.
//!
//! Only the read of the values file fails soft (see
//! [`read_repository_state`]); every write error propagates.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::json;

use dwat_core::{SyncConfig, ValuesDocument};

use crate::http;
use crate::SyncError;

/// A file read from a branch, with the blob sha needed to overwrite it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoFile {
    pub path: String,
    pub sha: String,
    pub text: String,
}

/// A commit of `content` to `path` on `branch`, replacing blob `sha`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpdate {
    pub path: String,
    pub message: String,
    pub content: String,
    pub sha: String,
    pub branch: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestDraft {
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub html_url: String,
}

/// The repository operations a reconciliation run needs.
pub trait RepositoryHost {
    fn read_file(&self, path: &str, branch: &str) -> Result<RepoFile, SyncError>;

    /// Sha of the commit at the tip of `branch`.
    fn branch_head(&self, branch: &str) -> Result<String, SyncError>;

    /// Fails with [`SyncError::BranchExists`] if `branch` is already there.
    fn create_branch(&self, branch: &str, sha: &str) -> Result<(), SyncError>;

    fn update_file(&self, update: &FileUpdate) -> Result<(), SyncError>;

    fn open_pull_request(&self, draft: &PullRequestDraft) -> Result<PullRequest, SyncError>;
}

/// Blocking GitHub REST client scoped to one repository.
pub struct GithubClient {
    agent: ureq::Agent,
    repo_url: String,
    authorization: String,
}

const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";

#[derive(Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default = "base64_encoding")]
    encoding: String,
    #[serde(default)]
    content: String,
}

fn base64_encoding() -> String {
    "base64".to_string()
}

#[derive(Deserialize)]
struct BranchResponse {
    commit: CommitRef,
}

#[derive(Deserialize)]
struct CommitRef {
    sha: String,
}

impl GithubClient {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            agent: http::agent(config.timeout),
            repo_url: format!(
                "{}/repos/{}",
                http::trim_base(&config.github_api_url),
                config.github_repo
            ),
            authorization: format!("Bearer {}", config.github_token),
        }
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        self.request_accepting(method, url, JSON_MEDIA_TYPE)
    }

    fn request_accepting(&self, method: &str, url: &str, accept: &str) -> ureq::Request {
        self.agent
            .request(method, url)
            .set("Authorization", &self.authorization)
            .set("Accept", accept)
            .set("X-GitHub-Api-Version", "2022-11-28")
            .set("User-Agent", concat!("dwat/", env!("CARGO_PKG_VERSION")))
    }
}

impl RepositoryHost for GithubClient {
    fn read_file(&self, path: &str, branch: &str) -> Result<RepoFile, SyncError> {
        let url = format!("{}/contents/{path}", self.repo_url);
        let result = self.request("GET", &url).query("ref", branch).call();
        let response: ContentsResponse = match http::json(&url, result) {
            Err(err) if err.status() == Some(404) => {
                return Err(SyncError::FileNotFound {
                    path: path.to_string(),
                    branch: branch.to_string(),
                })
            }
            other => other?,
        };
        let text = match response.encoding.as_str() {
            "base64" => decode_content(path, &response.content)?,
            // Files over 1 MB come without inline content.
            "none" => {
                tracing::debug!(path, "contents API sent no inline content; reading raw");
                let result = self
                    .request_accepting("GET", &url, RAW_MEDIA_TYPE)
                    .query("ref", branch)
                    .call();
                http::check(&url, result)?
                    .into_string()
                    .map_err(|source| SyncError::Decode {
                        url: url.clone(),
                        source,
                    })?
            }
            other => {
                return Err(SyncError::UnsupportedEncoding {
                    path: path.to_string(),
                    encoding: other.to_string(),
                })
            }
        };
        Ok(RepoFile {
            path: path.to_string(),
            sha: response.sha,
            text,
        })
    }

    fn branch_head(&self, branch: &str) -> Result<String, SyncError> {
        let url = format!("{}/branches/{branch}", self.repo_url);
        let response: BranchResponse = http::json(&url, self.request("GET", &url).call())?;
        Ok(response.commit.sha)
    }

    fn create_branch(&self, branch: &str, sha: &str) -> Result<(), SyncError> {
        let url = format!("{}/git/refs", self.repo_url);
        let result = self.request("POST", &url).send_json(json!({
            "ref": format!("refs/heads/{branch}"),
            "sha": sha,
        }));
        match http::check(&url, result) {
            Ok(_) => Ok(()),
            Err(err) if err.status() == Some(422) => Err(SyncError::BranchExists {
                branch: branch.to_string(),
            }),
            Err(err) => Err(err),
        }
    }

    fn update_file(&self, update: &FileUpdate) -> Result<(), SyncError> {
        let url = format!("{}/contents/{}", self.repo_url, update.path);
        let result = self.request("PUT", &url).send_json(json!({
            "message": update.message,
            "content": STANDARD.encode(update.content.as_bytes()),
            "sha": update.sha,
            "branch": update.branch,
        }));
        http::check(&url, result).map(|_| ())
    }

    fn open_pull_request(&self, draft: &PullRequestDraft) -> Result<PullRequest, SyncError> {
        let url = format!("{}/pulls", self.repo_url);
        http::json(&url, self.request("POST", &url).send_json(draft))
    }
}

/// Decode the contents API's base64 payload, which is wrapped at 60 columns.
pub(crate) fn decode_content(path: &str, content: &str) -> Result<String, SyncError> {
    let compact: String = content.split_whitespace().collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|source| SyncError::Base64 {
            path: path.to_string(),
            source,
        })?;
    String::from_utf8(bytes).map_err(|source| SyncError::Utf8 {
        path: path.to_string(),
        source,
    })
}

/// Read and parse the values file from the base branch, failing loudly.
pub fn fetch_values_document(
    repo: &dyn RepositoryHost,
    config: &SyncConfig,
) -> Result<ValuesDocument, SyncError> {
    let path = config.values_path();
    let file = repo.read_file(&path, &config.base_branch)?;
    Ok(ValuesDocument::parse(&path, &file.text)?)
}

/// [`fetch_values_document`], degraded to an empty document on any failure.
///
/// An empty document has no `dashboards` key, so the run still stops before
/// opening pull requests; the log line says which kind of failure it was.
pub fn read_repository_state(repo: &dyn RepositoryHost, config: &SyncConfig) -> ValuesDocument {
    match fetch_values_document(repo, config) {
        Ok(document) => document,
        Err(err) => {
            let kind = match &err {
                SyncError::FileNotFound { .. } => "not found",
                SyncError::Core(_)
                | SyncError::Base64 { .. }
                | SyncError::Utf8 { .. }
                | SyncError::UnsupportedEncoding { .. } => "unreadable",
                _ => "request failed",
            };
            tracing::error!(
                path = %config.values_path(),
                kind,
                error = %err,
                "error fetching dashboards from GitHub"
            );
            ValuesDocument::empty()
        }
    }
}
