//! In-memory [`DashboardSource`] and [`RepositoryHost`] for tests.
//!
//! Both record the calls made against them so tests can assert on what a run
//! fetched, branched, committed and opened.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde_json::{json, Value};

use dwat_core::DashboardSummary;

use crate::github::{FileUpdate, PullRequest, PullRequestDraft, RepoFile, RepositoryHost};
use crate::grafana::DashboardSource;
use crate::SyncError;

// ---------------------------------------------------------------------------
// Grafana
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MockDashboardSource {
    hits: Vec<DashboardSummary>,
    definitions: HashMap<String, Value>,
    failing: BTreeSet<String>,
    search_fails: bool,
    fetched: RefCell<Vec<String>>,
}

impl MockDashboardSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hit(mut self, hit: DashboardSummary) -> Self {
        self.hits.push(hit);
        self
    }

    /// Model served for `uid`. Unregistered uids get `{"uid": <uid>}`.
    pub fn with_definition(mut self, uid: &str, model: Value) -> Self {
        self.definitions.insert(uid.to_string(), model);
        self
    }

    pub fn failing_definition(mut self, uid: &str) -> Self {
        self.failing.insert(uid.to_string());
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.search_fails = true;
        self
    }

    /// Uids whose model was requested, in order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.borrow().clone()
    }
}

impl DashboardSource for MockDashboardSource {
    fn search(&self) -> Result<Vec<DashboardSummary>, SyncError> {
        if self.search_fails {
            return Err(SyncError::Status {
                url: "mock://grafana/search".to_string(),
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(self.hits.clone())
    }

    fn dashboard(&self, uid: &str) -> Result<Value, SyncError> {
        self.fetched.borrow_mut().push(uid.to_string());
        if self.failing.contains(uid) {
            return Err(SyncError::Status {
                url: format!("mock://grafana/dashboards/uid/{uid}"),
                status: 404,
                body: "Dashboard not found".to_string(),
            });
        }
        Ok(self
            .definitions
            .get(uid)
            .cloned()
            .unwrap_or_else(|| json!({ "uid": uid })))
    }
}

// ---------------------------------------------------------------------------
// GitHub
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct RepoState {
    /// branch -> head commit sha
    branches: BTreeMap<String, String>,
    /// (branch, path) -> file
    files: BTreeMap<(String, String), RepoFile>,
    updates: Vec<FileUpdate>,
    pulls: Vec<PullRequestDraft>,
    next_id: u64,
}

/// A repository with a single base branch and optimistic-concurrency checks
/// on file updates.
#[derive(Debug)]
pub struct MockRepositoryHost {
    base_branch: String,
    read_fails: bool,
    state: RefCell<RepoState>,
}

impl MockRepositoryHost {
    pub fn new(base_branch: &str) -> Self {
        let mut state = RepoState::default();
        state
            .branches
            .insert(base_branch.to_string(), "commit-0".to_string());
        Self {
            base_branch: base_branch.to_string(),
            read_fails: false,
            state: RefCell::new(state),
        }
    }

    /// Put `text` at `path` on the base branch.
    pub fn with_file(self, path: &str, text: &str) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            let sha = format!("blob-{}", state.next_id);
            state.files.insert(
                (self.base_branch.clone(), path.to_string()),
                RepoFile {
                    path: path.to_string(),
                    sha,
                    text: text.to_string(),
                },
            );
        }
        self
    }

    /// Pre-create a branch, as a previous run would have.
    pub fn with_branch(self, branch: &str) -> Self {
        self.state
            .borrow_mut()
            .branches
            .insert(branch.to_string(), "commit-old".to_string());
        self
    }

    /// Every read answers with a transport error.
    pub fn failing_reads(mut self) -> Self {
        self.read_fails = true;
        self
    }

    pub fn branches(&self) -> Vec<String> {
        self.state.borrow().branches.keys().cloned().collect()
    }

    pub fn updates(&self) -> Vec<FileUpdate> {
        self.state.borrow().updates.clone()
    }

    pub fn pull_requests(&self) -> Vec<PullRequestDraft> {
        self.state.borrow().pulls.clone()
    }

    /// Current text of `path` on `branch`.
    pub fn file_text(&self, branch: &str, path: &str) -> Option<String> {
        self.state
            .borrow()
            .files
            .get(&(branch.to_string(), path.to_string()))
            .map(|f| f.text.clone())
    }
}

impl RepositoryHost for MockRepositoryHost {
    fn read_file(&self, path: &str, branch: &str) -> Result<RepoFile, SyncError> {
        if self.read_fails {
            return Err(SyncError::Transport {
                url: format!("mock://github/contents/{path}"),
                message: "connection refused".to_string(),
            });
        }
        self.state
            .borrow()
            .files
            .get(&(branch.to_string(), path.to_string()))
            .cloned()
            .ok_or_else(|| SyncError::FileNotFound {
                path: path.to_string(),
                branch: branch.to_string(),
            })
    }

    fn branch_head(&self, branch: &str) -> Result<String, SyncError> {
        self.state
            .borrow()
            .branches
            .get(branch)
            .cloned()
            .ok_or_else(|| SyncError::Status {
                url: format!("mock://github/branches/{branch}"),
                status: 404,
                body: "Branch not found".to_string(),
            })
    }

    fn create_branch(&self, branch: &str, sha: &str) -> Result<(), SyncError> {
        let mut state = self.state.borrow_mut();
        if state.branches.contains_key(branch) {
            return Err(SyncError::BranchExists {
                branch: branch.to_string(),
            });
        }
        state.branches.insert(branch.to_string(), sha.to_string());
        let copied: Vec<_> = state
            .files
            .iter()
            .filter(|((b, _), _)| *b == self.base_branch)
            .map(|((_, path), file)| ((branch.to_string(), path.clone()), file.clone()))
            .collect();
        state.files.extend(copied);
        Ok(())
    }

    fn update_file(&self, update: &FileUpdate) -> Result<(), SyncError> {
        let mut state = self.state.borrow_mut();
        let key = (update.branch.clone(), update.path.clone());
        let current_sha = state.files.get(&key).map(|f| f.sha.clone());
        if current_sha.as_deref() != Some(update.sha.as_str()) {
            return Err(SyncError::Status {
                url: format!("mock://github/contents/{}", update.path),
                status: 409,
                body: format!("{} does not match", update.sha),
            });
        }
        state.next_id += 1;
        let sha = format!("blob-{}", state.next_id);
        state.files.insert(
            key,
            RepoFile {
                path: update.path.clone(),
                sha,
                text: update.content.clone(),
            },
        );
        state.updates.push(update.clone());
        Ok(())
    }

    fn open_pull_request(&self, draft: &PullRequestDraft) -> Result<PullRequest, SyncError> {
        let mut state = self.state.borrow_mut();
        if !state.branches.contains_key(&draft.head) {
            return Err(SyncError::Status {
                url: "mock://github/pulls".to_string(),
                status: 422,
                body: format!("head {} does not exist", draft.head),
            });
        }
        state.pulls.push(draft.clone());
        let number = state.pulls.len() as u64;
        Ok(PullRequest {
            number,
            html_url: format!("https://github.test/acme/charts/pull/{number}"),
        })
    }
}
