//! # dwat-sync
//!
//! Grafana → GitHub reconciliation: remote listing, repository read,
//! drift detection and pull request publishing.
//!
//! Call [`pipeline::plan`] to compute what drifted, or [`pipeline::run`] to
//! also open one pull request per drifted dashboard.

pub mod diff;
pub mod drift;
pub mod error;
pub mod github;
pub mod grafana;
mod http;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod pipeline;
pub mod publisher;

pub use diff::{preview, PreviewChange};
pub use drift::{classify, detect_drift};
pub use error::SyncError;
pub use github::{
    read_repository_state, FileUpdate, GithubClient, PullRequest, PullRequestDraft, RepoFile,
    RepositoryHost,
};
pub use grafana::{fetch_definition, list_dashboards, DashboardSource, GrafanaClient};
pub use pipeline::{Outcome, RunMode, SyncPlan};
pub use publisher::{publish, PublishedChange};
