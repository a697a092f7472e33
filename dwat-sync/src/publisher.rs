//! Branch + commit + pull request for one drifted dashboard.
//!
//! There is no rollback: a failure after the branch is created leaves the
//! branch behind.

use dwat_core::{DriftReason, DriftRecord, SyncConfig, ValuesDocument};

use crate::github::{FileUpdate, PullRequestDraft, RepositoryHost};
use crate::SyncError;

/// A pull request opened for one drift record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedChange {
    pub reason: DriftReason,
    pub uid: String,
    pub branch: String,
    pub number: u64,
    pub url: String,
}

/// Open a pull request that writes `updated` to the values file.
///
/// 1. Branch `{prefix}{uid}` off the base branch tip.
/// 2. Read the values file sha from the base branch.
/// 3. Commit the serialized document to the new branch.
/// 4. Open the pull request into the base branch.
///
/// An existing branch fails with [`SyncError::BranchExists`].
pub fn publish(
    repo: &dyn RepositoryHost,
    config: &SyncConfig,
    drift: &DriftRecord,
    updated: &ValuesDocument,
) -> Result<PublishedChange, SyncError> {
    let branch = config.branch_name(&drift.uid);
    let path = config.values_path();

    let head = repo.branch_head(&config.base_branch)?;
    repo.create_branch(&branch, &head)?;
    tracing::debug!(%branch, %head, "branch created");

    let current = repo.read_file(&path, &config.base_branch)?;
    repo.update_file(&FileUpdate {
        path,
        message: drift.commit_message(),
        content: updated.to_yaml()?,
        sha: current.sha,
        branch: branch.clone(),
    })?;

    let pr = repo.open_pull_request(&PullRequestDraft {
        title: drift.pull_request_title(),
        body: drift.pull_request_body(),
        head: branch.clone(),
        base: config.base_branch.clone(),
    })?;
    tracing::info!(uid = %drift.uid, url = %pr.html_url, "pull request created");

    Ok(PublishedChange {
        reason: drift.reason,
        uid: drift.uid.clone(),
        branch,
        number: pr.number,
        url: pr.html_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockRepositoryHost;
    use dwat_core::RecordedDashboard;

    const PATH: &str = "charts/grafana/values.yaml";

    fn config() -> SyncConfig {
        let mut cfg = SyncConfig::new("http://grafana/api", "g", "gh", "acme/charts");
        cfg.folder_name = "charts/grafana".to_string();
        cfg
    }

    fn drift() -> DriftRecord {
        DriftRecord {
            reason: DriftReason::Missing,
            uid: "u1".to_string(),
            entry: RecordedDashboard {
                title: "Latency".to_string(),
                tags: vec!["v1".to_string()],
                folder_uid: "f1".to_string(),
                folder_title: "Team".to_string(),
                json: "{}".to_string(),
            },
        }
    }

    #[test]
    fn publishes_branch_commit_and_pull_request() {
        let repo = MockRepositoryHost::new("main").with_file(PATH, "dashboards: {}\n");
        let original = ValuesDocument::parse(PATH, "dashboards: {}\n").expect("parse");
        let updated = original.with_dashboard(&drift()).expect("merge");

        let published = publish(&repo, &config(), &drift(), &updated).expect("publish");

        assert_eq!(published.branch, "update-dashboard-u1");
        assert_eq!(published.url, "https://github.test/acme/charts/pull/1");

        let updates = repo.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].message, "missing: Update dashboard Latency in Team");
        assert_eq!(updates[0].branch, "update-dashboard-u1");
        assert_eq!(
            repo.file_text("update-dashboard-u1", PATH),
            Some(updated.to_yaml().expect("yaml"))
        );
        assert_eq!(repo.file_text("main", PATH).as_deref(), Some("dashboards: {}\n"));

        let pulls = repo.pull_requests();
        assert_eq!(pulls[0].title, "missing: Latency");
        assert_eq!(pulls[0].head, "update-dashboard-u1");
        assert_eq!(pulls[0].base, "main");
        assert!(pulls[0].body.contains("`u1`"));
    }

    #[test]
    fn existing_branch_aborts_before_commit() {
        let repo = MockRepositoryHost::new("main")
            .with_file(PATH, "dashboards: {}\n")
            .with_branch("update-dashboard-u1");
        let updated = ValuesDocument::parse(PATH, "dashboards: {}\n")
            .expect("parse")
            .with_dashboard(&drift())
            .expect("merge");

        let err = publish(&repo, &config(), &drift(), &updated).unwrap_err();
        assert!(matches!(err, SyncError::BranchExists { .. }), "got: {err}");
        assert!(repo.updates().is_empty());
        assert!(repo.pull_requests().is_empty());
    }

    #[test]
    fn missing_file_leaves_branch_behind() {
        let repo = MockRepositoryHost::new("main");
        let updated = ValuesDocument::parse(PATH, "dashboards: {}\n")
            .expect("parse")
            .with_dashboard(&drift())
            .expect("merge");

        let err = publish(&repo, &config(), &drift(), &updated).unwrap_err();
        assert!(matches!(err, SyncError::FileNotFound { .. }), "got: {err}");
        assert!(repo.branches().contains(&"update-dashboard-u1".to_string()));
    }
}
