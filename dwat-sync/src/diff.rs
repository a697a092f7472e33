//! Dry-run previews for `dwat sync --dry-run`.

use similar::TextDiff;

use dwat_core::{DriftReason, DriftRecord, SyncConfig, ValuesDocument};

use crate::SyncError;

/// What [`crate::publish`] would do for one drift record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewChange {
    pub reason: DriftReason,
    pub uid: String,
    pub branch: String,
    pub commit_message: String,
    pub pull_request_title: String,
    pub unified_diff: String,
}

/// Describe the pull request for `drift` without touching the repository.
///
/// Both sides of the diff are re-serialized, so formatting differences in
/// the file on the base branch do not show up.
pub fn preview(
    config: &SyncConfig,
    original: &ValuesDocument,
    drift: &DriftRecord,
    updated: &ValuesDocument,
) -> Result<PreviewChange, SyncError> {
    let path = config.values_path();
    let before = original.to_yaml()?;
    let after = updated.to_yaml()?;
    let old_header = format!("a/{path}");
    let new_header = format!("b/{path}");
    let unified_diff = TextDiff::from_lines(&before, &after)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string();

    Ok(PreviewChange {
        reason: drift.reason,
        uid: drift.uid.clone(),
        branch: config.branch_name(&drift.uid),
        commit_message: drift.commit_message(),
        pull_request_title: drift.pull_request_title(),
        unified_diff,
    })
}
