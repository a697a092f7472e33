//! Reconciliation entrypoint used by the CLI.
//!
//! ```text
//! list_dashboards ─┐
//!                  ├─> detect_drift ─> for each drift: with_dashboard ─> publish | preview
//! read_repository ─┘
//! ```

use dwat_core::{DriftRecord, RemoteDashboards, SyncConfig, ValuesDocument};

use crate::diff::{preview, PreviewChange};
use crate::drift::detect_drift;
use crate::github::{read_repository_state, RepositoryHost};
use crate::grafana::{list_dashboards, DashboardSource};
use crate::publisher::{publish, PublishedChange};
use crate::SyncError;

/// Whether a run writes to the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Open one pull request per drifted dashboard.
    Publish,
    /// Only describe the pull requests that would be opened.
    DryRun,
}

/// Outcome for one drift record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Published(PublishedChange),
    WouldPublish(PreviewChange),
}

/// Both sides of the comparison and what drifted.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub remote: RemoteDashboards,
    /// The values document as read from the base branch.
    pub document: ValuesDocument,
    pub drifts: Vec<DriftRecord>,
}

impl SyncPlan {
    pub fn is_up_to_date(&self) -> bool {
        self.drifts.is_empty()
    }

    /// Each drift paired with its own updated copy of the original document.
    ///
    /// Copies never see each other's changes, so every pull request is based
    /// on the base branch as it was read.
    pub fn changes(&self) -> impl Iterator<Item = Result<(&DriftRecord, ValuesDocument), SyncError>> {
        self.drifts.iter().map(|drift| {
            let updated = self.document.with_dashboard(drift)?;
            Ok((drift, updated))
        })
    }
}

/// Fetch both sides and compute the drift.
///
/// Fails with [`dwat_core::CoreError::MissingRootKey`] if the values
/// document could not be read or has no `dashboards` key.
pub fn plan(
    config: &SyncConfig,
    source: &dyn DashboardSource,
    repo: &dyn RepositoryHost,
) -> Result<SyncPlan, SyncError> {
    let remote = list_dashboards(source);
    let document = read_repository_state(repo, config);
    let drifts = detect_drift(&remote, document.dashboards()?, source)?;
    tracing::info!(
        remote = remote.len(),
        drifted = drifts.len(),
        "compared Grafana with {}",
        config.values_path()
    );
    Ok(SyncPlan {
        remote,
        document,
        drifts,
    })
}

/// Plan, then [`execute`] the plan.
pub fn run(
    config: &SyncConfig,
    source: &dyn DashboardSource,
    repo: &dyn RepositoryHost,
    mode: RunMode,
    on_outcome: impl FnMut(&Outcome),
) -> Result<Vec<Outcome>, SyncError> {
    let plan = plan(config, source, repo)?;
    execute(config, &plan, repo, mode, on_outcome)
}

/// Publish or preview every change of `plan` in order.
///
/// `on_outcome` sees each outcome as soon as it happens. The first error
/// stops the run; pull requests opened before it stay open.
pub fn execute(
    config: &SyncConfig,
    plan: &SyncPlan,
    repo: &dyn RepositoryHost,
    mode: RunMode,
    mut on_outcome: impl FnMut(&Outcome),
) -> Result<Vec<Outcome>, SyncError> {
    let mut outcomes = Vec::with_capacity(plan.drifts.len());
    for change in plan.changes() {
        let (drift, updated) = change?;
        let outcome = match mode {
            RunMode::Publish => Outcome::Published(publish(repo, config, drift, &updated)?),
            RunMode::DryRun => {
                Outcome::WouldPublish(preview(config, &plan.document, drift, &updated)?)
            }
        };
        on_outcome(&outcome);
        outcomes.push(outcome);
    }
    Ok(outcomes)
}
