//! One-directional drift detection: Grafana is the source of truth.
//!
//! Entries that exist only in the repository are never reported.

use serde_yaml::Mapping;

use dwat_core::values::recorded_tags;
use dwat_core::{
    CoreError, DashboardSummary, DriftReason, DriftRecord, RecordedDashboard, RemoteDashboards,
};

use crate::grafana::{fetch_definition, DashboardSource};
use crate::SyncError;

/// Compare one remote dashboard against the recorded `uid -> entry` mapping.
///
/// Tags are compared as ordered sequences; an entry without a readable tag
/// list always counts as different.
pub fn classify(summary: &DashboardSummary, recorded: &Mapping) -> Option<DriftReason> {
    let entry = match recorded.get(summary.uid.as_str()) {
        None => return Some(DriftReason::Missing),
        Some(entry) => entry,
    };
    match recorded_tags(entry) {
        Some(tags) if tags == summary.tags => None,
        _ => Some(DriftReason::Different),
    }
}

/// Every remote dashboard the repository does not reflect, in listing order.
///
/// The full model is fetched only for drifted dashboards. A dashboard whose
/// model cannot be fetched is left out of this run.
pub fn detect_drift(
    remote: &RemoteDashboards,
    recorded: &Mapping,
    source: &dyn DashboardSource,
) -> Result<Vec<DriftRecord>, SyncError> {
    let mut drifts = Vec::new();
    for summary in remote.iter() {
        let Some(reason) = classify(summary, recorded) else {
            tracing::debug!(uid = %summary.uid, "up to date");
            continue;
        };
        tracing::debug!(uid = %summary.uid, %reason, "drift detected");

        let Some(model) = fetch_definition(source, &summary.uid) else {
            tracing::warn!(
                uid = %summary.uid,
                title = %summary.title,
                "skipping dashboard: model unavailable"
            );
            continue;
        };
        let entry = RecordedDashboard::from_remote(summary, &model).map_err(CoreError::from)?;
        drifts.push(DriftRecord {
            reason,
            uid: summary.uid.clone(),
            entry,
        });
    }
    Ok(drifts)
}
