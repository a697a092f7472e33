//! Domain types for the dashboard reconciler.
//!
//! Remote-side types mirror the Grafana search API (camelCase JSON);
//! repository-side types mirror the `dashboards:` section of a Helm
//! values file (snake_case YAML).

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The `type` field of a search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DashboardKind {
    #[default]
    #[serde(rename = "dash-db")]
    Dashboard,
    #[serde(rename = "dash-folder")]
    Folder,
    #[serde(other)]
    Other,
}

/// Why a remote dashboard needs a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriftReason {
    /// No entry for the uid in the repository.
    Missing,
    /// The recorded tag sequence differs from the remote one.
    Different,
}

impl DriftReason {
    /// Verb used in pull request bodies.
    pub fn action(self) -> &'static str {
        match self {
            DriftReason::Missing => "adds",
            DriftReason::Different => "updates",
        }
    }
}

impl fmt::Display for DriftReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriftReason::Missing => write!(f, "missing"),
            DriftReason::Different => write!(f, "different"),
        }
    }
}

// ---------------------------------------------------------------------------
// Remote side
// ---------------------------------------------------------------------------

/// One hit from the Grafana folder/dashboard search endpoint.
///
/// Grafana sends `null` for some fields on odd hits; those read as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub uid: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub uri: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: DashboardKind,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_title: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl DashboardSummary {
    /// Untagged dashboards, folders and hits without a uid are never synced.
    pub fn is_syncable(&self) -> bool {
        !self.uid.is_empty() && self.kind != DashboardKind::Folder && !self.tags.is_empty()
    }
}

/// Remote dashboards keyed by uid, in the order the search returned them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemoteDashboards {
    entries: Vec<DashboardSummary>,
}

impl RemoteDashboards {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert by uid. A repeated uid replaces the earlier entry in place.
    pub fn insert(&mut self, summary: DashboardSummary) {
        match self.entries.iter_mut().find(|e| e.uid == summary.uid) {
            Some(existing) => *existing = summary,
            None => self.entries.push(summary),
        }
    }

    pub fn get(&self, uid: &str) -> Option<&DashboardSummary> {
        self.entries.iter().find(|e| e.uid == uid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DashboardSummary> {
        self.entries.iter()
    }

    pub fn uids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.uid.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<DashboardSummary> for RemoteDashboards {
    fn from_iter<I: IntoIterator<Item = DashboardSummary>>(iter: I) -> Self {
        let mut dashboards = Self::new();
        for summary in iter {
            dashboards.insert(summary);
        }
        dashboards
    }
}

// ---------------------------------------------------------------------------
// Repository side
// ---------------------------------------------------------------------------

/// Folder uid recorded for dashboards living in Grafana's root folder.
pub const DEFAULT_FOLDER_UID: &str = "general";
/// Folder title recorded for dashboards living in Grafana's root folder.
pub const DEFAULT_FOLDER_TITLE: &str = "General";

/// One entry under `dashboards.<uid>` in the values file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedDashboard {
    pub title: String,
    pub tags: Vec<String>,
    pub folder_uid: String,
    pub folder_title: String,
    /// The full dashboard model, serialized as a JSON string.
    pub json: String,
}

impl RecordedDashboard {
    /// Build the entry the repository should hold for a remote dashboard.
    pub fn from_remote(
        summary: &DashboardSummary,
        definition: &serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            title: summary.title.clone(),
            tags: summary.tags.clone(),
            folder_uid: summary
                .folder_uid
                .clone()
                .unwrap_or_else(|| DEFAULT_FOLDER_UID.to_string()),
            folder_title: summary
                .folder_title
                .clone()
                .unwrap_or_else(|| DEFAULT_FOLDER_TITLE.to_string()),
            json: serde_json::to_string(definition)?,
        })
    }
}

/// A remote dashboard that the repository does not reflect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriftRecord {
    pub reason: DriftReason,
    pub uid: String,
    pub entry: RecordedDashboard,
}

impl DriftRecord {
    /// The single-entry `uid -> entry` mapping this record stands for.
    pub fn to_mapping(&self) -> Result<serde_yaml::Mapping, serde_yaml::Error> {
        let mut mapping = serde_yaml::Mapping::new();
        mapping.insert(
            serde_yaml::Value::String(self.uid.clone()),
            serde_yaml::to_value(&self.entry)?,
        );
        Ok(mapping)
    }

    pub fn commit_message(&self) -> String {
        format!(
            "{}: Update dashboard {} in {}",
            self.reason, self.entry.title, self.entry.folder_title
        )
    }

    pub fn pull_request_title(&self) -> String {
        format!("{}: {}", self.reason, self.entry.title)
    }

    pub fn pull_request_body(&self) -> String {
        format!(
            "This PR {} the Grafana dashboard `{}` (UID: `{}`).",
            self.reason.action(),
            self.entry.title,
            self.uid
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
