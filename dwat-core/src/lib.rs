//! dwat core library — domain types, configuration, values document, errors.
//!
//! Public API surface:
//! - [`types`] — dashboard summaries, recorded entries, drift records
//! - [`config`] — [`SyncConfig`], built once per run
//! - [`values`] — the Helm values document and the dashboard merge
//! - [`error`] — [`CoreError`]

pub mod config;
pub mod error;
pub mod types;
pub mod values;

pub use config::SyncConfig;
pub use error::CoreError;
pub use types::{
    DashboardKind, DashboardSummary, DriftReason, DriftRecord, RecordedDashboard,
    RemoteDashboards,
};
pub use values::{ValuesDocument, ROOT_KEY};
