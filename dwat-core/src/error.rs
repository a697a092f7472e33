//! Error types for dwat-core.

use thiserror::Error;

/// All errors that can arise from values-document operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// YAML serialization error (write path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load — includes the repository path and serde_yaml's line context.
    #[error("failed to parse values document {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// The document parsed, but its top level is not a mapping.
    #[error("values document {path} is not a mapping")]
    NotAMapping { path: String },

    /// The top-level `dashboards` key is absent from the document.
    #[error("values document has no top-level `{key}` key")]
    MissingRootKey { key: &'static str },

    /// The top-level `dashboards` key holds something other than a mapping.
    #[error("top-level `{key}` key is not a mapping")]
    RootKeyNotAMapping { key: &'static str },

    /// JSON serialization of a dashboard definition failed.
    #[error("dashboard JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
