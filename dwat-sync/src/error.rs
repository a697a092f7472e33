//! Error types for dwat-sync.

use thiserror::Error;

use dwat_core::CoreError;

/// All errors that can arise while talking to Grafana or GitHub.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from the values document model.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Connection, DNS, TLS or timeout failure before a response arrived.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// A success response whose body was not the JSON we expected.
    #[error("invalid response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// The values file does not exist on the requested branch.
    #[error("{path} not found on branch {branch}")]
    FileNotFound { path: String, branch: String },

    /// File content was not valid base64.
    #[error("could not decode content of {path}: {source}")]
    Base64 {
        path: String,
        #[source]
        source: base64::DecodeError,
    },

    /// File content was not valid UTF-8.
    #[error("content of {path} is not UTF-8: {source}")]
    Utf8 {
        path: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// The contents API used an encoding other than base64 or none.
    #[error("content of {path} has unsupported encoding {encoding:?}")]
    UnsupportedEncoding { path: String, encoding: String },

    /// The pull request branch is already there from an earlier run.
    #[error("branch {branch} already exists; merge or delete it and re-run")]
    BranchExists { branch: String },
}

impl SyncError {
    /// HTTP status of the failure, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
