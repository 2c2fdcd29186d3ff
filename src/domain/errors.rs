//! Domain errors for the gh-sync reconciliation engine.

use thiserror::Error;

/// Errors that can occur while reconciling GitHub issues into Azure DevOps.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A caller handed the engine malformed input (bad slug, zero issue number).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Something the next step depends on is absent, such as a work item id.
    #[error("Missing context: {0}")]
    MissingContext(String),

    /// More than one work item carries the same derived title.
    #[error("Ambiguous state: {count} work items share the title \"{title}\"")]
    AmbiguousState { title: String, count: usize },

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Authentication failed for {service}: {message}")]
    Authentication { service: String, message: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Credential storage error: {0}")]
    Credentials(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl SyncError {
    /// Whether this failure may be downgraded by a lookup failure policy.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

pub type SyncResult<T> = Result<T, SyncError>;

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::SerializationError(err.to_string())
    }
}

/// A fatal error for one issue, tagged with that issue's URL so failures in a
/// batch run stay traceable.
#[derive(Debug, Error)]
#[error("Failed to reconcile {issue_url}: {error}")]
pub struct ReconcileFailure {
    /// HTML URL of the GitHub issue that failed.
    pub issue_url: String,
    /// The underlying error.
    #[source]
    pub error: SyncError,
}

impl ReconcileFailure {
    pub fn new(issue_url: impl Into<String>, error: SyncError) -> Self {
        Self {
            issue_url: issue_url.into(),
            error,
        }
    }
}
