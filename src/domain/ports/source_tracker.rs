//! Port for the issue tracker being mirrored.

use async_trait::async_trait;

use crate::domain::errors::SyncResult;
use crate::domain::models::{RepositoryRef, SourceComment, TrackedIssue};

/// Read-only access to GitHub issues.
#[async_trait]
pub trait SourceTracker: Send + Sync {
    /// Fetch one issue, paired with its repository.
    async fn get_issue(&self, repo: &RepositoryRef, number: u64) -> SyncResult<TrackedIssue>;

    /// Fetch every issue (open or closed) carrying `label`, excluding pull
    /// requests.
    async fn list_tracked_issues(
        &self,
        repo: &RepositoryRef,
        label: &str,
    ) -> SyncResult<Vec<TrackedIssue>>;

    /// Fetch every comment on an issue, oldest first.
    async fn list_comments(&self, issue: &TrackedIssue) -> SyncResult<Vec<SourceComment>>;
}
