//! Finds the work item, if any, that mirrors a GitHub issue.

use std::sync::Arc;

use crate::domain::errors::{SyncError, SyncResult};
use crate::domain::models::{CorrelationKey, LookupFailurePolicy, TrackedIssue, WorkItem};
use crate::domain::ports::TargetTracker;

/// Result of looking up the work item for an issue.
#[derive(Debug)]
pub enum LookupOutcome {
    Found(WorkItem),
    NotFound,
    /// The query could not be completed; nothing is known about existence.
    TransientFailure(SyncError),
}

/// Work item lookup by derived title.
pub struct WorkItemLookup {
    target: Arc<dyn TargetTracker>,
}

impl WorkItemLookup {
    pub fn new(target: Arc<dyn TargetTracker>) -> Self {
        Self { target }
    }

    /// Look up the work item for an issue.
    ///
    /// Two or more matches are an `AmbiguousState` error, never an arbitrary
    /// pick. Transport failures come back as [`LookupOutcome::TransientFailure`];
    /// every other error propagates.
    pub async fn find(&self, tracked: &TrackedIssue) -> SyncResult<LookupOutcome> {
        let key = tracked.correlation_key();
        match self.find_by_key(&key).await {
            Err(err) if err.is_transient() => {
                tracing::debug!(title = %key.wiql_escaped(), error = %err, "Work item query failed");
                Ok(LookupOutcome::TransientFailure(err))
            }
            other => other,
        }
    }

    async fn find_by_key(&self, key: &CorrelationKey) -> SyncResult<LookupOutcome> {
        let refs = self.target.query_by_exact_title(key).await?;
        match refs.as_slice() {
            [] => Ok(LookupOutcome::NotFound),
            [single] => {
                let item = self.target.get_work_item(single.id).await?;
                Ok(LookupOutcome::Found(item))
            }
            many => Err(SyncError::AmbiguousState {
                title: key.to_string(),
                count: many.len(),
            }),
        }
    }

    /// Collapse an outcome to `Option<WorkItem>` under a failure policy.
    pub fn resolve(
        outcome: LookupOutcome,
        policy: LookupFailurePolicy,
        tracked: &TrackedIssue,
    ) -> SyncResult<Option<WorkItem>> {
        match outcome {
            LookupOutcome::Found(item) => Ok(Some(item)),
            LookupOutcome::NotFound => Ok(None),
            LookupOutcome::TransientFailure(err) => match policy {
                LookupFailurePolicy::TreatAsNotFound => {
                    tracing::warn!(
                        title = %tracked.correlation_key().wiql_escaped(),
                        issue_url = %tracked.html_url(),
                        error = %err,
                        "Exception querying existing work items; treating as not found"
                    );
                    Ok(None)
                }
                LookupFailurePolicy::Fail => Err(err),
            },
        }
    }
}
