pub mod config;
pub mod correlation;
pub mod issue;
pub mod work_item;

pub use config::{AdoConfig, Config, GitHubConfig, LoggingConfig, LookupFailurePolicy, SyncConfig};
pub use correlation::CorrelationKey;
pub use issue::{IssueState, RepositoryRef, SourceComment, SourceIssue, TrackedIssue, UserRef};
pub use work_item::{
    fields, CommentPage, PatchOp, PatchOperation, WorkItem, WorkItemComment, WorkItemRef,
    WorkItemRelation, WorkItemState, WorkItemType,
};
