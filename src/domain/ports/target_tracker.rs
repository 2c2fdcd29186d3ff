//! Port for the work tracking system being written to.

use async_trait::async_trait;

use crate::domain::errors::SyncResult;
use crate::domain::models::{
    CommentPage, CorrelationKey, PatchOperation, WorkItem, WorkItemComment, WorkItemRef,
    WorkItemType,
};

/// Access to Azure DevOps work items within one project.
///
/// The project is bound when the implementation is constructed.
#[async_trait]
pub trait TargetTracker: Send + Sync {
    /// Find work items whose title equals the key exactly.
    async fn query_by_exact_title(&self, key: &CorrelationKey) -> SyncResult<Vec<WorkItemRef>>;

    /// Fetch a work item with its relations expanded.
    async fn get_work_item(&self, id: u64) -> SyncResult<WorkItem>;

    async fn create_work_item(
        &self,
        work_item_type: WorkItemType,
        patch: &[PatchOperation],
    ) -> SyncResult<WorkItem>;

    async fn update_work_item(&self, id: u64, patch: &[PatchOperation]) -> SyncResult<WorkItem>;

    /// Fetch one page of comments. Pass the previous page's continuation token
    /// to continue; `None` starts from the beginning.
    async fn list_comments(
        &self,
        id: u64,
        continuation_token: Option<&str>,
    ) -> SyncResult<CommentPage>;

    async fn add_comment(&self, id: u64, text: &str) -> SyncResult<WorkItemComment>;
}
