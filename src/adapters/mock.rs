//! In-memory trackers for testing.
//!
//! Both trackers keep their data behind a `tokio` mutex and record every
//! mutating call so tests can assert on exactly what reached the target.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::errors::{SyncError, SyncResult};
use crate::domain::models::{
    fields, CommentPage, CorrelationKey, PatchOperation, RepositoryRef, SourceComment,
    TrackedIssue, WorkItem, WorkItemComment, WorkItemRef, WorkItemType,
};
use crate::domain::ports::{SourceTracker, TargetTracker};

/// Every call the engine made against a [`MockTargetTracker`].
#[derive(Debug, Clone, Default)]
pub struct TargetCalls {
    pub queries: usize,
    pub gets: usize,
    pub creates: Vec<(WorkItemType, Vec<PatchOperation>)>,
    pub updates: Vec<(u64, Vec<PatchOperation>)>,
    pub comment_pages: usize,
    pub comments_added: Vec<(u64, String)>,
}

impl TargetCalls {
    /// Number of create, update, or comment calls.
    pub fn mutations(&self) -> usize {
        self.creates.len() + self.updates.len() + self.comments_added.len()
    }

    /// Updates that carried the record patch (identified by its title write).
    pub fn record_updates(&self) -> usize {
        self.updates
            .iter()
            .filter(|(_, patch)| patch.iter().any(|op| op.targets(fields::TITLE)))
            .count()
    }
}

#[derive(Debug, Default)]
struct TargetState {
    next_id: u64,
    work_items: BTreeMap<u64, WorkItem>,
    comments: HashMap<u64, Vec<WorkItemComment>>,
    calls: TargetCalls,
    fail_queries: bool,
    create_without_id: bool,
}

/// In-memory [`TargetTracker`].
#[derive(Debug, Clone)]
pub struct MockTargetTracker {
    state: Arc<Mutex<TargetState>>,
    comment_page_size: usize,
}

impl Default for MockTargetTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTargetTracker {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(TargetState {
                next_id: 1,
                ..TargetState::default()
            })),
            comment_page_size: 200,
        }
    }

    /// Serve comments in pages of `size` to exercise continuation tokens.
    pub fn with_comment_page_size(mut self, size: usize) -> Self {
        self.comment_page_size = size.max(1);
        self
    }

    /// Make every title query fail with a transport error.
    pub async fn fail_title_queries(&self, fail: bool) {
        self.state.lock().await.fail_queries = fail;
    }

    /// Make created work items come back without an id.
    pub async fn create_without_id(&self, enabled: bool) {
        self.state.lock().await.create_without_id = enabled;
    }

    /// Seed a work item with the given title and state, returning its id.
    pub async fn seed_work_item(&self, title: &str, state: &str) -> u64 {
        let mut guard = self.state.lock().await;
        let id = guard.next_id;
        guard.next_id += 1;
        let mut item = Self::blank(id);
        item.fields
            .insert(fields::TITLE.to_string(), serde_json::json!(title));
        item.fields
            .insert(fields::STATE.to_string(), serde_json::json!(state));
        guard.work_items.insert(id, item);
        id
    }

    /// Seed a comment directly, bypassing call recording.
    pub async fn seed_comment(&self, id: u64, text: &str) {
        let mut guard = self.state.lock().await;
        let comments = guard.comments.entry(id).or_default();
        let comment_id = comments.len() as u64 + 1;
        comments.push(Self::comment(id, comment_id, text));
    }

    pub async fn calls(&self) -> TargetCalls {
        self.state.lock().await.calls.clone()
    }

    pub async fn work_item(&self, id: u64) -> Option<WorkItem> {
        self.state.lock().await.work_items.get(&id).cloned()
    }

    pub async fn work_items(&self) -> Vec<WorkItem> {
        self.state.lock().await.work_items.values().cloned().collect()
    }

    pub async fn comments(&self, id: u64) -> Vec<WorkItemComment> {
        self.state
            .lock()
            .await
            .comments
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }

    fn blank(id: u64) -> WorkItem {
        WorkItem {
            id: Some(id),
            rev: Some(1),
            url: format!("https://dev.azure.com/mock/proj/_apis/wit/workItems/{id}"),
            html_url: Some(format!("https://dev.azure.com/mock/proj/_workitems/edit/{id}")),
            fields: BTreeMap::new(),
            relations: vec![],
            links: BTreeMap::new(),
        }
    }

    fn comment(work_item_id: u64, comment_id: u64, text: &str) -> WorkItemComment {
        WorkItemComment {
            id: Some(comment_id),
            text: text.to_string(),
            author: Some("gh-sync".to_string()),
            url: Some(format!(
                "https://dev.azure.com/mock/proj/_apis/wit/workItems/{work_item_id}/comments/{comment_id}"
            )),
            created_at: None,
        }
    }

    fn apply(item: &mut WorkItem, patch: &[PatchOperation]) {
        for op in patch {
            if let Some(field) = op.path.strip_prefix("/fields/") {
                item.fields.insert(field.to_string(), op.value.clone());
            }
        }
        item.rev = Some(item.rev.unwrap_or(0) + 1);
    }
}

#[async_trait]
impl TargetTracker for MockTargetTracker {
    async fn query_by_exact_title(&self, key: &CorrelationKey) -> SyncResult<Vec<WorkItemRef>> {
        let mut guard = self.state.lock().await;
        guard.calls.queries += 1;
        if guard.fail_queries {
            return Err(SyncError::Transport(
                "mock query failure: connection reset".to_string(),
            ));
        }
        Ok(guard
            .work_items
            .values()
            .filter(|item| item.title() == Some(key.as_str()))
            .filter_map(|item| {
                item.id.map(|id| WorkItemRef {
                    id,
                    url: item.url.clone(),
                })
            })
            .collect())
    }

    async fn get_work_item(&self, id: u64) -> SyncResult<WorkItem> {
        let mut guard = self.state.lock().await;
        guard.calls.gets += 1;
        guard
            .work_items
            .get(&id)
            .cloned()
            .ok_or_else(|| SyncError::Transport(format!("work item {id} does not exist")))
    }

    async fn create_work_item(
        &self,
        work_item_type: WorkItemType,
        patch: &[PatchOperation],
    ) -> SyncResult<WorkItem> {
        let mut guard = self.state.lock().await;
        guard.calls.creates.push((work_item_type, patch.to_vec()));

        let id = guard.next_id;
        guard.next_id += 1;
        let mut item = Self::blank(id);
        item.rev = Some(0);
        item.fields.insert(
            fields::WORK_ITEM_TYPE.to_string(),
            serde_json::json!(work_item_type.as_str()),
        );
        item.fields
            .insert(fields::STATE.to_string(), serde_json::json!("New"));
        Self::apply(&mut item, patch);
        guard.work_items.insert(id, item.clone());

        if guard.create_without_id {
            item.id = None;
        }
        Ok(item)
    }

    async fn update_work_item(&self, id: u64, patch: &[PatchOperation]) -> SyncResult<WorkItem> {
        let mut guard = self.state.lock().await;
        guard.calls.updates.push((id, patch.to_vec()));
        let item = guard
            .work_items
            .get_mut(&id)
            .ok_or_else(|| SyncError::Transport(format!("work item {id} does not exist")))?;
        Self::apply(item, patch);
        Ok(item.clone())
    }

    async fn list_comments(
        &self,
        id: u64,
        continuation_token: Option<&str>,
    ) -> SyncResult<CommentPage> {
        let mut guard = self.state.lock().await;
        guard.calls.comment_pages += 1;

        let start = match continuation_token {
            Some(token) => token.parse::<usize>().map_err(|_| {
                SyncError::InvalidArgument(format!("bad continuation token '{token}'"))
            })?,
            None => 0,
        };
        let all = guard.comments.get(&id).cloned().unwrap_or_default();
        let end = (start + self.comment_page_size).min(all.len());
        let comments = all.get(start..end).map(<[_]>::to_vec).unwrap_or_default();
        let continuation_token = (end < all.len()).then(|| end.to_string());

        Ok(CommentPage {
            comments,
            continuation_token,
        })
    }

    async fn add_comment(&self, id: u64, text: &str) -> SyncResult<WorkItemComment> {
        let mut guard = self.state.lock().await;
        if !guard.work_items.contains_key(&id) {
            return Err(SyncError::Transport(format!("work item {id} does not exist")));
        }
        guard.calls.comments_added.push((id, text.to_string()));
        let comments = guard.comments.entry(id).or_default();
        let comment = Self::comment(id, comments.len() as u64 + 1, text);
        comments.push(comment.clone());
        Ok(comment)
    }
}

#[derive(Debug, Default)]
struct SourceState {
    issues: Vec<TrackedIssue>,
    comments: HashMap<(RepositoryRef, u64), Vec<SourceComment>>,
}

/// In-memory [`SourceTracker`].
#[derive(Debug, Clone, Default)]
pub struct MockSourceTracker {
    state: Arc<Mutex<SourceState>>,
}

impl MockSourceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_issue(&self, issue: TrackedIssue) {
        self.state.lock().await.issues.push(issue);
    }

    pub async fn add_comment(&self, issue: &TrackedIssue, comment: SourceComment) {
        self.state
            .lock()
            .await
            .comments
            .entry((issue.repository.clone(), issue.issue.number))
            .or_default()
            .push(comment);
    }
}

#[async_trait]
impl SourceTracker for MockSourceTracker {
    async fn get_issue(&self, repo: &RepositoryRef, number: u64) -> SyncResult<TrackedIssue> {
        self.state
            .lock()
            .await
            .issues
            .iter()
            .find(|t| &t.repository == repo && t.issue.number == number)
            .cloned()
            .ok_or_else(|| SyncError::Transport(format!("{repo}#{number} was not found")))
    }

    async fn list_tracked_issues(
        &self,
        repo: &RepositoryRef,
        label: &str,
    ) -> SyncResult<Vec<TrackedIssue>> {
        Ok(self
            .state
            .lock()
            .await
            .issues
            .iter()
            .filter(|t| &t.repository == repo && t.issue.labels.contains(label))
            .cloned()
            .collect())
    }

    async fn list_comments(&self, issue: &TrackedIssue) -> SyncResult<Vec<SourceComment>> {
        Ok(self
            .state
            .lock()
            .await
            .comments
            .get(&(issue.repository.clone(), issue.issue.number))
            .cloned()
            .unwrap_or_default())
    }
}
