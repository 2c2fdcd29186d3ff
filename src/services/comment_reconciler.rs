//! Mirrors GitHub comments onto a work item without duplicating them.
//!
//! Each mirrored comment carries a sigil, `[gh-sync: <comment url>]`. A GitHub
//! comment is posted only when no existing work item comment contains its
//! sigil, so running the reconciler repeatedly converges on one mirrored
//! comment per GitHub comment.

use std::collections::HashSet;
use std::sync::Arc;

use futures::TryStreamExt;

use crate::domain::errors::SyncResult;
use crate::domain::models::{SourceComment, TrackedIssue, WorkItem, WorkItemComment};
use crate::domain::ports::{SourceTracker, TargetTracker};

use super::markdown::markdown_to_html;

/// Marker embedded in a mirrored comment that identifies its GitHub origin.
pub fn sigil(source_comment_url: &str) -> String {
    format!("[gh-sync: {source_comment_url}]")
}

/// Work item comment HTML for a GitHub comment.
pub fn mirrored_comment_text(comment: &SourceComment) -> String {
    format!(
        "<a href=\"{}\">GitHub comment by @{}:</a>\n\n{}\n\n<br><hr><span style=\"font-size: 8px\">{}</span>",
        comment.html_url,
        comment.author.login,
        markdown_to_html(&comment.body),
        sigil(&comment.html_url)
    )
}

/// Computes and applies the comment diff between an issue and a work item.
pub struct CommentReconciler {
    source: Arc<dyn SourceTracker>,
    target: Arc<dyn TargetTracker>,
}

impl CommentReconciler {
    pub fn new(source: Arc<dyn SourceTracker>, target: Arc<dyn TargetTracker>) -> Self {
        Self { source, target }
    }

    /// Every comment on a work item, following continuation tokens to the end.
    pub async fn existing_comments(&self, work_item_id: u64) -> SyncResult<Vec<WorkItemComment>> {
        let target = Arc::clone(&self.target);
        let pages = futures::stream::try_unfold(Some(None::<String>), move |cursor| {
            let target = Arc::clone(&target);
            async move {
                let Some(token) = cursor else {
                    return SyncResult::Ok(None);
                };
                let page = target.list_comments(work_item_id, token.as_deref()).await?;
                // Stop if the server echoes the token it was sent.
                let next = page
                    .continuation_token
                    .filter(|next| token.as_deref() != Some(next.as_str()))
                    .map(Some);
                SyncResult::Ok(Some((page.comments, next)))
            }
        });
        pages.try_concat().await
    }

    /// Mirror the issue's comments onto the work item, returning the comments
    /// that were posted.
    pub async fn reconcile(
        &self,
        work_item: &WorkItem,
        tracked: &TrackedIssue,
    ) -> SyncResult<Vec<WorkItemComment>> {
        let id = work_item.require_id("add comment text")?;
        let existing = self.existing_comments(id).await?;
        self.reconcile_against(id, tracked, &existing).await
    }

    /// Mirror the issue's comments given an already-known set of existing work
    /// item comments. A freshly created work item passes an empty slice.
    pub async fn reconcile_against(
        &self,
        work_item_id: u64,
        tracked: &TrackedIssue,
        existing: &[WorkItemComment],
    ) -> SyncResult<Vec<WorkItemComment>> {
        let source_comments = self.source.list_comments(tracked).await?;
        let mut mirrored: HashSet<String> = HashSet::new();
        let mut posted = Vec::new();

        for comment in &source_comments {
            let marker = sigil(&comment.html_url);
            if mirrored.contains(&marker)
                || existing.iter().any(|c| c.text.contains(&marker))
            {
                continue;
            }

            tracing::debug!(
                work_item_id,
                comment_url = %comment.html_url,
                "Mirroring GitHub comment"
            );
            let created = self
                .target
                .add_comment(work_item_id, &mirrored_comment_text(comment))
                .await?;
            mirrored.insert(marker);
            posted.push(created);
        }

        tracing::info!(
            work_item_id,
            issue = %tracked.reference(),
            source_comments = source_comments.len(),
            added = posted.len(),
            "Comment reconciliation finished"
        );
        Ok(posted)
    }
}
