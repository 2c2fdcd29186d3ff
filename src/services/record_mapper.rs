//! Builds the field patch that mirrors a GitHub issue onto a work item.
//!
//! The same field set is written on create (`add`) and on update (`replace`).
//! State is applied separately so that creating the record and syncing its
//! state stay independently retryable.

use crate::domain::models::{fields, PatchOp, PatchOperation, TrackedIssue, WorkItemType};

use super::markdown::markdown_to_html;

const BUG_LABELS: &[&str] = &["bug", "Kind-Bug"];
const ENHANCEMENT_LABELS: &[&str] = &["enhancement", "Kind-Enhancement"];

/// Classify an issue as a Bug or Task from its labels, defaulting to Bug.
pub fn work_item_type(tracked: &TrackedIssue) -> WorkItemType {
    if tracked.issue.is_labeled_as(BUG_LABELS) {
        WorkItemType::Bug
    } else if tracked.issue.is_labeled_as(ENHANCEMENT_LABELS) {
        WorkItemType::Task
    } else {
        WorkItemType::Bug
    }
}

/// Field that holds the issue body for a given work item type.
pub const fn description_field(work_item_type: WorkItemType) -> &'static str {
    match work_item_type {
        WorkItemType::Task => fields::DESCRIPTION,
        WorkItemType::Bug => fields::REPRO_STEPS,
    }
}

/// Issue body as HTML, headed by a banner linking back to GitHub.
pub fn description_html(tracked: &TrackedIssue) -> String {
    let issue = &tracked.issue;
    format!(
        "<h3>Description from <a href=\"{}\">{}/{}#{}</a> (reported by <a href=\"{}\">@{}</a>):</h3>\n\n{}",
        issue.html_url,
        tracked.repository.owner,
        tracked.repository.name,
        issue.number,
        issue.author.html_url,
        issue.author.login,
        markdown_to_html(&issue.body)
    )
}

/// Builds title, area path, and description patches for an issue.
#[derive(Debug, Clone)]
pub struct PatchBuilder {
    area_path: String,
}

impl PatchBuilder {
    pub fn new(area_path: impl Into<String>) -> Self {
        Self {
            area_path: area_path.into(),
        }
    }

    /// Ordered operations describing the issue, using `op` for each entry.
    pub fn build(&self, tracked: &TrackedIssue, op: PatchOp) -> Vec<PatchOperation> {
        vec![
            PatchOperation::new(op, fields::TITLE, tracked.correlation_key().as_str()),
            PatchOperation::new(op, fields::AREA_PATH, self.area_path.as_str()),
            PatchOperation::new(
                op,
                description_field(work_item_type(tracked)),
                description_html(tracked),
            ),
        ]
    }

    /// Patch for creating a new work item.
    pub fn for_create(&self, tracked: &TrackedIssue) -> Vec<PatchOperation> {
        self.build(tracked, PatchOp::Add)
    }

    /// Patch for refreshing an existing work item.
    pub fn for_update(&self, tracked: &TrackedIssue) -> Vec<PatchOperation> {
        self.build(tracked, PatchOp::Replace)
    }
}
