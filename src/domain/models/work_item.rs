//! Azure DevOps-side domain models.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::{SyncError, SyncResult};

/// Well-known work item field reference names.
pub mod fields {
    pub const TITLE: &str = "System.Title";
    pub const AREA_PATH: &str = "System.AreaPath";
    pub const DESCRIPTION: &str = "System.Description";
    pub const REPRO_STEPS: &str = "Microsoft.VSTS.TCM.ReproSteps";
    pub const STATE: &str = "System.State";
    pub const REASON: &str = "System.Reason";
    pub const WORK_ITEM_TYPE: &str = "System.WorkItemType";

    /// JSON-patch path for a field reference name.
    pub fn path(field: &str) -> String {
        format!("/fields/{field}")
    }
}

/// Work item types gh-sync creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkItemType {
    Bug,
    Task,
}

impl WorkItemType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bug => "Bug",
            Self::Task => "Task",
        }
    }
}

impl fmt::Display for WorkItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A target state plus the reason recorded for the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkItemState {
    pub state: &'static str,
    pub reason: &'static str,
}

impl WorkItemState {
    pub const fn new(state: &'static str, reason: &'static str) -> Self {
        Self { state, reason }
    }
}

impl fmt::Display for WorkItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.state, self.reason)
    }
}

/// JSON-patch operation kinds used against work items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Add,
    Replace,
}

/// One JSON-patch entry, serialized in the shape the work item API expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: PatchOp,
    pub path: String,
    pub value: serde_json::Value,
}

impl PatchOperation {
    pub fn new(op: PatchOp, field: &str, value: impl Into<serde_json::Value>) -> Self {
        Self {
            op,
            path: fields::path(field),
            value: value.into(),
        }
    }

    /// Whether this operation writes the given field.
    pub fn targets(&self, field: &str) -> bool {
        self.path == fields::path(field)
    }
}

/// A query hit: just the id and API URL of a work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemRef {
    pub id: u64,
    pub url: String,
}

/// A link from one work item to another artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItemRelation {
    pub rel: String,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

/// An Azure DevOps work item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    /// Assigned by Azure DevOps; absent until the item exists.
    pub id: Option<u64>,
    pub rev: Option<u64>,
    /// REST API URL.
    pub url: String,
    /// Browser URL from the `html` link, when the API returned one.
    pub html_url: Option<String>,
    pub fields: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub relations: Vec<WorkItemRelation>,
    #[serde(default)]
    pub links: BTreeMap<String, String>,
}

impl WorkItem {
    /// Prefer the browser link, falling back to the API URL.
    pub fn readable_link(&self) -> &str {
        self.html_url.as_deref().unwrap_or(&self.url)
    }

    pub fn field_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(serde_json::Value::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.field_str(fields::TITLE)
    }

    pub fn state(&self) -> Option<&str> {
        self.field_str(fields::STATE)
    }

    /// The id, or a `MissingContext` error naming what could not be done.
    pub fn require_id(&self, action: &str) -> SyncResult<u64> {
        self.id.ok_or_else(|| {
            SyncError::MissingContext(format!(
                "Work item {} did not have an ID; could not {action}",
                self.url
            ))
        })
    }
}

/// A comment on a work item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItemComment {
    pub id: Option<u64>,
    /// Comment HTML.
    pub text: String,
    pub author: Option<String>,
    pub url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// One page of work item comments.
#[derive(Debug, Clone, Default)]
pub struct CommentPage {
    pub comments: Vec<WorkItemComment>,
    /// Present while more pages remain.
    pub continuation_token: Option<String>,
}
