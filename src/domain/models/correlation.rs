//! The key that ties a GitHub issue to its Azure DevOps work item.
//!
//! There is no persisted id mapping: the derived work item title is the only
//! link between the two systems. Keeping it behind [`CorrelationKey`] means a
//! persisted mapping could replace it without touching the engine.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::issue::TrackedIssue;

/// Derived work item title, `"{title} ({owner}/{repo}#{number})"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationKey(String);

impl CorrelationKey {
    pub fn for_issue(tracked: &TrackedIssue) -> Self {
        Self(format!(
            "{} ({}/{}#{})",
            tracked.issue.title,
            tracked.repository.owner,
            tracked.repository.name,
            tracked.issue.number
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The title escaped for a double-quoted WIQL string literal.
    ///
    /// Backslashes are escaped before quotes so the quote escapes are not
    /// themselves doubled.
    pub fn wiql_escaped(&self) -> String {
        self.0.replace('\\', r"\\").replace('"', "\\\"")
    }

    /// WIQL query selecting work items whose title equals this key exactly.
    pub fn title_query(&self) -> String {
        format!(
            "SELECT [System.Id] FROM WorkItems WHERE [System.Title] = \"{}\"",
            self.wiql_escaped()
        )
    }
}

impl fmt::Display for CorrelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CorrelationKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
