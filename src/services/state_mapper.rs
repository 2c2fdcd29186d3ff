//! Maps GitHub issue state and resolution labels onto work item state.

use crate::domain::models::{IssueState, SourceIssue, WorkItemState};

/// Label groups that classify why a closed issue was closed, in priority order.
const RESOLUTIONS: &[(&[&str], WorkItemState)] = &[
    (
        &["Resolution-Done"],
        WorkItemState::new("Closed", "Fixed and verified"),
    ),
    (
        &["Resolution-Invalid", "resolved: no action"],
        WorkItemState::new("Resolved", "Cannot Reproduce"),
    ),
    (
        &["Resolution-Duplicate", "duplicate"],
        WorkItemState::new("Resolved", "Duplicate"),
    ),
    (
        &["Resolution-WontFix", "resolved: by design"],
        WorkItemState::new("Resolved", "As Designed"),
    ),
];

/// State for open issues, whatever labels they carry.
pub const ACTIVE: WorkItemState = WorkItemState::new("Active", "Approved");

/// Map an issue onto the work item state it should have.
///
/// Open issues are always active. Closed issues are classified by the first
/// matching resolution label group; a closed issue with no resolution label
/// yields `None` and must not have its work item state touched.
pub fn map_state(issue: &SourceIssue) -> Option<WorkItemState> {
    map_state_from(issue.state, |name| issue.labels.contains(name))
}

/// [`map_state`] over a bare state and label predicate.
pub fn map_state_from(state: IssueState, has_label: impl Fn(&str) -> bool) -> Option<WorkItemState> {
    if state == IssueState::Open {
        return Some(ACTIVE);
    }
    RESOLUTIONS
        .iter()
        .find(|(labels, _)| labels.iter().any(|label| has_label(label)))
        .map(|(_, target)| *target)
}
