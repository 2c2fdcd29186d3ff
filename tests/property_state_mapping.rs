mod common;

use common::tracked_issue;
use gh_sync::domain::models::{CorrelationKey, IssueState};
use gh_sync::services::state_mapper::map_state_from;
use proptest::prelude::*;
use std::collections::BTreeSet;

const RESOLUTION_LABELS: &[&str] = &[
    "Resolution-Done",
    "Resolution-Invalid",
    "resolved: no action",
    "Resolution-Duplicate",
    "duplicate",
    "Resolution-WontFix",
    "resolved: by design",
];

fn label() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(RESOLUTION_LABELS).prop_map(str::to_string),
        "[a-z][a-z-]{0,11}",
    ]
}

/// Undo `wiql_escaped`, failing on a dangling escape.
fn unescape(escaped: &str) -> Option<String> {
    let mut out = String::new();
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            out.push(chars.next()?);
        } else if c == '"' {
            return None;
        } else {
            out.push(c);
        }
    }
    Some(out)
}

proptest! {
    /// Property: open issues are always Active, whatever their labels
    #[test]
    fn prop_open_is_always_active(labels in prop::collection::btree_set(label(), 0..6)) {
        let state = map_state_from(IssueState::Open, |name| labels.contains(name));
        prop_assert_eq!(state.map(|s| (s.state, s.reason)), Some(("Active", "Approved")));
    }

    /// Property: a closed issue maps to a state exactly when it carries a resolution label
    #[test]
    fn prop_closed_needs_resolution_label(labels in prop::collection::btree_set(label(), 0..6)) {
        let state = map_state_from(IssueState::Closed, |name| labels.contains(name));
        let has_resolution = labels.iter().any(|l| RESOLUTION_LABELS.contains(&l.as_str()));
        prop_assert_eq!(state.is_some(), has_resolution);
    }

    /// Property: Resolution-Done takes priority over every other resolution label
    #[test]
    fn prop_done_has_priority(others in prop::collection::btree_set(label(), 0..6)) {
        let mut labels: BTreeSet<String> = others;
        labels.insert("Resolution-Done".to_string());
        let state = map_state_from(IssueState::Closed, |name| labels.contains(name));
        prop_assert_eq!(state.map(|s| s.state), Some("Closed"));
    }

    /// Property: WIQL escaping round-trips and leaves no bare quote
    #[test]
    fn prop_wiql_escaping_is_reversible(title in r#"[ -~]{1,40}"#, number in 1u64..100_000) {
        let tracked = tracked_issue("acme/widgets", number, &title, IssueState::Open, &[]);
        let key = CorrelationKey::for_issue(&tracked);
        let escaped = key.wiql_escaped();
        prop_assert_eq!(unescape(&escaped), Some(key.to_string()));
        let suffix = format!(" (acme/widgets#{number})");
        prop_assert!(key.as_str().ends_with(&suffix));
    }
}
