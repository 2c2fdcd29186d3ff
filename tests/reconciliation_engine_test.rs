//! End-to-end reconciliation against the in-memory trackers.
//!
//! Covers:
//! - create, then re-run as an idempotent update
//! - comment mirroring across runs and across comment pages
//! - state and reason written together for resolved issues
//! - batch runs that continue past a failing issue

mod common;

use common::{engine, source_comment, tracked_issue, AREA_PATH};
use gh_sync::adapters::mock::{MockSourceTracker, MockTargetTracker};
use gh_sync::domain::models::{fields, IssueState, LookupFailurePolicy, PatchOp, WorkItemType};
use gh_sync::domain::SyncError;
use gh_sync::services::comment_reconciler::sigil;
use gh_sync::services::{ReconcileAction, ReconcileOptions};

const REPO: &str = "acme/widgets";

#[tokio::test]
async fn test_second_run_updates_without_duplicating() {
    let source = MockSourceTracker::new();
    let target = MockTargetTracker::new();
    let tracked = tracked_issue(REPO, 42, "Crash on load", IssueState::Open, &["bug", "tracking"]);
    source.add_issue(tracked.clone()).await;
    for (id, body) in [(101, "Same here."), (102, "Repro attached.")] {
        source
            .add_comment(&tracked, source_comment(&tracked, id, body))
            .await;
    }
    let engine = engine(&source, &target, LookupFailurePolicy::Fail);

    let first = engine
        .reconcile(&tracked, ReconcileOptions::default())
        .await
        .unwrap();
    let ReconcileAction::Created(created) = &first.action else {
        panic!("expected Created, got {:?}", first.action);
    };
    let id = created.id.unwrap();
    assert_eq!(first.comments_added, 2);

    let second = engine
        .reconcile(&tracked, ReconcileOptions::default())
        .await
        .unwrap();
    assert!(matches!(second.action, ReconcileAction::Updated(ref s) if s.id == Some(id)));
    assert_eq!(second.comments_added, 0);
    assert_eq!(second.existing.as_ref().and_then(|s| s.id), Some(id));

    assert_eq!(target.work_items().await.len(), 1);
    // Provenance plus two mirrored comments.
    assert_eq!(target.comments(id).await.len(), 3);

    let calls = target.calls().await;
    assert_eq!(calls.creates.len(), 1);
    assert_eq!(calls.record_updates(), 1);
}

#[tokio::test]
async fn test_created_record_fields() {
    let source = MockSourceTracker::new();
    let target = MockTargetTracker::new();
    let tracked = tracked_issue(REPO, 7, "Dark mode", IssueState::Open, &["enhancement"]);
    let engine = engine(&source, &target, LookupFailurePolicy::Fail);

    engine
        .reconcile(&tracked, ReconcileOptions::default())
        .await
        .unwrap();

    let calls = target.calls().await;
    let (kind, patch) = &calls.creates[0];
    assert_eq!(*kind, WorkItemType::Task);
    assert!(patch.iter().all(|op| op.op == PatchOp::Add));

    let item = target.work_items().await.remove(0);
    assert_eq!(item.title(), Some("Dark mode (acme/widgets#7)"));
    assert_eq!(item.field_str(fields::AREA_PATH), Some(AREA_PATH));
    let description = item.field_str(fields::DESCRIPTION).unwrap();
    assert!(description.contains("<strong>crashes</strong>"));
    assert!(description.contains("https://github.com/acme/widgets/issues/7"));
}

#[tokio::test]
async fn test_new_source_comment_is_mirrored_once() {
    let source = MockSourceTracker::new();
    let target = MockTargetTracker::new().with_comment_page_size(1);
    let tracked = tracked_issue(REPO, 5, "Slow startup", IssueState::Open, &[]);
    source
        .add_comment(&tracked, source_comment(&tracked, 1, "First."))
        .await;
    let engine = engine(&source, &target, LookupFailurePolicy::Fail);

    engine
        .reconcile(&tracked, ReconcileOptions::default())
        .await
        .unwrap();

    let late = source_comment(&tracked, 2, "Still slow on 2.0.");
    source.add_comment(&tracked, late.clone()).await;

    let outcome = engine
        .reconcile(&tracked, ReconcileOptions::default())
        .await
        .unwrap();
    assert_eq!(outcome.comments_added, 1);

    let outcome = engine
        .reconcile(&tracked, ReconcileOptions::default())
        .await
        .unwrap();
    assert_eq!(outcome.comments_added, 0);

    let id = target.work_items().await[0].id.unwrap();
    let comments = target.comments(id).await;
    let marker = sigil(&late.html_url);
    assert_eq!(comments.iter().filter(|c| c.text.contains(&marker)).count(), 1);
    assert!(target.calls().await.comment_pages >= 3);
}

#[tokio::test]
async fn test_hand_written_comment_with_sigil_blocks_mirroring() {
    let source = MockSourceTracker::new();
    let target = MockTargetTracker::new();
    let tracked = tracked_issue(REPO, 9, "Typo", IssueState::Open, &[]);
    let comment = source_comment(&tracked, 900, "Fixed in docs.");
    source.add_comment(&tracked, comment.clone()).await;

    let id = target
        .seed_work_item("Typo (acme/widgets#9)", "Active")
        .await;
    target
        .seed_comment(id, &format!("Copied by hand {}", sigil(&comment.html_url)))
        .await;
    let engine = engine(&source, &target, LookupFailurePolicy::Fail);

    let outcome = engine
        .reconcile(&tracked, ReconcileOptions::default())
        .await
        .unwrap();
    assert_eq!(outcome.comments_added, 0);
    assert!(target.calls().await.comments_added.is_empty());
}

#[tokio::test]
async fn test_closed_duplicate_sets_state_and_reason_together() {
    let source = MockSourceTracker::new();
    let target = MockTargetTracker::new();
    let tracked = tracked_issue(REPO, 11, "Crash again", IssueState::Closed, &["duplicate"]);
    let id = target
        .seed_work_item("Crash again (acme/widgets#11)", "Active")
        .await;
    let engine = engine(&source, &target, LookupFailurePolicy::Fail);

    let outcome = engine
        .reconcile(&tracked, ReconcileOptions::default())
        .await
        .unwrap();
    assert_eq!(
        outcome.state_applied.map(|s| (s.state, s.reason)),
        Some(("Resolved", "Duplicate"))
    );

    let item = target.work_item(id).await.unwrap();
    assert_eq!(item.state(), Some("Resolved"));
    assert_eq!(item.field_str(fields::REASON), Some("Duplicate"));

    let calls = target.calls().await;
    let state_patch = calls
        .updates
        .iter()
        .find(|(_, patch)| patch.iter().any(|op| op.targets(fields::STATE)))
        .map(|(_, patch)| patch)
        .unwrap();
    assert_eq!(state_patch.len(), 2);
    assert!(state_patch.iter().any(|op| op.targets(fields::REASON)));

    // Already resolved: no further state writes.
    engine
        .reconcile(&tracked, ReconcileOptions::default())
        .await
        .unwrap();
    let state_writes = target
        .calls()
        .await
        .updates
        .iter()
        .filter(|(_, patch)| patch.iter().any(|op| op.targets(fields::STATE)))
        .count();
    assert_eq!(state_writes, 1);
}

#[tokio::test]
async fn test_relabelled_resolution_rewrites_reason() {
    let source = MockSourceTracker::new();
    let target = MockTargetTracker::new();
    let id = target
        .seed_work_item("Crash again (acme/widgets#12)", "Active")
        .await;
    let engine = engine(&source, &target, LookupFailurePolicy::Fail);

    let duplicate = tracked_issue(REPO, 12, "Crash again", IssueState::Closed, &["Resolution-Duplicate"]);
    engine
        .reconcile(&duplicate, ReconcileOptions::default())
        .await
        .unwrap();
    let item = target.work_item(id).await.unwrap();
    assert_eq!(item.field_str(fields::REASON), Some("Duplicate"));

    // Same state, different reason.
    let wont_fix = tracked_issue(REPO, 12, "Crash again", IssueState::Closed, &["Resolution-WontFix"]);
    let outcome = engine
        .reconcile(&wont_fix, ReconcileOptions::default())
        .await
        .unwrap();
    assert_eq!(
        outcome.state_applied.map(|s| (s.state, s.reason)),
        Some(("Resolved", "As Designed"))
    );

    let item = target.work_item(id).await.unwrap();
    assert_eq!(item.state(), Some("Resolved"));
    assert_eq!(item.field_str(fields::REASON), Some("As Designed"));
}

#[tokio::test]
async fn test_lookup_failure_policy_fail_aborts_without_writes() {
    let source = MockSourceTracker::new();
    let target = MockTargetTracker::new();
    target.fail_title_queries(true).await;
    let tracked = tracked_issue(REPO, 3, "Flaky", IssueState::Open, &[]);
    let engine = engine(&source, &target, LookupFailurePolicy::Fail);

    let failure = engine
        .reconcile(&tracked, ReconcileOptions::default())
        .await
        .unwrap_err();
    assert_eq!(failure.issue_url, "https://github.com/acme/widgets/issues/3");
    assert!(matches!(failure.error, SyncError::Transport(_)));
    assert_eq!(target.calls().await.mutations(), 0);
}

#[tokio::test]
async fn test_batch_continues_past_ambiguous_issue() {
    let source = MockSourceTracker::new();
    let target = MockTargetTracker::new();
    let good = tracked_issue(REPO, 1, "Good", IssueState::Open, &["tracking"]);
    let twin = tracked_issue(REPO, 2, "Twin", IssueState::Open, &["tracking"]);
    let untracked = tracked_issue(REPO, 3, "Ignored", IssueState::Open, &["question"]);
    for issue in [&good, &twin, &untracked] {
        source.add_issue(issue.clone()).await;
    }
    target.seed_work_item("Twin (acme/widgets#2)", "Active").await;
    target.seed_work_item("Twin (acme/widgets#2)", "Active").await;
    let engine = engine(&source, &target, LookupFailurePolicy::Fail);

    let mut seen = Vec::new();
    let report = engine
        .reconcile_all_with_progress(
            &REPO.parse().unwrap(),
            ReconcileOptions::default(),
            |index, total, issue| seen.push((index, total, issue.issue.number)),
        )
        .await
        .unwrap();

    assert_eq!(seen, vec![(0, 2, 1), (1, 2, 2)]);
    assert!(!report.is_success());
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].issue, "acme/widgets#1");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].issue_url, twin.html_url());
    assert!(matches!(
        report.failures[0].error,
        SyncError::AmbiguousState { count: 2, .. }
    ));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["repository"], "acme/widgets");
    assert!(json["failures"][0]["error"]
        .as_str()
        .unwrap()
        .contains("2 work items share the title"));
}

#[tokio::test]
async fn test_batch_dry_run_reports_without_writing() {
    let source = MockSourceTracker::new();
    let target = MockTargetTracker::new();
    for n in 1..=3 {
        source
            .add_issue(tracked_issue(REPO, n, "Tracked", IssueState::Open, &["tracking"]))
            .await;
    }
    let engine = engine(&source, &target, LookupFailurePolicy::TreatAsNotFound);

    let report = engine
        .reconcile_all(
            &REPO.parse().unwrap(),
            ReconcileOptions {
                dry_run: true,
                allow_existing: false,
            },
        )
        .await
        .unwrap();
    assert!(report.is_success());
    assert!(report
        .outcomes
        .iter()
        .all(|o| o.action == ReconcileAction::WouldCreate));
    assert_eq!(target.calls().await.mutations(), 0);
}
