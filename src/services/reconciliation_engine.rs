//! Reconciliation engine: mirrors one GitHub issue (or a repository's worth
//! of tracked issues) into Azure DevOps.
//!
//! For a single issue the engine
//! 1. validates the issue context,
//! 2. looks up the work item by its derived title,
//! 3. either refreshes the found item or creates a new one,
//! 4. applies the mapped state, and
//! 5. mirrors comments that have not been mirrored yet.
//!
//! Every step is idempotent, so re-running after a partial failure converges.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::errors::{ReconcileFailure, SyncResult};
use crate::domain::models::{
    fields, Config, LookupFailurePolicy, PatchOp, PatchOperation, RepositoryRef, TrackedIssue,
    WorkItem, WorkItemState,
};
use crate::domain::ports::{SourceTracker, TargetTracker};

use super::comment_reconciler::CommentReconciler;
use super::lookup::WorkItemLookup;
use super::record_mapper::{work_item_type, PatchBuilder};
use super::state_mapper::map_state;

/// Per-run switches for a reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Look up the work item but write nothing.
    pub dry_run: bool,
    /// Create a new work item even when one already exists.
    pub allow_existing: bool,
}

/// Settings the engine takes from configuration.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub area_path: String,
    pub tracking_label: String,
    pub lookup_failure_policy: LookupFailurePolicy,
}

impl From<&Config> for EngineSettings {
    fn from(config: &Config) -> Self {
        Self {
            area_path: config.ado.area_path.clone(),
            tracking_label: config.github.tracking_label.clone(),
            lookup_failure_policy: config.sync.lookup_failure_policy,
        }
    }
}

/// Short description of a work item for reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkItemSummary {
    pub id: Option<u64>,
    pub link: String,
}

impl From<&WorkItem> for WorkItemSummary {
    fn from(item: &WorkItem) -> Self {
        Self {
            id: item.id,
            link: item.readable_link().to_string(),
        }
    }
}

/// What the engine did, or would have done, with the work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconcileAction {
    Updated(WorkItemSummary),
    Created(WorkItemSummary),
    WouldUpdate(WorkItemSummary),
    WouldCreate,
}

/// Result of reconciling one issue.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileOutcome {
    /// `owner/repo#number`
    pub issue: String,
    pub issue_url: String,
    /// Derived work item title.
    pub title: String,
    /// Work item found by the lookup, if any.
    pub existing: Option<WorkItemSummary>,
    pub action: ReconcileAction,
    /// State written to the work item; `None` when left untouched.
    pub state_applied: Option<WorkItemState>,
    pub comments_added: usize,
    pub warnings: Vec<String>,
}

impl ReconcileOutcome {
    fn begin(tracked: &TrackedIssue) -> Self {
        Self {
            issue: tracked.reference(),
            issue_url: tracked.html_url().to_string(),
            title: tracked.correlation_key().to_string(),
            existing: None,
            action: ReconcileAction::WouldCreate,
            state_applied: None,
            comments_added: 0,
            warnings: Vec::new(),
        }
    }
}

/// How the state step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateUpdate {
    Applied(WorkItemState),
    /// The work item already had the mapped state.
    Unchanged(WorkItemState),
    /// Closed issue with no resolution label; nothing was written.
    Unclassified,
}

/// A failed issue in a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub issue_url: String,
    pub error: String,
}

impl From<&ReconcileFailure> for BatchFailure {
    fn from(failure: &ReconcileFailure) -> Self {
        Self {
            issue_url: failure.issue_url.clone(),
            error: failure.error.to_string(),
        }
    }
}

/// Result of reconciling every tracked issue in a repository.
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub repository: String,
    pub outcomes: Vec<ReconcileOutcome>,
    #[serde(serialize_with = "serialize_failures")]
    pub failures: Vec<ReconcileFailure>,
}

fn serialize_failures<S: serde::Serializer>(
    failures: &[ReconcileFailure],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(failures.iter().map(BatchFailure::from))
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives reconciliation of GitHub issues into Azure DevOps work items.
pub struct ReconciliationEngine {
    source: Arc<dyn SourceTracker>,
    target: Arc<dyn TargetTracker>,
    lookup: WorkItemLookup,
    comments: CommentReconciler,
    patches: PatchBuilder,
    settings: EngineSettings,
}

impl ReconciliationEngine {
    pub fn new(
        source: Arc<dyn SourceTracker>,
        target: Arc<dyn TargetTracker>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            lookup: WorkItemLookup::new(Arc::clone(&target)),
            comments: CommentReconciler::new(Arc::clone(&source), Arc::clone(&target)),
            patches: PatchBuilder::new(settings.area_path.clone()),
            source,
            target,
            settings,
        }
    }

    /// The work item mirroring `tracked`, under the configured failure policy.
    pub async fn find_existing(&self, tracked: &TrackedIssue) -> SyncResult<Option<WorkItem>> {
        tracked.validate()?;
        let outcome = self.lookup.find(tracked).await?;
        WorkItemLookup::resolve(outcome, self.settings.lookup_failure_policy, tracked)
    }

    /// Reconcile a single issue. Errors are tagged with the issue URL.
    #[tracing::instrument(skip(self, tracked), fields(issue = %tracked.reference()))]
    pub async fn reconcile(
        &self,
        tracked: &TrackedIssue,
        options: ReconcileOptions,
    ) -> Result<ReconcileOutcome, ReconcileFailure> {
        self.reconcile_inner(tracked, options)
            .await
            .map_err(|err| ReconcileFailure::new(tracked.html_url(), err))
    }

    async fn reconcile_inner(
        &self,
        tracked: &TrackedIssue,
        options: ReconcileOptions,
    ) -> SyncResult<ReconcileOutcome> {
        let mut outcome = ReconcileOutcome::begin(tracked);
        let existing = self.find_existing(tracked).await?;

        if let Some(item) = &existing {
            tracing::info!(link = item.readable_link(), "Found existing work item");
            outcome.existing = Some(WorkItemSummary::from(item));
        }

        match existing {
            Some(item) if !options.allow_existing => {
                if options.dry_run {
                    tracing::info!("Not updating existing work item, since dry run was requested");
                    outcome.action = ReconcileAction::WouldUpdate(WorkItemSummary::from(&item));
                    return Ok(outcome);
                }
                tracing::info!("Updating existing work item, since allow-existing was not set");
                self.update_existing(&item, tracked, &mut outcome).await?;
            }
            _ => {
                if options.dry_run {
                    tracing::info!("Not creating work item, since dry run was requested");
                    outcome.action = ReconcileAction::WouldCreate;
                    return Ok(outcome);
                }
                self.create_new(tracked, &mut outcome).await?;
            }
        }
        Ok(outcome)
    }

    async fn update_existing(
        &self,
        item: &WorkItem,
        tracked: &TrackedIssue,
        outcome: &mut ReconcileOutcome,
    ) -> SyncResult<()> {
        let id = item.require_id("update work item")?;
        let updated = self
            .target
            .update_work_item(id, &self.patches.for_update(tracked))
            .await?;
        outcome.action = ReconcileAction::Updated(WorkItemSummary::from(&updated));

        self.record_state(&updated, tracked, outcome).await?;

        let posted = self.comments.reconcile(&updated, tracked).await?;
        outcome.comments_added = posted.len();
        Ok(())
    }

    async fn create_new(
        &self,
        tracked: &TrackedIssue,
        outcome: &mut ReconcileOutcome,
    ) -> SyncResult<()> {
        let kind = work_item_type(tracked);
        tracing::info!(work_item_type = %kind, "Creating new work item");
        let created = self
            .target
            .create_work_item(kind, &self.patches.for_create(tracked))
            .await?;
        outcome.action = ReconcileAction::Created(WorkItemSummary::from(&created));

        let id = created.require_id("add comment text")?;
        self.target
            .add_comment(id, &provenance_comment(tracked))
            .await?;
        tracing::info!(link = created.readable_link(), "Created work item");

        self.record_state(&created, tracked, outcome).await?;

        let posted = self.comments.reconcile_against(id, tracked, &[]).await?;
        outcome.comments_added = posted.len();
        Ok(())
    }

    async fn record_state(
        &self,
        item: &WorkItem,
        tracked: &TrackedIssue,
        outcome: &mut ReconcileOutcome,
    ) -> SyncResult<()> {
        match self.apply_state(item, tracked).await? {
            StateUpdate::Applied(state) => outcome.state_applied = Some(state),
            StateUpdate::Unchanged(_) => {}
            StateUpdate::Unclassified => outcome.warnings.push(format!(
                "Closed issue {} has no resolution label; it may be missing a triage label",
                tracked.html_url()
            )),
        }
        Ok(())
    }

    /// Bring the work item's state in line with the issue.
    ///
    /// State and reason are written in a single patch. Nothing is written
    /// when the item already has the mapped state or no mapping exists.
    pub async fn apply_state(
        &self,
        item: &WorkItem,
        tracked: &TrackedIssue,
    ) -> SyncResult<StateUpdate> {
        let Some(target_state) = map_state(&tracked.issue) else {
            tracing::warn!(
                issue_url = %tracked.html_url(),
                work_item = item.readable_link(),
                "Could not determine work item state for closed issue; it may be missing a triage label"
            );
            return Ok(StateUpdate::Unclassified);
        };

        if item.state() == Some(target_state.state)
            && item.field_str(fields::REASON) == Some(target_state.reason)
        {
            tracing::debug!(state = %target_state, "Work item state already up to date");
            return Ok(StateUpdate::Unchanged(target_state));
        }

        let id = item.require_id("update state")?;
        let patch = [
            PatchOperation::new(PatchOp::Replace, fields::STATE, target_state.state),
            PatchOperation::new(PatchOp::Replace, fields::REASON, target_state.reason),
        ];
        self.target.update_work_item(id, &patch).await?;
        tracing::info!(work_item_id = id, state = %target_state, "Updated work item state");
        Ok(StateUpdate::Applied(target_state))
    }

    /// Reconcile every issue in `repo` carrying the tracking label.
    pub async fn reconcile_all(
        &self,
        repo: &RepositoryRef,
        options: ReconcileOptions,
    ) -> SyncResult<BatchReport> {
        self.reconcile_all_with_progress(repo, options, |_, _, _| {})
            .await
    }

    /// [`Self::reconcile_all`], calling `progress(index, total, issue)`
    /// before each issue. One issue failing does not stop the batch.
    pub async fn reconcile_all_with_progress(
        &self,
        repo: &RepositoryRef,
        options: ReconcileOptions,
        mut progress: impl FnMut(usize, usize, &TrackedIssue) + Send,
    ) -> SyncResult<BatchReport> {
        let issues = self
            .source
            .list_tracked_issues(repo, &self.settings.tracking_label)
            .await?;
        tracing::info!(
            repository = %repo,
            label = %self.settings.tracking_label,
            count = issues.len(),
            "Reconciling tracked issues"
        );

        let mut report = BatchReport {
            repository: repo.to_string(),
            ..BatchReport::default()
        };
        let total = issues.len();
        for (index, tracked) in issues.iter().enumerate() {
            progress(index, total, tracked);
            match self.reconcile(tracked, options).await {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(failure) => {
                    tracing::error!(
                        issue_url = %failure.issue_url,
                        error = %failure.error,
                        "Failed to reconcile issue"
                    );
                    report.failures.push(failure);
                }
            }
        }
        Ok(report)
    }
}

/// First comment on a newly created work item.
pub fn provenance_comment(tracked: &TrackedIssue) -> String {
    format!(
        "Work item created from public GitHub issue at {}, using the gh-sync tool.",
        tracked.html_url()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockSourceTracker, MockTargetTracker};
    use crate::domain::errors::SyncError;
    use crate::domain::models::issue::fixtures::issue;
    use crate::domain::models::IssueState;

    fn settings(policy: LookupFailurePolicy) -> EngineSettings {
        EngineSettings {
            area_path: r"Widgets\Triage".to_string(),
            tracking_label: "tracking".to_string(),
            lookup_failure_policy: policy,
        }
    }

    fn engine(
        source: &MockSourceTracker,
        target: &MockTargetTracker,
        policy: LookupFailurePolicy,
    ) -> ReconciliationEngine {
        ReconciliationEngine::new(
            Arc::new(source.clone()),
            Arc::new(target.clone()),
            settings(policy),
        )
    }

    fn write() -> ReconcileOptions {
        ReconcileOptions::default()
    }

    #[tokio::test]
    async fn test_creates_work_item_with_provenance_comment() {
        let (source, target) = (MockSourceTracker::new(), MockTargetTracker::new());
        let tracked = issue("acme", "widgets", 42, "Crash on load", IssueState::Open, &["bug"]);
        let engine = engine(&source, &target, LookupFailurePolicy::Fail);

        let outcome = engine.reconcile(&tracked, write()).await.unwrap();

        let ReconcileAction::Created(summary) = &outcome.action else {
            panic!("expected Created, got {:?}", outcome.action);
        };
        let id = summary.id.unwrap();
        let comments = target.comments(id).await;
        assert_eq!(
            comments[0].text,
            "Work item created from public GitHub issue at https://github.com/acme/widgets/issues/42, using the gh-sync tool."
        );
        let item = target.work_item(id).await.unwrap();
        assert_eq!(item.title(), Some("Crash on load (acme/widgets#42)"));
        assert_eq!(item.state(), Some("Active"));
        assert_eq!(outcome.state_applied, Some(WorkItemState::new("Active", "Approved")));
    }

    #[tokio::test]
    async fn test_existing_item_is_updated_not_duplicated() {
        let (source, target) = (MockSourceTracker::new(), MockTargetTracker::new());
        let tracked = issue("acme", "widgets", 42, "Crash on load", IssueState::Open, &[]);
        let id = target
            .seed_work_item("Crash on load (acme/widgets#42)", "Active")
            .await;
        let engine = engine(&source, &target, LookupFailurePolicy::Fail);

        let outcome = engine.reconcile(&tracked, write()).await.unwrap();
        assert!(matches!(outcome.action, ReconcileAction::Updated(ref s) if s.id == Some(id)));
        // Seeded without a reason, so the pair is written once.
        assert_eq!(outcome.state_applied, Some(WorkItemState::new("Active", "Approved")));

        let outcome = engine.reconcile(&tracked, write()).await.unwrap();
        let calls = target.calls().await;
        assert!(calls.creates.is_empty());
        assert_eq!(calls.record_updates(), 2);
        assert_eq!(calls.updates.len(), 3);
        assert!(outcome.state_applied.is_none());
    }

    #[tokio::test]
    async fn test_allow_existing_creates_alongside() {
        let (source, target) = (MockSourceTracker::new(), MockTargetTracker::new());
        let tracked = issue("acme", "widgets", 42, "Crash on load", IssueState::Open, &[]);
        target
            .seed_work_item("Crash on load (acme/widgets#42)", "Active")
            .await;
        let engine = engine(&source, &target, LookupFailurePolicy::Fail);

        let options = ReconcileOptions {
            allow_existing: true,
            ..ReconcileOptions::default()
        };
        let outcome = engine.reconcile(&tracked, options).await.unwrap();
        assert!(outcome.existing.is_some());
        assert!(matches!(outcome.action, ReconcileAction::Created(_)));
        assert_eq!(target.work_items().await.len(), 2);
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let (source, target) = (MockSourceTracker::new(), MockTargetTracker::new());
        let tracked = issue("acme", "widgets", 42, "Crash on load", IssueState::Open, &[]);
        let engine = engine(&source, &target, LookupFailurePolicy::Fail);
        let dry = ReconcileOptions {
            dry_run: true,
            ..ReconcileOptions::default()
        };

        let outcome = engine.reconcile(&tracked, dry).await.unwrap();
        assert_eq!(outcome.action, ReconcileAction::WouldCreate);

        target
            .seed_work_item("Crash on load (acme/widgets#42)", "New")
            .await;
        let outcome = engine.reconcile(&tracked, dry).await.unwrap();
        assert!(matches!(outcome.action, ReconcileAction::WouldUpdate(_)));

        assert_eq!(target.calls().await.mutations(), 0);
    }

    #[tokio::test]
    async fn test_closed_issue_without_resolution_leaves_state_alone() {
        let (source, target) = (MockSourceTracker::new(), MockTargetTracker::new());
        let tracked = issue("acme", "widgets", 42, "Crash", IssueState::Closed, &["bug"]);
        let id = target.seed_work_item("Crash (acme/widgets#42)", "Active").await;
        let engine = engine(&source, &target, LookupFailurePolicy::Fail);

        let outcome = engine.reconcile(&tracked, write()).await.unwrap();
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("https://github.com/acme/widgets/issues/42"));
        assert_eq!(target.work_item(id).await.unwrap().state(), Some("Active"));
        assert!(!target
            .calls()
            .await
            .updates
            .iter()
            .any(|(_, patch)| patch.iter().any(|op| op.targets(fields::STATE))));
    }

    #[tokio::test]
    async fn test_resolution_label_sets_state_and_reason_together() {
        let (source, target) = (MockSourceTracker::new(), MockTargetTracker::new());
        let tracked = issue(
            "acme",
            "widgets",
            42,
            "Crash",
            IssueState::Closed,
            &["Resolution-Duplicate"],
        );
        let id = target.seed_work_item("Crash (acme/widgets#42)", "Active").await;
        let engine = engine(&source, &target, LookupFailurePolicy::Fail);

        engine.reconcile(&tracked, write()).await.unwrap();

        let calls = target.calls().await;
        let (_, state_patch) = calls.updates.last().unwrap();
        assert_eq!(state_patch.len(), 2);
        assert!(state_patch[0].targets(fields::STATE));
        assert!(state_patch[1].targets(fields::REASON));
        let item = target.work_item(id).await.unwrap();
        assert_eq!(item.state(), Some("Resolved"));
        assert_eq!(item.field_str(fields::REASON), Some("Duplicate"));
    }

    #[tokio::test]
    async fn test_ambiguous_lookup_fails_without_writes() {
        let (source, target) = (MockSourceTracker::new(), MockTargetTracker::new());
        let tracked = issue("acme", "widgets", 42, "Crash", IssueState::Open, &[]);
        target.seed_work_item("Crash (acme/widgets#42)", "Active").await;
        target.seed_work_item("Crash (acme/widgets#42)", "Active").await;
        let engine = engine(&source, &target, LookupFailurePolicy::TreatAsNotFound);

        let failure = engine.reconcile(&tracked, write()).await.unwrap_err();
        assert_eq!(failure.issue_url, "https://github.com/acme/widgets/issues/42");
        assert!(matches!(failure.error, SyncError::AmbiguousState { count: 2, .. }));
        assert_eq!(target.calls().await.mutations(), 0);
    }

    #[tokio::test]
    async fn test_lookup_failure_policy() {
        let (source, target) = (MockSourceTracker::new(), MockTargetTracker::new());
        let tracked = issue("acme", "widgets", 42, "Crash", IssueState::Open, &[]);
        target.fail_title_queries(true).await;

        let strict = engine(&source, &target, LookupFailurePolicy::Fail);
        let failure = strict.reconcile(&tracked, write()).await.unwrap_err();
        assert!(matches!(failure.error, SyncError::Transport(_)));
        assert_eq!(target.calls().await.mutations(), 0);

        let lenient = engine(&source, &target, LookupFailurePolicy::TreatAsNotFound);
        let outcome = lenient.reconcile(&tracked, write()).await.unwrap();
        assert!(matches!(outcome.action, ReconcileAction::Created(_)));
    }

    #[tokio::test]
    async fn test_created_item_without_id_is_missing_context() {
        let (source, target) = (MockSourceTracker::new(), MockTargetTracker::new());
        let tracked = issue("acme", "widgets", 42, "Crash", IssueState::Open, &[]);
        target.create_without_id(true).await;
        let engine = engine(&source, &target, LookupFailurePolicy::Fail);

        let failure = engine.reconcile(&tracked, write()).await.unwrap_err();
        assert!(matches!(failure.error, SyncError::MissingContext(_)));
        assert!(target.calls().await.comments_added.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_issue_number_is_rejected_before_lookup() {
        let (source, target) = (MockSourceTracker::new(), MockTargetTracker::new());
        let tracked = issue("acme", "widgets", 0, "Crash", IssueState::Open, &[]);
        let engine = engine(&source, &target, LookupFailurePolicy::Fail);

        let failure = engine.reconcile(&tracked, write()).await.unwrap_err();
        assert!(matches!(failure.error, SyncError::InvalidArgument(_)));
        assert_eq!(target.calls().await.queries, 0);
    }

    #[tokio::test]
    async fn test_batch_continues_past_failures() {
        let (source, target) = (MockSourceTracker::new(), MockTargetTracker::new());
        let repo = RepositoryRef::new("acme", "widgets");
        for (n, title) in [(1, "One"), (2, "Two"), (3, "Three")] {
            source
                .add_issue(issue("acme", "widgets", n, title, IssueState::Open, &["tracking"]))
                .await;
        }
        source
            .add_issue(issue("acme", "widgets", 4, "Untracked", IssueState::Open, &[]))
            .await;
        target.seed_work_item("Two (acme/widgets#2)", "Active").await;
        target.seed_work_item("Two (acme/widgets#2)", "Active").await;
        let engine = engine(&source, &target, LookupFailurePolicy::Fail);

        let mut seen = Vec::new();
        let report = engine
            .reconcile_all_with_progress(&repo, write(), |i, total, t| {
                seen.push((i, total, t.issue.number));
            })
            .await
            .unwrap();

        assert_eq!(seen, vec![(0, 3, 1), (1, 3, 2), (2, 3, 3)]);
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(
            report.failures[0].issue_url,
            "https://github.com/acme/widgets/issues/2"
        );
        assert!(!report.is_success());
    }
}
