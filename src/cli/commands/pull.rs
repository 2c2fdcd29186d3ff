//! `pull-gh` and `pull-all-gh`: mirror GitHub issues into Azure DevOps.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::display::{
    action_failure, action_success, action_warning, colorize_action, create_spinner,
    hidden_spinner, list_table, render_list, truncate, CommandOutput, ProgressBarExt,
};
use crate::cli::types::{PullAllArgs, PullArgs};
use crate::domain::ports::SourceTracker;
use crate::services::{BatchReport, ReconcileAction, ReconcileOptions, ReconcileOutcome};

use super::CommandContext;

#[derive(Debug, Serialize)]
pub struct PullOutput {
    #[serde(flatten)]
    pub outcome: ReconcileOutcome,
}

impl CommandOutput for PullOutput {
    fn to_human(&self) -> String {
        outcome_lines(&self.outcome).join("\n")
    }
}

fn outcome_lines(outcome: &ReconcileOutcome) -> Vec<String> {
    let mut lines = vec![format!("Pulling {}: {}", outcome.issue, outcome.title)];
    if let Some(existing) = &outcome.existing {
        lines.push(format!("Found existing work item: {}", existing.link));
    }
    match &outcome.action {
        ReconcileAction::Updated(item) => {
            lines.push(action_success(&format!("Updated work item {}", item.link)));
        }
        ReconcileAction::Created(item) => {
            lines.push(action_success(&format!("Created work item {}", item.link)));
        }
        ReconcileAction::WouldUpdate(item) => lines.push(format!(
            "Not updating existing work item {}, as --dry-run was set.",
            item.link
        )),
        ReconcileAction::WouldCreate => {
            lines.push("Would create new work item, but --dry-run was set.".to_string());
        }
    }
    if let Some(state) = outcome.state_applied {
        lines.push(format!("Set state to {state}."));
    }
    if !matches!(
        outcome.action,
        ReconcileAction::WouldCreate | ReconcileAction::WouldUpdate(_)
    ) {
        lines.push(format!(
            "Added {} comments from GitHub issue.",
            outcome.comments_added
        ));
    }
    lines.extend(outcome.warnings.iter().map(|w| action_warning(w)));
    lines
}

const fn action_name(action: &ReconcileAction) -> &'static str {
    match action {
        ReconcileAction::Updated(_) => "updated",
        ReconcileAction::Created(_) => "created",
        ReconcileAction::WouldUpdate(_) => "would update",
        ReconcileAction::WouldCreate => "would create",
    }
}

#[derive(Debug, Serialize)]
pub struct PullAllOutput {
    #[serde(flatten)]
    pub report: BatchReport,
}

impl CommandOutput for PullAllOutput {
    fn to_human(&self) -> String {
        let report = &self.report;
        let mut table = list_table(&["issue", "action", "work item", "comments", "title"]);
        for outcome in &report.outcomes {
            let link = match &outcome.action {
                ReconcileAction::Updated(item)
                | ReconcileAction::Created(item)
                | ReconcileAction::WouldUpdate(item) => item.link.clone(),
                ReconcileAction::WouldCreate => "-".to_string(),
            };
            table.add_row(vec![
                outcome.issue.clone(),
                colorize_action(action_name(&outcome.action)).to_string(),
                link,
                outcome.comments_added.to_string(),
                truncate(&outcome.title, 48),
            ]);
        }

        let mut lines = vec![render_list("issue", &table, report.outcomes.len())];
        for outcome in &report.outcomes {
            lines.extend(outcome.warnings.iter().map(|w| action_warning(w)));
        }
        for failure in &report.failures {
            lines.push(action_failure(&format!(
                "{}: {}",
                failure.issue_url, failure.error
            )));
        }
        lines.push(format!(
            "{} reconciled, {} failed in {}.",
            report.outcomes.len(),
            report.failures.len(),
            report.repository
        ));
        lines.join("\n")
    }
}

pub async fn execute_pull(args: PullArgs, ctx: &CommandContext) -> Result<()> {
    let session = ctx.connect().await?;
    let engine = session.engine(&ctx.config);

    let tracked = session
        .github
        .get_issue(&args.repo, args.issue)
        .await
        .with_context(|| format!("Failed to fetch {}#{}", args.repo, args.issue))?;

    let outcome = engine
        .reconcile(&tracked, ReconcileOptions::from(args.flags))
        .await?;
    ctx.emit(&PullOutput { outcome });
    Ok(())
}

pub async fn execute_pull_all(args: PullAllArgs, ctx: &CommandContext) -> Result<()> {
    let session = ctx.connect().await?;
    let engine = session.engine(&ctx.config);

    let spinner = if ctx.json {
        hidden_spinner()
    } else {
        create_spinner()
    };
    spinner.set_message(format!("Listing tracked issues in {}", args.repo));

    let report = engine
        .reconcile_all_with_progress(&args.repo, ReconcileOptions::from(args.flags), |i, total, issue| {
            spinner.set_message(format!("[{}/{total}] {}", i + 1, issue.reference()));
        })
        .await
        .with_context(|| format!("Failed to list tracked issues in {}", args.repo))?;

    if report.is_success() {
        spinner.finish_success(format!("{} issues reconciled", report.outcomes.len()));
    } else {
        spinner.finish_error(format!("{} issues failed", report.failures.len()));
    }

    let failed = report.failures.len();
    ctx.emit(&PullAllOutput { report });
    if failed > 0 {
        anyhow::bail!("{failed} issue(s) in {} failed to reconcile", args.repo);
    }
    Ok(())
}
