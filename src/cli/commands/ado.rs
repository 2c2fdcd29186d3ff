//! `get-ado` and `find-ado`: read-only Azure DevOps commands.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::display::{colorize_state, truncate, CommandOutput, DetailView};
use crate::cli::types::{FindAdoArgs, GetAdoArgs};
use crate::domain::models::{fields, WorkItem};
use crate::domain::ports::{SourceTracker, TargetTracker};
use crate::services::WorkItemSummary;

use super::CommandContext;

/// Field values longer than this are shortened in human output.
const FIELD_WIDTH: usize = 96;

#[derive(Debug, Serialize)]
pub struct WorkItemOutput {
    pub work_item: WorkItem,
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Object(map) => map
            .get("displayName")
            .and_then(serde_json::Value::as_str)
            .map_or_else(|| value.to_string(), str::to_string),
        other => other.to_string(),
    }
}

impl CommandOutput for WorkItemOutput {
    fn to_human(&self) -> String {
        let item = &self.work_item;
        let title = match (item.id, item.title()) {
            (Some(id), Some(title)) => format!("Work item {id}: {title}"),
            (Some(id), None) => format!("Work item {id}"),
            (None, _) => "Work item".to_string(),
        };
        let state = item.state().map(|s| colorize_state(s).to_string());

        let mut view = DetailView::new(&title)
            .field("URL", item.readable_link())
            .field_opt("State", state.as_deref())
            .field_opt("Reason", item.field_str(fields::REASON))
            .section("Fields");
        for (name, value) in &item.fields {
            view = view.field(name, &truncate(&display_value(value), FIELD_WIDTH));
        }
        if !item.relations.is_empty() {
            view = view.section("Relations");
            for relation in &item.relations {
                let text = match &relation.title {
                    Some(title) => format!("{} {} ({title})", relation.rel, relation.url),
                    None => format!("{} {}", relation.rel, relation.url),
                };
                view = view.item(&text);
            }
        }
        if !item.links.is_empty() {
            view = view.section("Links");
            let links: BTreeMap<&String, &String> = item.links.iter().collect();
            for (name, href) in links {
                view = view.field(name, href);
            }
        }
        view.render()
    }
}

#[derive(Debug, Serialize)]
pub struct FindOutput {
    pub issue: String,
    pub issue_url: String,
    pub title: String,
    pub work_item: Option<WorkItemSummary>,
}

impl CommandOutput for FindOutput {
    fn to_human(&self) -> String {
        match &self.work_item {
            Some(item) => format!("Found existing work item: {}", item.link),
            None => format!(
                "No work item found for {} (looked for \"{}\").",
                self.issue, self.title
            ),
        }
    }
}

pub async fn execute_get(args: GetAdoArgs, ctx: &CommandContext) -> Result<()> {
    let ado = ctx.connect_ado().await?;
    let work_item = ado
        .get_work_item(args.id)
        .await
        .with_context(|| format!("Failed to fetch work item {}", args.id))?;
    ctx.emit(&WorkItemOutput { work_item });
    Ok(())
}

pub async fn execute_find(args: FindAdoArgs, ctx: &CommandContext) -> Result<()> {
    let session = ctx.connect().await?;
    let engine = session.engine(&ctx.config);

    let tracked = session
        .github
        .get_issue(&args.repo, args.issue)
        .await
        .with_context(|| format!("Failed to fetch {}#{}", args.repo, args.issue))?;
    let existing = engine
        .find_existing(&tracked)
        .await
        .with_context(|| format!("Failed to look up work item for {}", tracked.html_url()))?;

    ctx.emit(&FindOutput {
        issue: tracked.reference(),
        issue_url: tracked.html_url().to_string(),
        title: tracked.correlation_key().to_string(),
        work_item: existing.as_ref().map(WorkItemSummary::from),
    });
    Ok(())
}
