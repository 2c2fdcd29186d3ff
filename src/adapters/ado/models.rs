//! Azure DevOps REST API payloads.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::{
    CommentPage, WorkItem, WorkItemComment, WorkItemRef, WorkItemRelation,
};

/// Body of a WIQL query request.
#[derive(Debug, Clone, Serialize)]
pub struct WiqlRequest<'a> {
    pub query: &'a str,
}

/// Result of a flat WIQL query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WiqlResult {
    #[serde(default)]
    pub work_items: Vec<AdoWorkItemReference>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdoWorkItemReference {
    pub id: u64,
    #[serde(default)]
    pub url: String,
}

impl From<AdoWorkItemReference> for WorkItemRef {
    fn from(r: AdoWorkItemReference) -> Self {
        Self { id: r.id, url: r.url }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdoLink {
    pub href: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdoRelation {
    pub rel: String,
    pub url: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl From<AdoRelation> for WorkItemRelation {
    fn from(r: AdoRelation) -> Self {
        let title = r
            .attributes
            .get("name")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);
        Self {
            rel: r.rel,
            url: r.url,
            title,
            attributes: r.attributes,
        }
    }
}

/// A work item as returned by the work item tracking API.
#[derive(Debug, Clone, Deserialize)]
pub struct AdoWorkItem {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub rev: Option<u64>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub fields: BTreeMap<String, serde_json::Value>,
    /// `null` unless relations were expanded.
    #[serde(default)]
    pub relations: Option<Vec<AdoRelation>>,
    #[serde(rename = "_links", default)]
    pub links: BTreeMap<String, AdoLink>,
}

impl From<AdoWorkItem> for WorkItem {
    fn from(item: AdoWorkItem) -> Self {
        let links: BTreeMap<String, String> = item
            .links
            .into_iter()
            .map(|(name, link)| (name, link.href))
            .collect();
        Self {
            id: item.id,
            rev: item.rev,
            url: item.url,
            html_url: links.get("html").cloned(),
            fields: item.fields,
            relations: item
                .relations
                .unwrap_or_default()
                .into_iter()
                .map(WorkItemRelation::from)
                .collect(),
            links,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdoIdentity {
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdoCommentCreate<'a> {
    pub text: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdoComment {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub created_by: Option<AdoIdentity>,
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub url: Option<String>,
}

impl From<AdoComment> for WorkItemComment {
    fn from(c: AdoComment) -> Self {
        Self {
            id: c.id,
            text: c.text,
            author: c.created_by.map(|who| who.display_name),
            url: c.url,
            created_at: c.created_date,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdoCommentList {
    #[serde(default)]
    pub comments: Vec<AdoComment>,
    #[serde(default)]
    pub continuation_token: Option<String>,
}

impl From<AdoCommentList> for CommentPage {
    fn from(list: AdoCommentList) -> Self {
        Self {
            comments: list.comments.into_iter().map(WorkItemComment::from).collect(),
            continuation_token: list.continuation_token.filter(|t| !t.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdoProject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub state: Option<String>,
}
