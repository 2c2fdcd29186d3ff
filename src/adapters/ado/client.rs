//! Azure DevOps work item tracking client.
//!
//! Talks to the REST API of one collection and project. The personal access
//! token is sent as HTTP basic auth with an empty user name.

use std::fmt;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Url};

use crate::adapters::http::{decode, send_failed};
use crate::domain::errors::{SyncError, SyncResult};
use crate::domain::models::{
    AdoConfig, CommentPage, CorrelationKey, PatchOperation, WorkItem, WorkItemComment,
    WorkItemRef, WorkItemType,
};
use crate::domain::ports::TargetTracker;

use super::models::{
    AdoComment, AdoCommentCreate, AdoCommentList, AdoProject, AdoWorkItem, WiqlRequest,
    WiqlResult,
};

const SERVICE: &str = "Azure DevOps";
const API_VERSION: &str = "7.1";
const COMMENTS_API_VERSION: &str = "7.1-preview.4";
const JSON_PATCH: &str = "application/json-patch+json";

/// HTTP client for Azure DevOps work items in a single project.
#[derive(Clone)]
pub struct AdoClient {
    http: Client,
    token: String,
    collection: Url,
    project: String,
}

impl fmt::Debug for AdoClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdoClient")
            .field("collection", &self.collection.as_str())
            .field("project", &self.project)
            .finish_non_exhaustive()
    }
}

impl AdoClient {
    pub fn new(token: impl Into<String>, config: &AdoConfig) -> SyncResult<Self> {
        let collection = Url::parse(&config.collection_uri).map_err(|e| {
            SyncError::Configuration(format!(
                "invalid Azure DevOps collection URI '{}': {e}",
                config.collection_uri
            ))
        })?;
        if collection.cannot_be_a_base() {
            return Err(SyncError::Configuration(format!(
                "Azure DevOps collection URI '{collection}' cannot be used as a base"
            )));
        }
        if config.project.trim().is_empty() {
            return Err(SyncError::Configuration(
                "Azure DevOps project is not set".to_string(),
            ));
        }
        Ok(Self {
            http: Client::new(),
            token: token.into(),
            collection,
            project: config.project.clone(),
        })
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// `{collection}/{segments...}?api-version={version}`
    fn endpoint(&self, segments: &[&str], api_version: &str) -> Url {
        let mut url = self.collection.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.query_pairs_mut().append_pair("api-version", api_version);
        url
    }

    fn wit_endpoint(&self, segments: &[&str], api_version: &str) -> Url {
        let mut full = vec![self.project.as_str(), "_apis", "wit"];
        full.extend_from_slice(segments);
        self.endpoint(&full, api_version)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!(%method, url = %url, "Azure DevOps request");
        self.http
            .request(method, url)
            .basic_auth("", Some(&self.token))
            .header("Accept", "application/json")
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> SyncResult<T> {
        let resp = request
            .send()
            .await
            .map_err(|e| send_failed(SERVICE, operation, &e))?;
        decode(SERVICE, operation, resp).await
    }

    fn patch_body(patch: &[PatchOperation]) -> SyncResult<Vec<u8>> {
        Ok(serde_json::to_vec(patch)?)
    }

    /// Check the token by fetching the configured project.
    pub async fn verify(&self) -> SyncResult<AdoProject> {
        let url = self.endpoint(&["_apis", "projects", &self.project], API_VERSION);
        let project: AdoProject = self.send("get_project", self.request(Method::GET, url)).await?;
        tracing::info!(project = %project.name, "Connected to Azure DevOps");
        Ok(project)
    }
}

#[async_trait]
impl TargetTracker for AdoClient {
    async fn query_by_exact_title(&self, key: &CorrelationKey) -> SyncResult<Vec<WorkItemRef>> {
        let query = key.title_query();
        let url = self.wit_endpoint(&["wiql"], API_VERSION);
        let result: WiqlResult = self
            .send(
                "query_by_wiql",
                self.request(Method::POST, url).json(&WiqlRequest { query: &query }),
            )
            .await?;
        Ok(result.work_items.into_iter().map(WorkItemRef::from).collect())
    }

    async fn get_work_item(&self, id: u64) -> SyncResult<WorkItem> {
        let mut url = self.wit_endpoint(&["workitems", &id.to_string()], API_VERSION);
        url.query_pairs_mut().append_pair("$expand", "relations");
        let item: AdoWorkItem = self.send("get_work_item", self.request(Method::GET, url)).await?;
        Ok(item.into())
    }

    async fn create_work_item(
        &self,
        work_item_type: WorkItemType,
        patch: &[PatchOperation],
    ) -> SyncResult<WorkItem> {
        let type_segment = format!("${work_item_type}");
        let url = self.wit_endpoint(&["workitems", &type_segment], API_VERSION);
        let request = self
            .request(Method::POST, url)
            .header(CONTENT_TYPE, JSON_PATCH)
            .body(Self::patch_body(patch)?);
        let item: AdoWorkItem = self.send("create_work_item", request).await?;
        Ok(item.into())
    }

    async fn update_work_item(&self, id: u64, patch: &[PatchOperation]) -> SyncResult<WorkItem> {
        let url = self.wit_endpoint(&["workitems", &id.to_string()], API_VERSION);
        let request = self
            .request(Method::PATCH, url)
            .header(CONTENT_TYPE, JSON_PATCH)
            .body(Self::patch_body(patch)?);
        let item: AdoWorkItem = self.send("update_work_item", request).await?;
        Ok(item.into())
    }

    async fn list_comments(
        &self,
        id: u64,
        continuation_token: Option<&str>,
    ) -> SyncResult<CommentPage> {
        let mut url = self.wit_endpoint(
            &["workItems", &id.to_string(), "comments"],
            COMMENTS_API_VERSION,
        );
        if let Some(token) = continuation_token {
            url.query_pairs_mut().append_pair("continuationToken", token);
        }
        let list: AdoCommentList = self.send("get_comments", self.request(Method::GET, url)).await?;
        Ok(list.into())
    }

    async fn add_comment(&self, id: u64, text: &str) -> SyncResult<WorkItemComment> {
        let url = self.wit_endpoint(
            &["workItems", &id.to_string(), "comments"],
            COMMENTS_API_VERSION,
        );
        let comment: AdoComment = self
            .send(
                "add_comment",
                self.request(Method::POST, url).json(&AdoCommentCreate { text }),
            )
            .await?;
        Ok(comment.into())
    }
}
