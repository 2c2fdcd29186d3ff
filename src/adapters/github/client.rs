//! GitHub HTTP client with rate limiting.
//!
//! Wraps the GitHub REST API v3, providing the reads the reconciliation
//! engine needs. A `governor` limiter keeps the client within its hourly
//! request budget (5 000 req/hour for authenticated requests by default).

use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;

use crate::adapters::http::{decode, send_failed};
use crate::domain::errors::{SyncError, SyncResult};
use crate::domain::models::{GitHubConfig, RepositoryRef, SourceComment, TrackedIssue};
use crate::domain::ports::SourceTracker;

use super::models::{GitHubComment, GitHubIssue, GitHubRepository, GitHubUser};

const SERVICE: &str = "GitHub";
const PER_PAGE: usize = 100;
const USER_AGENT: &str = concat!("gh-sync/", env!("CARGO_PKG_VERSION"));

type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// HTTP client for the GitHub REST API v3.
#[derive(Clone)]
pub struct GitHubClient {
    http: Client,
    token: String,
    base_url: Url,
    rate_limiter: Arc<Limiter>,
}

impl fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl GitHubClient {
    /// Create a client for the API at `config.api_base_url`.
    pub fn new(token: impl Into<String>, config: &GitHubConfig) -> SyncResult<Self> {
        let base_url = Url::parse(&config.api_base_url).map_err(|e| {
            SyncError::Configuration(format!(
                "invalid GitHub API base URL '{}': {e}",
                config.api_base_url
            ))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SyncError::Configuration(format!(
                "GitHub API base URL '{base_url}' cannot be used as a base"
            )));
        }
        let per_hour = NonZeroU32::new(config.requests_per_hour).unwrap_or(NonZeroU32::MIN);
        Ok(Self {
            http: Client::new(),
            token: token.into(),
            base_url,
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_hour(per_hour))),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Wait for a rate-limit cell and build an authorized request.
    async fn rate_limited_request(&self, method: Method, url: Url) -> RequestBuilder {
        if self.rate_limiter.check().is_err() {
            tracing::warn!("GitHub rate limit reached, waiting");
            self.rate_limiter.until_ready().await;
        }
        self.http
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", USER_AGENT)
    }

    async fn get_json<T: DeserializeOwned>(&self, operation: &str, url: Url) -> SyncResult<T> {
        tracing::debug!(operation, url = %url, "GitHub request");
        let resp = self
            .rate_limited_request(Method::GET, url)
            .await
            .send()
            .await
            .map_err(|e| send_failed(SERVICE, operation, &e))?;
        decode(SERVICE, operation, resp).await
    }

    /// Follow `page` / `per_page` pagination until a short page comes back.
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        operation: &str,
        url: &Url,
        query: &[(&str, &str)],
    ) -> SyncResult<Vec<T>> {
        let mut all = Vec::new();
        for page in 1.. {
            let mut page_url = url.clone();
            page_url
                .query_pairs_mut()
                .extend_pairs(query)
                .append_pair("per_page", &PER_PAGE.to_string())
                .append_pair("page", &page.to_string());
            let batch: Vec<T> = self.get_json(operation, page_url).await?;
            let done = batch.len() < PER_PAGE;
            all.extend(batch);
            if done {
                break;
            }
        }
        Ok(all)
    }

    /// Check the token by fetching the authenticated user; returns the login.
    pub async fn verify_token(&self) -> SyncResult<String> {
        let user: GitHubUser = self.get_json("get_user", self.endpoint(&["user"])).await?;
        if user.login.trim().is_empty() {
            return Err(SyncError::Authentication {
                service: SERVICE.to_string(),
                message: "authenticated, but no user login was returned".to_string(),
            });
        }
        tracing::info!(login = %user.login, "Using GitHub as {}", user.login);
        Ok(user.login)
    }

    /// Repository metadata, giving the canonical owner and name.
    pub async fn get_repository(&self, repo: &RepositoryRef) -> SyncResult<GitHubRepository> {
        self.get_json(
            "get_repository",
            self.endpoint(&["repos", &repo.owner, &repo.name]),
        )
        .await
    }

    async fn canonical(&self, repo: &RepositoryRef) -> SyncResult<RepositoryRef> {
        let metadata = self.get_repository(repo).await?;
        Ok(RepositoryRef::new(metadata.owner.login, metadata.name))
    }
}

#[async_trait]
impl SourceTracker for GitHubClient {
    async fn get_issue(&self, repo: &RepositoryRef, number: u64) -> SyncResult<TrackedIssue> {
        let repository = self.canonical(repo).await?;
        let issue: GitHubIssue = self
            .get_json(
                "get_issue",
                self.endpoint(&[
                    "repos",
                    &repository.owner,
                    &repository.name,
                    "issues",
                    &number.to_string(),
                ]),
            )
            .await?;
        Ok(TrackedIssue::new(repository, issue.into()))
    }

    async fn list_tracked_issues(
        &self,
        repo: &RepositoryRef,
        label: &str,
    ) -> SyncResult<Vec<TrackedIssue>> {
        let repository = self.canonical(repo).await?;
        let url = self.endpoint(&["repos", &repository.owner, &repository.name, "issues"]);
        let issues: Vec<GitHubIssue> = self
            .get_all_pages("list_issues", &url, &[("state", "all"), ("labels", label)])
            .await?;
        Ok(issues
            .into_iter()
            .filter(|issue| !issue.is_pull_request())
            .map(|issue| TrackedIssue::new(repository.clone(), issue.into()))
            .collect())
    }

    async fn list_comments(&self, issue: &TrackedIssue) -> SyncResult<Vec<SourceComment>> {
        let url = self.endpoint(&[
            "repos",
            &issue.repository.owner,
            &issue.repository.name,
            "issues",
            &issue.issue.number.to_string(),
            "comments",
        ]);
        let comments: Vec<GitHubComment> = self.get_all_pages("list_comments", &url, &[]).await?;
        Ok(comments.into_iter().map(SourceComment::from).collect())
    }
}
