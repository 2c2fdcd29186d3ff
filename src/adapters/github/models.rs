//! GitHub REST API response models.
//!
//! These structs map to the GitHub REST API v3 JSON payloads. They are used
//! internally by the GitHub adapter and converted into domain types before
//! leaving it.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::models::{IssueState, SourceComment, SourceIssue, UserRef};

/// A user as embedded in issues, comments, and repositories.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    #[serde(default)]
    pub html_url: String,
}

impl GitHubUser {
    /// Stand-in for authors whose accounts were deleted.
    fn ghost() -> Self {
        Self {
            login: "ghost".to_string(),
            html_url: "https://github.com/ghost".to_string(),
        }
    }
}

impl From<GitHubUser> for UserRef {
    fn from(user: GitHubUser) -> Self {
        Self {
            login: user.login,
            html_url: user.html_url,
        }
    }
}

/// Repository metadata, used to learn the canonical owner and name.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRepository {
    pub name: String,
    pub full_name: String,
    pub owner: GitHubUser,
    pub html_url: String,
}

/// A label applied to a GitHub issue.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubLabel {
    pub name: String,
}

/// Present on pull requests, which share the issues endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubPullRequestRef {
    pub url: String,
}

/// An issue returned by the GitHub API.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubIssue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    /// "open" or "closed".
    pub state: String,
    #[serde(default)]
    pub labels: Vec<GitHubLabel>,
    #[serde(default)]
    pub user: Option<GitHubUser>,
    #[serde(default)]
    pub pull_request: Option<GitHubPullRequestRef>,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GitHubIssue {
    pub const fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

impl From<GitHubIssue> for SourceIssue {
    fn from(issue: GitHubIssue) -> Self {
        let state = if issue.state.eq_ignore_ascii_case("closed") {
            IssueState::Closed
        } else {
            IssueState::Open
        };
        Self {
            number: issue.number,
            title: issue.title,
            body: issue.body.unwrap_or_default(),
            state,
            labels: issue.labels.into_iter().map(|l| l.name).collect(),
            author: issue.user.unwrap_or_else(GitHubUser::ghost).into(),
            html_url: issue.html_url,
            created_at: issue.created_at,
            updated_at: issue.updated_at,
        }
    }
}

/// A comment on a GitHub issue.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubComment {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: Option<GitHubUser>,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<GitHubComment> for SourceComment {
    fn from(comment: GitHubComment) -> Self {
        Self {
            id: comment.id,
            body: comment.body.unwrap_or_default(),
            author: comment.user.unwrap_or_else(GitHubUser::ghost).into(),
            html_url: comment.html_url,
            created_at: comment.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_issue_converts_to_domain() {
        let json = r#"{
            "id": 1,
            "number": 42,
            "title": "Crash on load",
            "body": "Users cannot open the app.",
            "state": "closed",
            "labels": [
                { "name": "bug", "color": "d73a4a" },
                { "name": "Resolution-Done", "color": "e4e669" }
            ],
            "user": { "login": "octocat", "html_url": "https://github.com/octocat" },
            "pull_request": null,
            "updated_at": "2024-01-15T10:30:00Z",
            "html_url": "https://github.com/acme/widgets/issues/42",
            "created_at": "2024-01-14T08:00:00Z"
        }"#;
        let issue: GitHubIssue = serde_json::from_str(json).unwrap();
        assert!(!issue.is_pull_request());

        let issue = SourceIssue::from(issue);
        assert_eq!(issue.number, 42);
        assert_eq!(issue.state, IssueState::Closed);
        assert!(issue.labels.contains("Resolution-Done"));
        assert_eq!(issue.author.login, "octocat");
    }

    #[test]
    fn test_minimal_issue_defaults() {
        let json = r#"{
            "number": 1,
            "title": "Minimal issue",
            "state": "open",
            "updated_at": "2024-01-10T00:00:00Z",
            "html_url": "https://github.com/acme/widgets/issues/1",
            "created_at": "2024-01-09T00:00:00Z"
        }"#;
        let issue = SourceIssue::from(serde_json::from_str::<GitHubIssue>(json).unwrap());
        assert!(issue.body.is_empty());
        assert!(issue.labels.is_empty());
        assert_eq!(issue.author.login, "ghost");
    }

    #[test]
    fn test_pr_detection_via_pull_request_field() {
        let json = r#"{
            "number": 99,
            "title": "Add feature X",
            "state": "open",
            "pull_request": { "url": "https://api.github.com/repos/acme/widgets/pulls/99" },
            "updated_at": "2024-01-16T12:00:00Z",
            "html_url": "https://github.com/acme/widgets/pull/99",
            "created_at": "2024-01-15T09:00:00Z"
        }"#;
        let issue: GitHubIssue = serde_json::from_str(json).unwrap();
        assert!(issue.is_pull_request());
    }

    #[test]
    fn test_comment_with_null_body() {
        let json = r#"{
            "id": 7,
            "body": null,
            "user": { "login": "hubot", "html_url": "https://github.com/hubot" },
            "html_url": "https://github.com/acme/widgets/issues/42#issuecomment-7",
            "created_at": "2024-01-15T10:30:00Z"
        }"#;
        let comment = SourceComment::from(serde_json::from_str::<GitHubComment>(json).unwrap());
        assert_eq!(comment.id, 7);
        assert!(comment.body.is_empty());
        assert_eq!(comment.author.login, "hubot");
    }
}
