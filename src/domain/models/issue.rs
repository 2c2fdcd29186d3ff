//! GitHub-side domain models.
//!
//! A [`SourceIssue`] never knows which repository it came from; the pairing is
//! made explicit with [`TrackedIssue`] at fetch time.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::{SyncError, SyncResult};

use super::correlation::CorrelationKey;

/// An `owner/name` GitHub repository reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// A repository is linked when both halves of the slug are present.
    pub fn is_linked(&self) -> bool {
        !self.owner.trim().is_empty() && !self.name.trim().is_empty()
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryRef {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(SyncError::InvalidArgument(format!(
                "repository must be given as 'owner/name', got '{s}'"
            ))),
        }
    }
}

/// Open/closed state of a GitHub issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// A GitHub account as it appears on issues and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub login: String,
    pub html_url: String,
}

/// A GitHub issue, immutable once fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceIssue {
    pub number: u64,
    pub title: String,
    /// Markdown body; empty when GitHub reports none.
    pub body: String,
    pub state: IssueState,
    pub labels: BTreeSet<String>,
    pub author: UserRef,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SourceIssue {
    /// Whether the issue carries any of the given label names.
    pub fn is_labeled_as(&self, names: &[&str]) -> bool {
        names.iter().any(|name| self.labels.contains(*name))
    }
}

/// A comment on a GitHub issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceComment {
    pub id: u64,
    pub body: String,
    pub author: UserRef,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
}

/// A GitHub issue paired with the repository it was fetched from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedIssue {
    pub repository: RepositoryRef,
    pub issue: SourceIssue,
}

impl TrackedIssue {
    pub const fn new(repository: RepositoryRef, issue: SourceIssue) -> Self {
        Self { repository, issue }
    }

    /// Short `owner/name#number` reference.
    pub fn reference(&self) -> String {
        format!("{}#{}", self.repository, self.issue.number)
    }

    pub fn html_url(&self) -> &str {
        &self.issue.html_url
    }

    pub fn correlation_key(&self) -> CorrelationKey {
        CorrelationKey::for_issue(self)
    }

    /// Check the preconditions for reconciling this issue.
    pub fn validate(&self) -> SyncResult<()> {
        if !self.repository.is_linked() {
            return Err(SyncError::MissingContext(format!(
                "Issue \"{}\" did not have an associated repository",
                self.issue.title
            )));
        }
        if self.issue.number == 0 {
            return Err(SyncError::InvalidArgument(format!(
                "Issue \"{}\" has no issue number",
                self.issue.title
            )));
        }
        Ok(())
    }
}
