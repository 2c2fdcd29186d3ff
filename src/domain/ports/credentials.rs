//! Port for API token resolution.

use std::fmt;

use crate::domain::errors::SyncResult;

/// The tokens gh-sync needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    GitHub,
    AzureDevOps,
}

impl TokenKind {
    /// Key under which the token is persisted.
    pub const fn key(self) -> &'static str {
        match self {
            Self::GitHub => "gh-token",
            Self::AzureDevOps => "ado-token",
        }
    }

    /// Environment variable consulted before any stored value.
    pub const fn env_var(self) -> &'static str {
        match self {
            Self::GitHub => "GITHUB_TOKEN",
            Self::AzureDevOps => "ADO_TOKEN",
        }
    }

    pub const fn prompt(self) -> &'static str {
        match self {
            Self::GitHub => "Please provide a PAT for use with GitHub",
            Self::AzureDevOps => "Please provide a PAT for use with Azure DevOps",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Resolves API tokens and forgets them when they stop working.
pub trait CredentialBroker: Send + Sync {
    fn get_token(&self, kind: TokenKind) -> SyncResult<String>;

    /// Drop any stored value so the next `get_token` asks again.
    fn invalidate(&self, kind: TokenKind) -> SyncResult<()>;
}
