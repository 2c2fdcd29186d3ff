//! Authenticated connections to GitHub and Azure DevOps for one run.
//!
//! A session is built once per command and handed to the engine, so there is
//! no process-wide client cache.

use std::sync::Arc;

use crate::adapters::ado::AdoClient;
use crate::adapters::github::GitHubClient;
use crate::domain::errors::{SyncError, SyncResult};
use crate::domain::models::Config;
use crate::domain::ports::{CredentialBroker, TokenKind};
use crate::services::{EngineSettings, ReconciliationEngine};

/// Verified GitHub and Azure DevOps clients.
#[derive(Debug, Clone)]
pub struct SyncSession {
    pub github: Arc<GitHubClient>,
    pub ado: Arc<AdoClient>,
    pub github_login: String,
}

impl SyncSession {
    /// Resolve tokens, build both clients, and verify each token.
    ///
    /// A rejected token is invalidated through the broker so the next run
    /// asks for a fresh one.
    pub async fn connect(config: &Config, broker: &dyn CredentialBroker) -> SyncResult<Self> {
        let github = Self::connect_github(config, broker)?;
        let github_login = github.verify_token().await;
        let github_login = Self::invalidate_on_auth_failure(github_login, broker, TokenKind::GitHub)?;

        let ado = Self::connect_ado(config, broker)?;
        let verified = ado.verify().await;
        Self::invalidate_on_auth_failure(verified, broker, TokenKind::AzureDevOps)?;

        Ok(Self {
            github: Arc::new(github),
            ado: Arc::new(ado),
            github_login,
        })
    }

    fn connect_github(config: &Config, broker: &dyn CredentialBroker) -> SyncResult<GitHubClient> {
        let token = broker.get_token(TokenKind::GitHub)?;
        GitHubClient::new(token, &config.github)
    }

    fn connect_ado(config: &Config, broker: &dyn CredentialBroker) -> SyncResult<AdoClient> {
        let token = broker.get_token(TokenKind::AzureDevOps)?;
        AdoClient::new(token, &config.ado)
    }

    /// Azure DevOps only, for the lookup and inspection commands.
    pub async fn connect_ado_only(
        config: &Config,
        broker: &dyn CredentialBroker,
    ) -> SyncResult<Arc<AdoClient>> {
        let ado = Self::connect_ado(config, broker)?;
        let verified = ado.verify().await;
        Self::invalidate_on_auth_failure(verified, broker, TokenKind::AzureDevOps)?;
        Ok(Arc::new(ado))
    }

    fn invalidate_on_auth_failure<T>(
        result: SyncResult<T>,
        broker: &dyn CredentialBroker,
        kind: TokenKind,
    ) -> SyncResult<T> {
        if let Err(SyncError::Authentication { .. }) = &result {
            if let Err(err) = broker.invalidate(kind) {
                tracing::warn!(%kind, error = %err, "Could not invalidate rejected token");
            }
        }
        result
    }

    /// Engine wired to this session's clients.
    pub fn engine(&self, config: &Config) -> ReconciliationEngine {
        ReconciliationEngine::new(
            self.github.clone(),
            self.ado.clone(),
            EngineSettings::from(config),
        )
    }
}
