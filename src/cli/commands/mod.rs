//! CLI command implementations.

pub mod ado;
pub mod pull;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::adapters::ado::AdoClient;
use crate::cli::display::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::credentials::{FileCredentialStore, LocalCredentialBroker};
use crate::infrastructure::SyncSession;

/// Loaded configuration and output mode shared by every command.
pub struct CommandContext {
    pub config: Config,
    pub json: bool,
}

impl CommandContext {
    pub const fn new(config: Config, json: bool) -> Self {
        Self { config, json }
    }

    fn broker() -> Result<LocalCredentialBroker> {
        let store = FileCredentialStore::default_location()
            .context("Failed to locate the credential file")?;
        Ok(LocalCredentialBroker::new(store))
    }

    /// Authenticated GitHub and Azure DevOps clients.
    pub async fn connect(&self) -> Result<SyncSession> {
        let broker = Self::broker()?;
        SyncSession::connect(&self.config, &broker)
            .await
            .context("Failed to connect to GitHub and Azure DevOps")
    }

    pub async fn connect_ado(&self) -> Result<Arc<AdoClient>> {
        let broker = Self::broker()?;
        SyncSession::connect_ado_only(&self.config, &broker)
            .await
            .context("Failed to connect to Azure DevOps")
    }

    pub fn emit<T: CommandOutput>(&self, result: &T) {
        output(result, self.json);
    }
}
