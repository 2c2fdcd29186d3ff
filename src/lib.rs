//! gh-sync - mirror GitHub issues into Azure DevOps work items
//!
//! gh-sync reconciles a GitHub issue (its title, body, state, and comments)
//! into a single Azure DevOps work item. The sync is one-way and
//! idempotent: running it again updates the same work item and only adds
//! comments that were not mirrored before.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Issue and work item models, errors, and port traits
//! - **Service Layer** (`services`): The reconciliation engine and its pure helpers
//! - **Adapters** (`adapters`): GitHub and Azure DevOps REST clients, plus in-memory trackers
//! - **Infrastructure Layer** (`infrastructure`): Configuration, logging, credentials, sessions
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use gh_sync::infrastructure::{config::ConfigLoader, SyncSession};
//! use gh_sync::services::ReconcileOptions;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load(None)?;
//!     let session = SyncSession::connect(&config, &broker).await?;
//!     let tracked = session.github.get_issue(&"acme/widgets".parse()?, 42).await?;
//!     let outcome = session.engine(&config).reconcile(&tracked, ReconcileOptions::default()).await?;
//!     println!("{:?}", outcome.action);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    AdoConfig, Config, CorrelationKey, GitHubConfig, LoggingConfig, LookupFailurePolicy,
    RepositoryRef, TrackedIssue, WorkItem, WorkItemState,
};
pub use domain::ports::{CredentialBroker, SourceTracker, TargetTracker, TokenKind};
pub use domain::{ReconcileFailure, SyncError, SyncResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::SyncSession;
pub use services::{BatchReport, ReconcileOptions, ReconcileOutcome, ReconciliationEngine};
