use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Main configuration structure for gh-sync
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Azure DevOps target settings
    #[serde(default)]
    pub ado: AdoConfig,

    /// GitHub source settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Reconciliation policy settings
    #[serde(default)]
    pub sync: SyncConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Azure DevOps configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AdoConfig {
    /// Organization or collection URI, e.g. `https://dev.azure.com/contoso`
    #[serde(default)]
    pub collection_uri: String,

    /// Project that work items are created in
    #[serde(default)]
    pub project: String,

    /// Area path assigned to every synchronized work item
    #[serde(default)]
    pub area_path: String,
}

/// GitHub configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GitHubConfig {
    /// REST API base URL
    #[serde(default = "default_github_api_base_url")]
    pub api_base_url: String,

    /// Only issues carrying this label are pulled by `pull-all-gh`
    #[serde(default = "default_tracking_label")]
    pub tracking_label: String,

    /// Client-side request budget per hour
    #[serde(default = "default_requests_per_hour")]
    pub requests_per_hour: u32,
}

fn default_github_api_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_tracking_label() -> String {
    "tracking".to_string()
}

const fn default_requests_per_hour() -> u32 {
    5_000
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_github_api_base_url(),
            tracking_label: default_tracking_label(),
            requests_per_hour: default_requests_per_hour(),
        }
    }
}

/// What to do when the existing-work-item query fails in transit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupFailurePolicy {
    /// Log the failure and continue as if no work item exists. A transient
    /// failure may therefore produce a duplicate work item.
    #[default]
    TreatAsNotFound,
    /// Abort reconciliation of the issue.
    Fail,
}

/// Reconciliation policy configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SyncConfig {
    #[serde(default)]
    pub lookup_failure_policy: LookupFailurePolicy,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for daily-rolling JSON log files (stderr only when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}
