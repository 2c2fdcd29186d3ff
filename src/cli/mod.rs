pub mod commands;
pub mod display;
pub mod types;

pub use types::{Cli, Commands};

use anyhow::{Context, Result};

use crate::domain::errors::SyncError;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::logging::LoggerImpl;
use commands::CommandContext;

/// Load configuration, start logging, and dispatch the parsed command.
pub async fn run(cli: Cli) -> Result<()> {
    let config = ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let _logger = LoggerImpl::init(&config.logging, cli.verbose)?;
    tracing::debug!(command = ?cli.command, "Starting gh-sync");

    let ctx = CommandContext::new(config, cli.json);
    match cli.command {
        Commands::PullGh(args) => commands::pull::execute_pull(args, &ctx).await,
        Commands::PullAllGh(args) => commands::pull::execute_pull_all(args, &ctx).await,
        Commands::GetAdo(args) => commands::ado::execute_get(args, &ctx).await,
        Commands::FindAdo(args) => commands::ado::execute_find(args, &ctx).await,
    }
}

/// Short category for the root cause, used in JSON error output.
fn error_kind(err: &anyhow::Error) -> &'static str {
    match err.chain().find_map(|cause| cause.downcast_ref::<SyncError>()) {
        Some(SyncError::InvalidArgument(_)) => "invalid_argument",
        Some(SyncError::MissingContext(_)) => "missing_context",
        Some(SyncError::AmbiguousState { .. }) => "ambiguous_state",
        Some(SyncError::Authentication { .. }) => "authentication",
        Some(SyncError::Credentials(_)) => "credentials",
        Some(SyncError::Transport(_)) => "transport",
        Some(SyncError::SerializationError(_)) => "serialization",
        Some(SyncError::Configuration(_)) => "configuration",
        None => "error",
    }
}

/// Print the error chain and exit with status 1.
pub fn handle_error(err: &anyhow::Error, json: bool) -> ! {
    if json {
        let causes: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
        let body = serde_json::json!({
            "error": err.to_string(),
            "kind": error_kind(err),
            "causes": causes,
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("{} {err}", console::style("Error:").red().bold());
        for cause in err.chain().skip(1) {
            eprintln!("  caused by: {cause}");
        }
    }
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_finds_sync_error_under_context() {
        let err = anyhow::Error::new(SyncError::AmbiguousState {
            title: "Crash (acme/widgets#1)".to_string(),
            count: 2,
        })
        .context("Failed to look up work item");
        assert_eq!(error_kind(&err), "ambiguous_state");
    }

    #[test]
    fn test_error_kind_for_plain_errors() {
        assert_eq!(error_kind(&anyhow::anyhow!("boom")), "error");
    }
}
