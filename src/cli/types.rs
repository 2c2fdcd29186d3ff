//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::models::RepositoryRef;
use crate::services::ReconcileOptions;

#[derive(Parser, Debug)]
#[command(name = "gh-sync")]
#[command(about = "Mirror GitHub issues into Azure DevOps work items", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Additional YAML config file, layered over .gh-sync/config.yaml
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pull one GitHub issue into Azure DevOps
    PullGh(PullArgs),

    /// Pull every tracked issue in a repository into Azure DevOps
    PullAllGh(PullAllArgs),

    /// Show an Azure DevOps work item
    GetAdo(GetAdoArgs),

    /// Find the work item that mirrors a GitHub issue, without changing anything
    FindAdo(FindAdoArgs),
}

/// Switches shared by the pull commands.
#[derive(Args, Debug, Clone, Copy)]
pub struct PullFlags {
    /// Report what would happen without writing to Azure DevOps
    #[arg(long)]
    pub dry_run: bool,

    /// Create a new work item even if one already exists for the issue
    #[arg(long)]
    pub allow_existing: bool,
}

impl From<PullFlags> for ReconcileOptions {
    fn from(flags: PullFlags) -> Self {
        Self {
            dry_run: flags.dry_run,
            allow_existing: flags.allow_existing,
        }
    }
}

#[derive(Args, Debug)]
pub struct PullArgs {
    /// Repository as owner/name
    pub repo: RepositoryRef,

    /// Issue number
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub issue: u64,

    #[command(flatten)]
    pub flags: PullFlags,
}

#[derive(Args, Debug)]
pub struct PullAllArgs {
    /// Repository as owner/name
    pub repo: RepositoryRef,

    #[command(flatten)]
    pub flags: PullFlags,
}

#[derive(Args, Debug)]
pub struct GetAdoArgs {
    /// Work item id
    pub id: u64,
}

#[derive(Args, Debug)]
pub struct FindAdoArgs {
    /// Repository as owner/name
    pub repo: RepositoryRef,

    /// Issue number
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub issue: u64,
}
