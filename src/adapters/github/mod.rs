//! GitHub issues adapter: the source side of reconciliation.

pub mod client;
pub mod models;

pub use client::GitHubClient;
