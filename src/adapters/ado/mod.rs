//! Azure DevOps adapter: the target side of reconciliation.

pub mod client;
pub mod models;

pub use client::AdoClient;
