//! Credentials management infrastructure
//!
//! Token resolution for the GitHub and Azure DevOps clients:
//! - Environment variable handling
//! - Owner-only JSON credential file
//! - Interactive prompt when running on a terminal

pub mod store;

pub use store::{is_interactive_terminal, FileCredentialStore, LocalCredentialBroker};
