//! Infrastructure layer module
//!
//! Wiring that sits outside the domain:
//! - Configuration management
//! - Logging infrastructure
//! - Credentials management
//! - Authenticated sessions against GitHub and Azure DevOps

pub mod config;
pub mod credentials;
pub mod logging;
pub mod session;

pub use session::SyncSession;
