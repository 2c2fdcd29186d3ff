//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces the reconciliation engine consumes:
//! - SourceTracker: reads issues and comments from GitHub
//! - TargetTracker: queries and mutates Azure DevOps work items
//! - CredentialBroker: resolves and invalidates API tokens
//!
//! The engine only ever talks to these traits, so tests can swap in the
//! in-memory trackers from `adapters::mock`.

pub mod credentials;
pub mod source_tracker;
pub mod target_tracker;

pub use credentials::{CredentialBroker, TokenKind};
pub use source_tracker::SourceTracker;
pub use target_tracker::TargetTracker;
