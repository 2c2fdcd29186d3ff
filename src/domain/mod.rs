//! Domain layer for gh-sync
//!
//! Models for both sides of the sync, the error taxonomy, and the port traits
//! that transport adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{ReconcileFailure, SyncError, SyncResult};
