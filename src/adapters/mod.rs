//! Adapters for the external trackers.

pub mod ado;
pub mod github;
pub(crate) mod http;
pub mod mock;
