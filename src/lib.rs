//! An offline-capable personal budget tracker.
//!
//! - `gateway`: reads and writes transactions through a remote service, falling back to a
//!   durable local store whenever the service is unavailable.
//! - `assets`: an asset cache that precaches the application shell and serves it cache-first,
//!   with an offline page when the network is gone.
//! - `notify`: decides whether a post-write notification is shown.

pub mod api;
pub mod args;
pub mod assets;
pub mod commands;
mod config;
pub mod error;
pub mod gateway;
pub mod model;
pub mod notify;
pub mod store;
mod utils;

#[cfg(test)]
mod test;

pub use api::Mode;
pub use config::{Config, DEFAULT_ORIGIN};
pub use error::{Error, ErrorType, Result};
pub use gateway::SyncGateway;
