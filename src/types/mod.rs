//! Core types for the bridge.
//!
//! - **IDs**: Strongly-typed identifiers (InvocationId)
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Partner, server, observability and IPC configuration

mod config;
mod errors;
mod ids;

pub use config::{
    Config, IpcConfig, ObservabilityConfig, PartnerConfig, ServerConfig, DEFAULT_AUTH_PATH,
};
pub use errors::{Error, ErrorKind, Result};
pub use ids::InvocationId;
