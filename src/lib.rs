//! # Emeritus MCP - partner API bridge
//!
//! Exposes a fixed catalog of partner operations (user, tag, order and leads
//! management) through two caller-facing surfaces:
//! - a tool-invocation surface (JSON-RPC 2.0 over stdio, MCP flavoured)
//! - a request/response surface (length-prefixed msgpack over TCP)
//!
//! ## Architecture
//!
//! ```text
//!   stdio JSON-RPC ─┐                        ┌──────────────────────┐
//!                   ├─→ ToolDispatcher ─→    │ PartnerOperations    │ ─→ partner API
//!   TCP msgpack   ──┘   (catalog, table)     │ (user/tag/order/leads)│
//!                                            └──────────┬───────────┘
//!                                                       │ headers
//!                                             CredentialManager (cached token)
//! ```
//!
//! Everything hangs off one [`AppContext`](context::AppContext), built at
//! startup and shared by `Arc`.

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod auth;
pub mod context;
pub mod envelope;
pub mod ipc;
pub mod mcp;
pub mod operations;
pub mod partner;
pub mod tools;
pub mod types;

// Internal utilities
pub mod observability;
pub mod validation;

pub use context::AppContext;
pub use types::{Config, Error, ErrorKind, IpcConfig, PartnerConfig, Result};
