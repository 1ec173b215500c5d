//! Tool-invocation surface: newline-delimited JSON-RPC 2.0 over stdio.
//!
//! stdout carries protocol messages only; logs go to stderr.

pub mod protocol;
pub mod stdio;

pub use protocol::{handle_message, JsonRpcError, JsonRpcResponse, PROTOCOL_VERSION};
pub use stdio::{serve, serve_stdio};
