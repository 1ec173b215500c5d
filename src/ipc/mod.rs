//! TCP+msgpack request/response surface.
//!
//! Length-prefixed msgpack frames. Each request names a `service` (a tool
//! category, or `system`) and a `method`; each yields exactly one response
//! frame carrying the envelope and the request id.

pub mod codec;
pub mod handlers;
pub mod router;
pub mod server;

pub use router::route_request;
pub use server::{IpcRequest, IpcServer};
