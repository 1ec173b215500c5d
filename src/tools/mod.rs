//! Tool infrastructure: catalog, argument validation and dispatch.
//!
//! The catalog owns tool metadata and input schemas. The dispatcher resolves
//! a tool name to its [`Operation`](crate::operations::Operation) and hands
//! validated arguments to the handler bound for that operation's category.

pub mod builtin;
pub mod catalog;
pub mod dispatch;

pub use builtin::builtin_catalog;
pub use catalog::{ParamDef, ParamType, ToolCatalog, ToolDescriptor, ToolEntry};
pub use dispatch::ToolDispatcher;
