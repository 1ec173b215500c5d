//! Per-service IPC handlers.

pub mod system;
pub mod tools;
