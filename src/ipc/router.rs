//! Top-level IPC router: routes by service, delegates to handlers.

use serde_json::Value;

use crate::context::AppContext;
use crate::ipc::handlers;
use crate::operations::ToolCategory;
use crate::types::{Error, Result};

/// Service name of the bridge's own introspection methods.
pub const SYSTEM_SERVICE: &str = "system";

/// Route an IPC request to the appropriate service handler.
pub async fn route_request(
    ctx: &AppContext,
    service: &str,
    method: &str,
    body: Value,
) -> Result<Value> {
    if service == SYSTEM_SERVICE {
        return handlers::system::handle(ctx, method).await;
    }
    match ToolCategory::from_name(service) {
        Some(category) => handlers::tools::handle(ctx, category, method, body).await,
        None => Err(Error::not_found(format!("Unknown service: {}", service))),
    }
}
