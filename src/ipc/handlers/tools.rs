//! Category service handler: invokes one tool of that category.

use serde_json::Value;

use crate::context::AppContext;
use crate::operations::ToolCategory;
use crate::types::{Error, Result};

pub async fn handle(
    ctx: &AppContext,
    category: ToolCategory,
    method: &str,
    body: Value,
) -> Result<Value> {
    let operation = ctx
        .dispatcher()
        .resolve(method)
        .ok_or_else(|| Error::unknown_tool(method))?;
    if operation.category() != category {
        return Err(Error::not_found(format!(
            "{} is not a {} method",
            method, category
        )));
    }
    ctx.dispatcher().call_tool(method, body).await
}
