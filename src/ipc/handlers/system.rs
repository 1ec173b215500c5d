//! System service handler: health, build info, tool listing.

use serde_json::{json, Value};

use crate::context::AppContext;
use crate::operations::ToolCategory;
use crate::types::{Error, Result};

pub async fn handle(ctx: &AppContext, method: &str) -> Result<Value> {
    match method {
        "Health" => Ok(json!({
            "status": "ok",
            "tools": ctx.dispatcher().catalog().len(),
            "token_fetches": ctx.credentials().fetch_count(),
        })),

        "Info" => Ok(json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "partner_host": ctx.config().partner.api_host,
            "categories": ToolCategory::ALL.iter().map(|c| c.as_str()).collect::<Vec<_>>(),
            "inbound_auth": ctx.guard().is_enabled(),
        })),

        "ListTools" => {
            let tools = ctx.dispatcher().list_tools();
            let count = tools.len();
            Ok(json!({
                "tools": serde_json::to_value(tools)?,
                "count": count,
            }))
        }

        _ => Err(Error::not_found(format!("Unknown system method: {}", method))),
    }
}
