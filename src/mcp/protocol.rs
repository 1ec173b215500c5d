//! JSON-RPC message handling.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

use crate::context::AppContext;
use crate::envelope::{ErrorDetail, ToolCallResult};
use crate::types::{Error, ErrorKind};

/// Protocol revision reported by `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;

/// Incoming JSON-RPC message. A missing `id` marks a notification; an
/// explicit `"id": null` is a request and is answered with a null id.
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[serde(default)]
    jsonrpc: Option<String>,
    #[serde(default, deserialize_with = "present")]
    id: Option<Value>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: Option<Value>,
}

/// Maps any present value, `null` included, to `Some`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// JSON-RPC response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub(crate) fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

/// Tool call parameters.
#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Handle one raw message line. Returns `None` when no reply is due.
pub async fn handle_message(ctx: &AppContext, line: &str) -> Option<JsonRpcResponse> {
    let raw: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "Unparseable JSON-RPC message");
            return Some(JsonRpcResponse::error(Value::Null, PARSE_ERROR, "parse error"));
        }
    };
    let request: JsonRpcRequest = match serde_json::from_value(raw) {
        Ok(request) => request,
        Err(_) => {
            return Some(JsonRpcResponse::error(
                Value::Null,
                INVALID_REQUEST,
                "invalid request",
            ))
        }
    };

    let Some(id) = request.id else {
        if let Some(method) = &request.method {
            tracing::debug!(method = %method, "Notification received");
        }
        return None;
    };
    if request.jsonrpc.as_deref() != Some("2.0") {
        return Some(JsonRpcResponse::error(
            id,
            INVALID_REQUEST,
            "invalid json-rpc version",
        ));
    }
    let Some(method) = request.method else {
        return Some(JsonRpcResponse::error(id, INVALID_REQUEST, "missing method"));
    };

    let response = match method.as_str() {
        "initialize" => JsonRpcResponse::result(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {"tools": {}},
                "serverInfo": {
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION"),
                },
            }),
        ),
        "ping" => JsonRpcResponse::result(id, json!({})),
        "tools/list" => {
            let tools = ctx.dispatcher().list_tools();
            JsonRpcResponse::result(id, json!({ "tools": tools }))
        }
        "tools/call" => call_tool(ctx, id, request.params).await,
        other => {
            tracing::debug!(method = %other, "Unknown JSON-RPC method");
            JsonRpcResponse::error(id, METHOD_NOT_FOUND, "method not found")
        }
    };
    Some(response)
}

async fn call_tool(ctx: &AppContext, id: Value, params: Option<Value>) -> JsonRpcResponse {
    let call = match serde_json::from_value::<ToolCallParams>(params.unwrap_or(Value::Null)) {
        Ok(call) => call,
        Err(_) => return JsonRpcResponse::error(id, INVALID_PARAMS, "invalid tool params"),
    };

    match ctx.dispatcher().call_tool(&call.name, call.arguments).await {
        Ok(data) => match serde_json::to_value(ToolCallResult::text(&data)) {
            Ok(result) => JsonRpcResponse::result(id, result),
            Err(e) => tool_error(id, &Error::from(e)),
        },
        Err(err) => tool_error(id, &err),
    }
}

fn tool_error(id: Value, err: &Error) -> JsonRpcResponse {
    let message = match err.kind() {
        ErrorKind::UnknownTool | ErrorKind::Validation => err.to_string(),
        _ => format!("Tool execution failed: {}", err),
    };
    let mut response = JsonRpcResponse::error(id, err.jsonrpc_code(), message);
    if let Some(error) = response.error.as_mut() {
        error.data = serde_json::to_value(ErrorDetail::from(err)).ok();
    }
    response
}
