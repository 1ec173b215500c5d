//! Response envelopes for both caller-facing surfaces.
//!
//! Every invocation produces exactly one envelope. Failures keep their
//! [`ErrorKind`] (and partner code, when there is one) next to the message.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Error, ErrorKind, Result};

/// Message carried by every successful envelope.
pub const SUCCESS_MESSAGE: &str = "Success";

/// Machine-readable failure detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
}

impl From<&Error> for ErrorDetail {
    fn from(err: &Error) -> Self {
        Self {
            kind: err.kind(),
            code: err.remote_code(),
        }
    }
}

/// `{success, message, data, error?}` envelope of the request/response surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    pub message: String,
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

impl Envelope {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(err: &Error) -> Self {
        Self {
            success: false,
            message: err.to_string(),
            data: None,
            error: Some(ErrorDetail::from(err)),
        }
    }

    pub fn from_result(result: Result<Value>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::failure(&err),
        }
    }

    /// Serialize with an `id` field added alongside the envelope fields.
    pub fn to_value_with_id(&self, id: &str) -> Value {
        let mut value = serde_json::to_value(self).unwrap_or_else(|_| {
            serde_json::json!({"success": self.success, "message": self.message})
        });
        if let Value::Object(map) = &mut value {
            map.insert("id".to_string(), Value::String(id.to_string()));
        }
        value
    }
}

/// One content block of a tool-call result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

/// `{content: [...]}` result of the tool-invocation surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub content: Vec<ToolContent>,
}

impl ToolCallResult {
    /// Render a handler payload as a single pretty-printed text block.
    pub fn text(data: &Value) -> Self {
        let text = serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());
        Self {
            content: vec![ToolContent {
                content_type: "text".to_string(),
                text,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_success_shape() {
        let value = serde_json::to_value(Envelope::ok(json!({"user_id": "u1"}))).unwrap();
        assert_eq!(
            value,
            json!({"success": true, "message": "Success", "data": {"user_id": "u1"}})
        );
    }

    #[test]
    fn test_remote_failure_keeps_kind_and_code() {
        let envelope = Envelope::from_result(Err(Error::remote_api(400, "bad corp id")));
        assert!(!envelope.success);
        assert!(envelope.message.contains("bad corp id"));
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["data"], Value::Null);
        assert_eq!(value["error"], json!({"kind": "REMOTE_API_ERROR", "code": 400}));
    }

    #[test]
    fn test_unknown_tool_failure_has_no_code() {
        let value = serde_json::to_value(Envelope::failure(&Error::unknown_tool("nope"))).unwrap();
        assert_eq!(value["error"], json!({"kind": "UNKNOWN_TOOL"}));
    }

    #[test]
    fn test_id_is_attached() {
        let value = Envelope::ok(json!({})).to_value_with_id("req-1");
        assert_eq!(value["id"], "req-1");
        assert_eq!(value["success"], true);
    }

    #[test]
    fn test_tool_call_result_is_pretty_text() {
        let result = ToolCallResult::text(&json!({"a": 1}));
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value, json!({"content": [{"type": "text", "text": "{\n  \"a\": 1\n}"}]}));
    }
}
