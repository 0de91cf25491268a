//! Helpers for building `CallToolResult` responses
//!
//! Two kinds of failure exist for an MCP tool. Protocol errors (bad
//! arguments, unknown tool) travel as `McpError`. Failures of the operation
//! itself are returned as a normal result flagged `is_error`, so the client
//! model can read the message and react. [`tool_error`] builds the latter.

use rmcp::{
    model::{CallToolResult, Content},
    ErrorData as McpError,
};
use serde::Serialize;

use crate::error::internal_error;

/// Body of a tool-level error: `{"error": "...", "type": "..."}`
#[derive(Debug, Serialize)]
pub struct ToolErrorBody<'a> {
    pub error: &'a str,
    #[serde(rename = "type")]
    pub kind: &'a str,
}

/// Pretty-printed JSON success response
pub fn json_success<T: Serialize>(data: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| internal_error(e.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Plain text success response
pub fn text_success(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

/// Tool-level error carrying a JSON body with the message and error kind
pub fn tool_error(kind: &str, message: &str) -> CallToolResult {
    let body = ToolErrorBody {
        error: message,
        kind,
    };
    // Serializing two string fields cannot fail
    let json = serde_json::to_string_pretty(&body).unwrap_or_else(|_| message.to_string());
    CallToolResult::error(vec![Content::text(json)])
}

/// First text block of a result, if any
pub fn first_text(result: &CallToolResult) -> Option<&str> {
    result
        .content
        .iter()
        .find_map(|c| c.raw.as_text().map(|t| t.text.as_str()))
}
