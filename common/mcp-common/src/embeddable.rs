//! In-process tool execution
//!
//! [`EmbeddableMcp`] lets a host call a server's tools directly, without a
//! transport in between. The ADB server uses it for its demo mode and its
//! integration tests.
//!
//! ```rust,ignore
//! use mcp_common::EmbeddableMcp;
//!
//! let result = server.call_tool("list_devices", serde_json::json!({})).await?;
//! ```

use async_trait::async_trait;
use rmcp::model::{CallToolResult, Tool};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Errors raised when calling a tool in-process
#[derive(Debug, thiserror::Error)]
pub enum EmbeddableError {
    /// No enabled tool has this name
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// Arguments did not match the tool's parameter schema
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// The tool returned a protocol error
    #[error("mcp error: {0}")]
    McpError(String),
}

impl From<rmcp::ErrorData> for EmbeddableError {
    fn from(err: rmcp::ErrorData) -> Self {
        if err.code == rmcp::model::ErrorCode::INVALID_PARAMS {
            EmbeddableError::InvalidParams(err.message.to_string())
        } else {
            EmbeddableError::McpError(err.message.to_string())
        }
    }
}

pub type EmbeddableResult<T> = Result<T, EmbeddableError>;

/// Deserialize tool arguments, reporting mismatches as `InvalidParams`
///
/// A JSON `null` is treated as an empty object so parameterless calls can
/// pass `Value::Null`.
pub fn parse_params<T: DeserializeOwned>(params: Value) -> EmbeddableResult<T> {
    let params = if params.is_null() {
        Value::Object(Default::default())
    } else {
        params
    };
    serde_json::from_value(params).map_err(|e| EmbeddableError::InvalidParams(e.to_string()))
}

/// A server whose tools can be listed and called in-process
///
/// Implementations must be `Send + Sync`; calls may arrive concurrently.
#[async_trait]
pub trait EmbeddableMcp: Send + Sync {
    /// Name used in MCP client configuration
    fn server_name(&self) -> &str;

    /// Tools currently exposed by the server
    fn list_tools(&self) -> Vec<Tool>;

    /// Call a tool by name with JSON arguments
    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult>;

    fn server_description(&self) -> Option<&str> {
        None
    }

    fn server_version(&self) -> Option<&str> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct EchoParams {
        #[serde(default)]
        text: Option<String>,
    }

    struct EchoServer;

    #[async_trait]
    impl EmbeddableMcp for EchoServer {
        fn server_name(&self) -> &str {
            "echo"
        }

        fn list_tools(&self) -> Vec<Tool> {
            vec![]
        }

        async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult> {
            match name {
                "echo" => {
                    let params: EchoParams = parse_params(params)?;
                    Ok(crate::text_success(params.text.unwrap_or_default()))
                }
                _ => Err(EmbeddableError::ToolNotFound(name.to_string())),
            }
        }
    }

    #[test]
    fn test_unknown_tool() {
        let result = tokio_test::block_on(EchoServer.call_tool("nope", Value::Null));
        assert!(matches!(result, Err(EmbeddableError::ToolNotFound(name)) if name == "nope"));
    }

    #[test]
    fn test_null_params_are_empty_object() {
        let result = tokio_test::block_on(EchoServer.call_tool("echo", Value::Null)).unwrap();
        assert_eq!(crate::first_text(&result), Some(""));
    }

    #[test]
    fn test_bad_params() {
        let result =
            tokio_test::block_on(EchoServer.call_tool("echo", serde_json::json!({"text": 5})));
        assert!(matches!(result, Err(EmbeddableError::InvalidParams(_))));
    }

    #[test]
    fn test_mcp_error_conversion() {
        let err: EmbeddableError = crate::invalid_params("lines must be positive").into();
        assert!(matches!(err, EmbeddableError::InvalidParams(_)));

        let err: EmbeddableError = crate::error::internal_error("boom").into();
        assert!(matches!(err, EmbeddableError::McpError(_)));
    }
}
