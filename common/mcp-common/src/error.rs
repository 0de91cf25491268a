//! Protocol error constructors
//!
//! Thin wrappers over `rmcp::ErrorData` so handlers don't repeat the
//! `None` data argument everywhere.

use rmcp::ErrorData as McpError;

/// Result alias for tool implementations
pub type McpResult<T> = Result<T, McpError>;

/// Internal server error, for responses the crate itself fails to build
pub(crate) fn internal_error(message: impl Into<String>) -> McpError {
    McpError::internal_error(message.into(), None)
}

/// The caller sent arguments the tool cannot accept
pub fn invalid_params(message: impl Into<String>) -> McpError {
    McpError::invalid_params(message.into(), None)
}
