//! MCP Common - shared plumbing for MCP servers
//!
//! - **Initialization**: [`init_tracing`] logs to stderr, text or JSON;
//!   [`serve_stdio`] runs a server on the stdio transport
//! - **Results**: [`json_success`], [`text_success`], [`tool_error`]
//! - **Errors**: [`invalid_params`]
//! - **Embeddable**: [`EmbeddableMcp`] for in-process tool calls

pub mod embeddable;
pub mod error;
pub mod init;
pub mod result;

pub use embeddable::{parse_params, EmbeddableError, EmbeddableMcp, EmbeddableResult};
pub use error::{invalid_params, McpResult};
pub use init::{init_tracing, serve_stdio, LogFormat};
pub use result::{first_text, json_success, text_success, tool_error};

pub use rmcp::{
    model::{CallToolResult, Content, Tool},
    ErrorData as McpError,
};

pub use async_trait::async_trait;
