//! MCP Server implementation for Android Debug Bridge operations

use std::sync::Arc;

use mcp_common::{
    async_trait, parse_params, CallToolResult, EmbeddableError, EmbeddableMcp, EmbeddableResult,
    McpError, Tool,
};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use serde_json::Value;
use tracing::info;

use crate::adb::Adb;
use crate::config::Config;
use crate::handlers;
use crate::params::*;

/// Every tool the server knows, in listing order
pub const TOOL_NAMES: &[&str] = &[
    "list_devices",
    "get_device_info",
    "shell_command",
    "install_app",
    "uninstall_app",
    "push_file",
    "pull_file",
    "get_logcat",
    "take_screenshot",
    "start_app",
    "stop_app",
];

/// The ADB MCP Server
#[derive(Clone)]
pub struct AdbMcpServer {
    adb: Adb,
    config: Arc<Config>,
    tool_router: ToolRouter<Self>,
}

// ============================================================================
// Tool Router Implementation
// ============================================================================

#[tool_router]
impl AdbMcpServer {
    /// Build the server, exposing only the tools enabled in `config`
    pub fn new(config: Config, adb: Adb) -> Self {
        let mut tool_router = Self::tool_router();
        for name in TOOL_NAMES {
            if !config.is_tool_enabled(name) {
                info!("Tool {} disabled by configuration", name);
                tool_router.remove_route(*name);
            }
        }

        Self {
            adb,
            config: Arc::new(config),
            tool_router,
        }
    }

    #[tool(description = "List all connected Android devices")]
    async fn list_devices(&self) -> Result<CallToolResult, McpError> {
        handlers::list_devices(&self.adb).await
    }

    #[tool(description = "Get detailed information about a specific device (all system properties)")]
    async fn get_device_info(
        &self,
        Parameters(params): Parameters<DeviceInfoParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::get_device_info(&self.adb, params).await
    }

    #[tool(description = "Execute a shell command on an Android device")]
    async fn shell_command(
        &self,
        Parameters(params): Parameters<ShellCommandParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::shell_command(&self.adb, params).await
    }

    #[tool(description = "Install an APK file on an Android device")]
    async fn install_app(
        &self,
        Parameters(params): Parameters<InstallAppParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::install_app(&self.adb, params).await
    }

    #[tool(description = "Uninstall an app by package name")]
    async fn uninstall_app(
        &self,
        Parameters(params): Parameters<UninstallAppParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::uninstall_app(&self.adb, params).await
    }

    #[tool(description = "Push a file from local system to Android device")]
    async fn push_file(
        &self,
        Parameters(params): Parameters<PushFileParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::push_file(&self.adb, params).await
    }

    #[tool(description = "Pull a file from Android device to local system")]
    async fn pull_file(
        &self,
        Parameters(params): Parameters<PullFileParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::pull_file(&self.adb, params).await
    }

    #[tool(
        description = "Read recent logcat output, optionally filtered by tag and minimum priority"
    )]
    async fn get_logcat(
        &self,
        Parameters(params): Parameters<LogcatParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::get_logcat(&self.adb, &self.config.limits, params).await
    }

    #[tool(
        description = "Capture the device screen as a validated PNG. Returns the image, or saves it when output_path is given."
    )]
    async fn take_screenshot(
        &self,
        Parameters(params): Parameters<ScreenshotParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::take_screenshot(&self.adb, params).await
    }

    #[tool(description = "Launch an app by package name, optionally at a specific activity")]
    async fn start_app(
        &self,
        Parameters(params): Parameters<StartAppParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::start_app(&self.adb, params).await
    }

    #[tool(description = "Force-stop a running app by package name")]
    async fn stop_app(
        &self,
        Parameters(params): Parameters<StopAppParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::stop_app(&self.adb, params).await
    }
}

#[tool_handler]
impl rmcp::ServerHandler for AdbMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "ADB MCP server for Android device management. \
                 Lists devices, installs and uninstalls apps, pushes and pulls files, \
                 runs shell commands, reads logcat and captures the screen. \
                 device_id is optional everywhere; the first ready device is used when omitted."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// ============================================================================
// EmbeddableMcp Implementation
// ============================================================================

#[async_trait]
impl EmbeddableMcp for AdbMcpServer {
    fn server_name(&self) -> &str {
        "mcp-adb"
    }

    fn server_description(&self) -> Option<&str> {
        Some("Android Debug Bridge MCP server - device management, apps, files, shell, logcat and screenshots")
    }

    fn server_version(&self) -> Option<&str> {
        Some(env!("CARGO_PKG_VERSION"))
    }

    fn list_tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult> {
        if !self.config.is_tool_enabled(name) {
            return Err(EmbeddableError::ToolNotFound(name.to_string()));
        }

        let result = match name {
            "list_devices" => self.list_devices().await,
            "get_device_info" => self.get_device_info(Parameters(parse_params(params)?)).await,
            "shell_command" => self.shell_command(Parameters(parse_params(params)?)).await,
            "install_app" => self.install_app(Parameters(parse_params(params)?)).await,
            "uninstall_app" => self.uninstall_app(Parameters(parse_params(params)?)).await,
            "push_file" => self.push_file(Parameters(parse_params(params)?)).await,
            "pull_file" => self.pull_file(Parameters(parse_params(params)?)).await,
            "get_logcat" => self.get_logcat(Parameters(parse_params(params)?)).await,
            "take_screenshot" => self.take_screenshot(Parameters(parse_params(params)?)).await,
            "start_app" => self.start_app(Parameters(parse_params(params)?)).await,
            "stop_app" => self.stop_app(Parameters(parse_params(params)?)).await,
            _ => return Err(EmbeddableError::ToolNotFound(name.to_string())),
        };
        result.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_server(config: Config) -> AdbMcpServer {
        let adb = Adb::mock(&config);
        AdbMcpServer::new(config, adb)
    }

    #[test]
    fn test_embeddable_server_name() {
        let server = mock_server(Config::default());
        assert_eq!(server.server_name(), "mcp-adb");
    }

    #[test]
    fn test_all_tools_listed_by_default() {
        let server = mock_server(Config::default());
        let tools = server.list_tools();
        assert_eq!(tools.len(), TOOL_NAMES.len());

        let names: Vec<&str> = tools.iter().map(|t| t.name.as_ref()).collect();
        for expected in TOOL_NAMES {
            assert!(names.contains(expected), "missing tool {}", expected);
        }
    }

    #[test]
    fn test_disabled_tools_are_not_listed() {
        let mut config = Config::default();
        config.tools.enabled = vec!["list_devices".into(), "get_logcat".into()];
        let server = mock_server(config);

        let mut names: Vec<String> = server
            .list_tools()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["get_logcat", "list_devices"]);
    }

    #[tokio::test]
    async fn test_disabled_tool_cannot_be_called() {
        let mut config = Config::default();
        config.tools.enabled = vec!["list_devices".into()];
        let server = mock_server(config);

        let result = server
            .call_tool("shell_command", serde_json::json!({ "command": "ls" }))
            .await;
        assert!(matches!(result, Err(EmbeddableError::ToolNotFound(_))));
    }

    #[tokio::test]
    async fn test_embeddable_call_list_devices() {
        let server = mock_server(Config::default());
        let result = server
            .call_tool("list_devices", Value::Null)
            .await
            .unwrap();
        assert!(!result.is_error.unwrap_or(false));
    }

    #[tokio::test]
    async fn test_embeddable_missing_required_param() {
        let server = mock_server(Config::default());
        let result = server
            .call_tool("shell_command", serde_json::json!({}))
            .await;
        assert!(matches!(result, Err(EmbeddableError::InvalidParams(_))));
    }

    #[tokio::test]
    async fn test_embeddable_unknown_tool() {
        let server = mock_server(Config::default());
        let result = server
            .call_tool("nonexistent_tool", serde_json::json!({}))
            .await;
        assert!(matches!(result, Err(EmbeddableError::ToolNotFound(_))));
    }
}
