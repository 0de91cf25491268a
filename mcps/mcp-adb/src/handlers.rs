//! ADB tool handler implementations
//!
//! Handlers check their arguments, resolve the target device, call the
//! [`Adb`] client and shape the outcome into an MCP result. Arguments are
//! checked before any adb call, so bad ones become `invalid_params` protocol
//! errors even when no device is attached. adb failures become tool-level
//! errors with an `{"error", "type"}` body.

use std::path::Path;

use base64::Engine;
use mcp_common::{
    invalid_params, json_success, text_success, tool_error, CallToolResult, Content, McpResult,
};
use serde_json::{json, Value};
use tracing::warn;

use crate::adb::{
    build_logcat_args, validate_activity, validate_package_name, validate_pull_target,
    validate_remote_path, Adb, InstallOptions, LogPriority, LogcatOptions,
};
use crate::config::LimitsConfig;
use crate::error::{AdbError, AdbResult};
use crate::params::*;

pub const ADB_ERROR: &str = "ADBError";
pub const UNKNOWN_ERROR: &str = "UnknownError";

/// Map a client error onto the MCP error surface
fn adb_failure(err: AdbError) -> McpResult<CallToolResult> {
    if err.is_invalid_argument() {
        return Err(invalid_params(err.to_string()));
    }
    warn!("adb operation failed: {}", err);
    Ok(tool_error(ADB_ERROR, &err.to_string()))
}

/// Turn an argument check into an `invalid_params` rejection
fn precheck(check: AdbResult<()>) -> McpResult<()> {
    check.map_err(|e| invalid_params(e.to_string()))
}

fn respond(result: AdbResult<Value>) -> McpResult<CallToolResult> {
    match result {
        Ok(payload) => json_success(&payload),
        Err(e) => adb_failure(e),
    }
}

fn action_payload(device: &str, message: String) -> Value {
    json!({
        "success": true,
        "device_id": device,
        "message": message,
    })
}

pub async fn list_devices(adb: &Adb) -> McpResult<CallToolResult> {
    respond(
        adb.list_devices()
            .await
            .map(|devices| json!({ "count": devices.len(), "devices": devices })),
    )
}

pub async fn get_device_info(adb: &Adb, params: DeviceInfoParams) -> McpResult<CallToolResult> {
    respond(
        async {
            let device = adb.resolve_device(params.device_id.as_deref()).await?;
            let info = adb.get_device_info(&device).await?;
            Ok::<_, AdbError>(json!({ "device_id": device, "device_info": info }))
        }
        .await,
    )
}

pub async fn shell_command(adb: &Adb, params: ShellCommandParams) -> McpResult<CallToolResult> {
    if params.command.trim().is_empty() {
        return Err(invalid_params("command must not be empty"));
    }

    respond(
        async {
            let device = adb.resolve_device(params.device_id.as_deref()).await?;
            let out = adb.shell(&device, &params.command).await?;
            Ok::<_, AdbError>(json!({
                "device_id": device,
                "output": out.stdout,
                "stderr": out.stderr,
                "exit_code": out.exit_code,
                "truncated": out.truncated,
            }))
        }
        .await,
    )
}

pub async fn install_app(adb: &Adb, params: InstallAppParams) -> McpResult<CallToolResult> {
    let apk = Path::new(&params.apk_path);
    if !apk.is_file() {
        return Err(invalid_params(format!(
            "APK file not found: {}",
            params.apk_path
        )));
    }

    let options = InstallOptions {
        replace: params.replace,
        grant_permissions: params.grant_permissions,
    };
    respond(
        async {
            let device = adb.resolve_device(params.device_id.as_deref()).await?;
            let message = adb.install(&device, apk, options).await?;
            Ok::<_, AdbError>(action_payload(&device, message))
        }
        .await,
    )
}

pub async fn uninstall_app(adb: &Adb, params: UninstallAppParams) -> McpResult<CallToolResult> {
    precheck(validate_package_name(&params.package_name))?;

    respond(
        async {
            let device = adb.resolve_device(params.device_id.as_deref()).await?;
            let message = adb
                .uninstall(&device, &params.package_name, params.keep_data)
                .await?;
            Ok::<_, AdbError>(action_payload(&device, message))
        }
        .await,
    )
}

pub async fn push_file(adb: &Adb, params: PushFileParams) -> McpResult<CallToolResult> {
    precheck(validate_remote_path(&params.remote_path))?;
    let local = Path::new(&params.local_path);
    if !local.exists() {
        return Err(invalid_params(format!(
            "local file not found: {}",
            params.local_path
        )));
    }

    respond(
        async {
            let device = adb.resolve_device(params.device_id.as_deref()).await?;
            let summary = adb.push(&device, local, &params.remote_path).await?;
            let message = format!(
                "Pushed {} to {}: {}",
                params.local_path, params.remote_path, summary
            );
            Ok::<_, AdbError>(action_payload(&device, message))
        }
        .await,
    )
}

pub async fn pull_file(adb: &Adb, params: PullFileParams) -> McpResult<CallToolResult> {
    let local = Path::new(&params.local_path);
    precheck(validate_remote_path(&params.remote_path))?;
    precheck(validate_pull_target(local))?;

    respond(
        async {
            let device = adb.resolve_device(params.device_id.as_deref()).await?;
            let summary = adb.pull(&device, &params.remote_path, local).await?;
            let message = format!(
                "Pulled {} to {}: {}",
                params.remote_path, params.local_path, summary
            );
            Ok::<_, AdbError>(action_payload(&device, message))
        }
        .await,
    )
}

pub async fn get_logcat(
    adb: &Adb,
    limits: &LimitsConfig,
    params: LogcatParams,
) -> McpResult<CallToolResult> {
    let lines = match params.lines {
        Some(0) => return Err(invalid_params("lines must be at least 1")),
        Some(n) => n.min(limits.logcat_max_lines),
        None => limits.logcat_default_lines,
    };
    let priority = params
        .priority
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .map(str::parse::<LogPriority>)
        .transpose()
        .map_err(|e| invalid_params(e.to_string()))?;

    let device_id = params.device_id;
    let options = LogcatOptions {
        lines,
        priority,
        tag: params.tag,
        clear: params.clear,
    };
    precheck(build_logcat_args(&options).map(drop))?;

    respond(
        async {
            let device = adb.resolve_device(device_id.as_deref()).await?;
            let out = adb.logcat(&device, &options).await?;
            Ok::<_, AdbError>(json!({
                "device_id": device,
                "lines": out.lines,
                "output": out.text,
                "truncated": out.truncated,
            }))
        }
        .await,
    )
}

pub async fn take_screenshot(adb: &Adb, params: ScreenshotParams) -> McpResult<CallToolResult> {
    let device = match adb.resolve_device(params.device_id.as_deref()).await {
        Ok(device) => device,
        Err(e) => return adb_failure(e),
    };
    let shot = match adb.screenshot(&device).await {
        Ok(shot) => shot,
        Err(e) => return adb_failure(e),
    };

    match params.output_path {
        Some(path) => {
            if let Err(e) = tokio::fs::write(&path, &shot.data).await {
                warn!("failed to save screenshot to {}: {}", path, e);
                return Ok(tool_error(
                    UNKNOWN_ERROR,
                    &format!("failed to save screenshot to {}: {}", path, e),
                ));
            }
            Ok(text_success(format!(
                "Screenshot saved to {} ({}x{}, {} bytes)",
                path,
                shot.width,
                shot.height,
                shot.data.len()
            )))
        }
        None => {
            let b64 = base64::engine::general_purpose::STANDARD.encode(&shot.data);
            Ok(CallToolResult::success(vec![Content::image(b64, "image/png")]))
        }
    }
}

pub async fn start_app(adb: &Adb, params: StartAppParams) -> McpResult<CallToolResult> {
    precheck(validate_package_name(&params.package_name))?;
    if let Some(activity) = params.activity.as_deref() {
        precheck(validate_activity(activity))?;
    }

    respond(
        async {
            let device = adb.resolve_device(params.device_id.as_deref()).await?;
            let message = adb
                .start_app(&device, &params.package_name, params.activity.as_deref())
                .await?;
            Ok::<_, AdbError>(action_payload(&device, message))
        }
        .await,
    )
}

pub async fn stop_app(adb: &Adb, params: StopAppParams) -> McpResult<CallToolResult> {
    precheck(validate_package_name(&params.package_name))?;

    respond(
        async {
            let device = adb.resolve_device(params.device_id.as_deref()).await?;
            let message = adb.stop_app(&device, &params.package_name).await?;
            Ok::<_, AdbError>(action_payload(&device, message))
        }
        .await,
    )
}
