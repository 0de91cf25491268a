//! Integration tests for the mcp-adb server
//!
//! Most tests drive the server in-process through `EmbeddableMcp`, backed by
//! the mock device farm or a scripted runner. Tests prefixed `device_` talk
//! to a real adb and an attached device or emulator.
//!
//! # Running tests
//!
//! ```bash
//! # In-process tests only
//! cargo test -p mcp-adb --test integration
//!
//! # Include the real-device tests (adb on PATH, one device attached)
//! cargo test -p mcp-adb --test integration -- --ignored device_
//! ```

use std::process::Command;
use std::sync::Arc;

use mcp_adb::adb::{RawOutput, ScriptedRunner, MOCK_EMULATOR, MOCK_PHONE};
use mcp_adb::validation::{synthetic_png, validate_png};
use mcp_adb::{Adb, AdbError, AdbMcpServer, Config};
use mcp_common::{first_text, EmbeddableError, EmbeddableMcp};
use rmcp::model::RawContent;
use serde_json::{json, Value};

fn mock_server() -> AdbMcpServer {
    let config = Config::default();
    let adb = Adb::mock(&config);
    AdbMcpServer::new(config, adb)
}

fn scripted_server(runner: Arc<ScriptedRunner>) -> AdbMcpServer {
    let config = Config::default();
    let adb = Adb::with_runner(runner, &config);
    AdbMcpServer::new(config, adb)
}

async fn call_ok(server: &AdbMcpServer, tool: &str, params: Value) -> Value {
    let result = server.call_tool(tool, params).await.unwrap();
    let text = first_text(&result).unwrap();
    assert!(!result.is_error.unwrap_or(false), "{} failed: {}", tool, text);
    serde_json::from_str(text).unwrap()
}

// ============================================================================
// MOCK BACKEND
// ============================================================================

#[tokio::test]
async fn mock_list_devices() {
    let json = call_ok(&mock_server(), "list_devices", json!({})).await;

    assert_eq!(json["count"], 2);
    assert_eq!(json["devices"][0]["id"], MOCK_EMULATOR);
    assert_eq!(json["devices"][1]["id"], MOCK_PHONE);
    assert_eq!(json["devices"][1]["model"], "SM_G973F");
}

#[tokio::test]
async fn mock_device_info_uses_first_device() {
    let json = call_ok(&mock_server(), "get_device_info", json!({})).await;

    assert_eq!(json["device_id"], MOCK_EMULATOR);
    assert_eq!(json["device_info"]["ro.build.version.sdk"], "34");
}

#[tokio::test]
async fn mock_shell_command() {
    let json = call_ok(
        &mock_server(),
        "shell_command",
        json!({ "command": "getprop ro.product.model", "device_id": MOCK_PHONE }),
    )
    .await;

    assert_eq!(json["device_id"], MOCK_PHONE);
    assert_eq!(json["exit_code"], 0);
    assert_eq!(json["output"], "mock output for: getprop ro.product.model");
}

#[tokio::test]
async fn mock_app_lifecycle() {
    let server = mock_server();
    let dir = tempfile::tempdir().unwrap();
    let apk = dir.path().join("app-debug.apk");
    std::fs::write(&apk, b"PK\x03\x04").unwrap();

    let installed = call_ok(
        &server,
        "install_app",
        json!({ "apk_path": apk.display().to_string(), "replace": true }),
    )
    .await;
    assert_eq!(installed["success"], true);

    let started = call_ok(
        &server,
        "start_app",
        json!({ "package_name": "com.example.app", "activity": ".MainActivity" }),
    )
    .await;
    assert_eq!(started["success"], true);

    call_ok(&server, "stop_app", json!({ "package_name": "com.example.app" })).await;

    let removed = call_ok(
        &server,
        "uninstall_app",
        json!({ "package_name": "com.example.app", "keep_data": true }),
    )
    .await;
    assert_eq!(removed["message"], "Successfully uninstalled com.example.app");
}

#[tokio::test]
async fn mock_file_transfer() {
    let server = mock_server();
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("notes.txt");
    std::fs::write(&local, "hello").unwrap();

    let pushed = call_ok(
        &server,
        "push_file",
        json!({ "local_path": local.display().to_string(), "remote_path": "/sdcard/notes.txt" }),
    )
    .await;
    assert!(pushed["message"].as_str().unwrap().contains("1 file pushed"));

    let pulled = call_ok(
        &server,
        "pull_file",
        json!({
            "remote_path": "/sdcard/notes.txt",
            "local_path": dir.path().join("copy.txt").display().to_string(),
        }),
    )
    .await;
    assert!(pulled["message"].as_str().unwrap().contains("1 file pulled"));
}

#[tokio::test]
async fn mock_logcat() {
    let json = call_ok(
        &mock_server(),
        "get_logcat",
        json!({ "lines": 50, "priority": "warn", "clear": true }),
    )
    .await;

    assert_eq!(json["lines"], 4);
    assert!(json["output"].as_str().unwrap().contains("network request failed"));
}

#[tokio::test]
async fn mock_screenshot_returns_png_image() {
    let result = mock_server()
        .call_tool("take_screenshot", json!({}))
        .await
        .unwrap();

    match &result.content[0].raw {
        RawContent::Image(image) => {
            assert_eq!(image.mime_type, "image/png");
            use base64::Engine;
            let data = base64::engine::general_purpose::STANDARD
                .decode(&image.data)
                .unwrap();
            let info = validate_png(&data).unwrap();
            assert_eq!((info.width, info.height), (1080, 2400));
        }
        other => panic!("expected image content, got {:?}", other),
    }
}

#[tokio::test]
async fn invalid_arguments_are_protocol_errors() {
    let server = mock_server();

    let cases = [
        ("shell_command", json!({ "command": "" })),
        ("uninstall_app", json!({ "package_name": "rm -rf" })),
        ("install_app", json!({ "apk_path": "/missing/app.apk" })),
        ("get_logcat", json!({ "priority": "chatty" })),
        ("get_logcat", json!({ "lines": 0 })),
        ("start_app", json!({ "package_name": "com.example.app", "activity": "a/b" })),
    ];

    for (tool, params) in cases {
        let result = server.call_tool(tool, params.clone()).await;
        assert!(
            matches!(result, Err(EmbeddableError::InvalidParams(_))),
            "{} {} should be rejected, got {:?}",
            tool,
            params,
            result
        );
    }
}

// ============================================================================
// SCRIPTED RUNNER
// ============================================================================

#[tokio::test]
async fn scripted_unauthorized_device_is_reported() {
    let runner = Arc::new(ScriptedRunner::new());
    runner.push_output(RawOutput::ok(
        "List of devices attached\nR58M123ABC unauthorized usb:1-1 transport_id:4\n",
    ));

    let result = scripted_server(runner)
        .call_tool("shell_command", json!({ "command": "ls" }))
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(true));
    let body: Value = serde_json::from_str(first_text(&result).unwrap()).unwrap();
    assert_eq!(body["type"], "ADBError");
    assert_eq!(
        body["error"],
        "device R58M123ABC is not ready (state: unauthorized)"
    );
}

#[tokio::test]
async fn invalid_arguments_rejected_without_devices() {
    let cases = [
        ("start_app", json!({ "package_name": "com.example.app", "activity": "a/b" })),
        ("get_logcat", json!({ "tag": "x; reboot" })),
        ("push_file", json!({ "local_path": "/missing/file", "remote_path": "/sdcard/x" })),
        ("pull_file", json!({ "remote_path": "", "local_path": "out.txt" })),
        ("stop_app", json!({ "package_name": "rm -rf" })),
    ];

    for (tool, params) in cases {
        let runner = Arc::new(ScriptedRunner::new());
        runner.push_output(RawOutput::ok("List of devices attached\n"));
        let result = scripted_server(runner.clone())
            .call_tool(tool, params.clone())
            .await;

        assert!(
            matches!(result, Err(EmbeddableError::InvalidParams(_))),
            "{} {} should be rejected, got {:?}",
            tool,
            params,
            result
        );
        assert!(runner.calls().is_empty(), "{} ran adb", tool);
    }
}

#[tokio::test]
async fn scripted_timeout_is_reported() {
    let runner = Arc::new(ScriptedRunner::new());
    runner.push_error(AdbError::Timeout { secs: 30 });

    let result = scripted_server(runner)
        .call_tool(
            "shell_command",
            json!({ "command": "sleep 100", "device_id": "emulator-5554" }),
        )
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(true));
    assert!(first_text(&result).unwrap().contains("timed out after 30s"));
}

#[tokio::test]
async fn scripted_screenshot_fallback() {
    let runner = Arc::new(ScriptedRunner::new());
    runner
        .push_output(RawOutput::ok(b"not an image".to_vec()))
        .push_output(RawOutput::ok(""))
        .push_output(RawOutput::ok(synthetic_png(720, 1280)))
        .push_output(RawOutput::ok(""));

    let result = scripted_server(runner.clone())
        .call_tool("take_screenshot", json!({ "device_id": "emulator-5554" }))
        .await
        .unwrap();

    assert!(matches!(result.content[0].raw, RawContent::Image(_)));
    assert_eq!(runner.calls().len(), 4);
}

#[tokio::test]
async fn disabled_tools_are_hidden() {
    let mut config = Config::default();
    config.tools.enabled = vec!["list_devices".into(), "get_device_info".into()];
    let adb = Adb::mock(&config);
    let server = AdbMcpServer::new(config, adb);

    assert_eq!(server.list_tools().len(), 2);
    assert!(matches!(
        server.call_tool("take_screenshot", json!({})).await,
        Err(EmbeddableError::ToolNotFound(_))
    ));
}

// ============================================================================
// REAL DEVICE TESTS (need adb and an attached device)
// ============================================================================

fn device_available() -> bool {
    Command::new("adb")
        .args(["get-state"])
        .output()
        .map(|o| o.status.success() && String::from_utf8_lossy(&o.stdout).trim() == "device")
        .unwrap_or(false)
}

fn real_server() -> AdbMcpServer {
    let config = Config::default();
    let adb = Adb::new(&config);
    AdbMcpServer::new(config, adb)
}

#[tokio::test]
#[ignore = "integration test - requires adb and an attached device"]
async fn device_list_and_info() {
    if !device_available() {
        eprintln!("Skipping: no adb device available");
        return;
    }

    let server = real_server();
    let devices = call_ok(&server, "list_devices", json!({})).await;
    assert!(devices["count"].as_u64().unwrap() >= 1);

    let info = call_ok(&server, "get_device_info", json!({})).await;
    assert!(info["device_info"]["ro.build.version.sdk"].is_string());
}

#[tokio::test]
#[ignore = "integration test - requires adb and an attached device"]
async fn device_shell_and_screenshot() {
    if !device_available() {
        eprintln!("Skipping: no adb device available");
        return;
    }

    let server = real_server();
    let shell = call_ok(&server, "shell_command", json!({ "command": "echo hello" })).await;
    assert_eq!(shell["output"], "hello");

    let result = server
        .call_tool("take_screenshot", json!({}))
        .await
        .unwrap();
    assert!(matches!(result.content[0].raw, RawContent::Image(_)));
}
