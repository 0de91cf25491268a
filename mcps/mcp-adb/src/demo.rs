//! Demo mode: drive the tools in-process and print what they return

use std::fmt::Write as _;

use mcp_common::{first_text, EmbeddableMcp};
use serde_json::{json, Value};

use crate::server::AdbMcpServer;

const SHOWN_PROPERTIES: usize = 3;

/// List devices, then show a few properties of the first ready one
pub async fn run(server: &AdbMcpServer) -> anyhow::Result<String> {
    let mut report = String::new();
    writeln!(report, "{} demo", server.server_name())?;
    writeln!(report, "Tools: {}", server.list_tools().len())?;

    let devices = call_json(server, "list_devices", Value::Null).await?;
    let list = devices["devices"].as_array().cloned().unwrap_or_default();
    writeln!(report, "Devices: {}", list.len())?;
    for device in &list {
        writeln!(
            report,
            "  {} ({}) {}",
            device["id"].as_str().unwrap_or("?"),
            device["status"].as_str().unwrap_or("?"),
            device["model"].as_str().unwrap_or("")
        )?;
    }

    let Some(ready) = list
        .iter()
        .find(|d| d["status"] == "device")
        .and_then(|d| d["id"].as_str())
    else {
        writeln!(report, "No ready device, skipping device info")?;
        return Ok(report);
    };

    let info = call_json(server, "get_device_info", json!({ "device_id": ready })).await?;
    writeln!(report, "Properties of {}:", ready)?;
    if let Some(props) = info["device_info"].as_object() {
        for (key, value) in props.iter().take(SHOWN_PROPERTIES) {
            writeln!(report, "  {} = {}", key, value.as_str().unwrap_or_default())?;
        }
    }

    Ok(report)
}

async fn call_json(server: &AdbMcpServer, tool: &str, params: Value) -> anyhow::Result<Value> {
    let result = server.call_tool(tool, params).await?;
    let text = first_text(&result).unwrap_or("{}");
    if result.is_error.unwrap_or(false) {
        anyhow::bail!("{} failed: {}", tool, text);
    }
    Ok(serde_json::from_str(text)?)
}
