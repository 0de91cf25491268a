//! Parameter types for the ADB tools

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct DeviceInfoParams {
    #[schemars(description = "Device ID (optional, uses first available if not specified)")]
    #[serde(default)]
    pub device_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ShellCommandParams {
    #[schemars(description = "Shell command to execute")]
    pub command: String,

    #[schemars(description = "Device ID (optional)")]
    #[serde(default)]
    pub device_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct InstallAppParams {
    #[schemars(description = "Path to the APK file on the host")]
    pub apk_path: String,

    #[schemars(description = "Replace an existing installation, keeping its data (adb install -r)")]
    #[serde(default)]
    pub replace: bool,

    #[schemars(description = "Grant all runtime permissions on install (adb install -g)")]
    #[serde(default)]
    pub grant_permissions: bool,

    #[schemars(description = "Device ID (optional)")]
    #[serde(default)]
    pub device_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UninstallAppParams {
    #[schemars(description = "Package name to uninstall, e.g. com.example.app")]
    pub package_name: String,

    #[schemars(description = "Keep the app's data and cache directories (adb uninstall -k)")]
    #[serde(default)]
    pub keep_data: bool,

    #[schemars(description = "Device ID (optional)")]
    #[serde(default)]
    pub device_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PushFileParams {
    #[schemars(description = "Local file path")]
    pub local_path: String,

    #[schemars(description = "Remote path on device")]
    pub remote_path: String,

    #[schemars(description = "Device ID (optional)")]
    #[serde(default)]
    pub device_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PullFileParams {
    #[schemars(description = "Remote file path on device")]
    pub remote_path: String,

    #[schemars(description = "Local destination path")]
    pub local_path: String,

    #[schemars(description = "Device ID (optional)")]
    #[serde(default)]
    pub device_id: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct LogcatParams {
    #[schemars(description = "Number of most recent lines to return (default 200)")]
    #[serde(default)]
    pub lines: Option<u32>,

    #[schemars(
        description = "Minimum priority: V, D, I, W, E, F or S (full names like \"error\" also accepted)"
    )]
    #[serde(default)]
    pub priority: Option<String>,

    #[schemars(description = "Only show messages with this tag")]
    #[serde(default)]
    pub tag: Option<String>,

    #[schemars(description = "Clear the log buffer before reading")]
    #[serde(default)]
    pub clear: bool,

    #[schemars(description = "Device ID (optional)")]
    #[serde(default)]
    pub device_id: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct ScreenshotParams {
    #[schemars(description = "Host file path to save the PNG to (optional, returns the image if omitted)")]
    #[serde(default)]
    pub output_path: Option<String>,

    #[schemars(description = "Device ID (optional)")]
    #[serde(default)]
    pub device_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct StartAppParams {
    #[schemars(description = "Package name of the app to launch")]
    pub package_name: String,

    #[schemars(
        description = "Activity to start, relative (.MainActivity) or fully qualified (optional, launcher activity if omitted)"
    )]
    #[serde(default)]
    pub activity: Option<String>,

    #[schemars(description = "Device ID (optional)")]
    #[serde(default)]
    pub device_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct StopAppParams {
    #[schemars(description = "Package name of the app to force-stop")]
    pub package_name: String,

    #[schemars(description = "Device ID (optional)")]
    #[serde(default)]
    pub device_id: Option<String>,
}
