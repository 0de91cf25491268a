//! Error types for adb operations

use thiserror::Error;

use crate::validation::PngError;

/// Errors that can occur while driving the adb executable
#[derive(Error, Debug)]
pub enum AdbError {
    /// The configured adb executable does not exist or is not on PATH
    #[error("ADB executable not found at: {path}")]
    NotFound { path: String },

    /// Failed to spawn or talk to the adb process
    #[error("failed to execute ADB command: {0}")]
    Spawn(#[from] std::io::Error),

    /// adb exited with a non-zero status
    #[error("ADB command failed (exit code {code}): {stderr}")]
    CommandFailed { code: i32, stderr: String },

    /// adb could not reach (or start) its server daemon
    #[error("ADB daemon unavailable: {0}")]
    DaemonUnavailable(String),

    /// The command did not finish within the configured timeout
    #[error("ADB command timed out after {secs}s")]
    Timeout { secs: u64 },

    /// No device is attached at all
    #[error("no Android devices connected")]
    NoDevices,

    /// Devices are attached but none is usable (offline, unauthorized, ...)
    #[error("device {serial} is not ready (state: {state})")]
    DeviceUnavailable { serial: String, state: String },

    /// The package manager reported an install failure
    #[error("install failed: {0}")]
    InstallFailed(String),

    /// The package manager reported an uninstall failure
    #[error("uninstall failed: {0}")]
    UninstallFailed(String),

    /// The activity manager or monkey refused to launch the app
    #[error("failed to start app: {0}")]
    LaunchFailed(String),

    /// Screen capture produced unusable data
    #[error("invalid screenshot: {0}")]
    Screenshot(#[from] PngError),

    /// An argument failed validation before any command was issued
    #[error("{0}")]
    InvalidArgument(String),
}

impl AdbError {
    /// Daemon start-up races are the only failures worth retrying: the
    /// command never reached a device, so repeating it is safe.
    pub fn is_transient(&self) -> bool {
        matches!(self, AdbError::DaemonUnavailable(_))
    }

    /// Whether the caller, not the device, is at fault
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, AdbError::InvalidArgument(_))
    }
}

/// Result type alias for adb operations
pub type AdbResult<T> = Result<T, AdbError>;
