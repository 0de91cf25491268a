use serde::Serialize;
use tracing::instrument;

use super::{device_args, truncate_text, Adb};
use crate::error::{AdbError, AdbResult};

/// Result of a remote shell command
#[derive(Debug, Clone, Serialize)]
pub struct ShellOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit status of the remote command, -1 if adb did not report one
    pub exit_code: i32,
    /// stdout was cut at the output limit
    pub truncated: bool,
}

/// Messages adb itself prints when it cannot reach the device, as opposed
/// to errors written by the remote command
const ADB_ERROR_PREFIXES: &[&str] = &[
    "error: device ",
    "error: no devices",
    "error: closed",
    "error: protocol fault",
    "adb: ",
];

impl Adb {
    /// Run `command` through `adb shell` on `device`
    ///
    /// A non-zero exit from the remote command is reported in
    /// [`ShellOutput::exit_code`]. Failures of adb itself (device gone,
    /// unauthorized) are errors.
    #[instrument(skip(self))]
    pub async fn shell(&self, device: &str, command: &str) -> AdbResult<ShellOutput> {
        let command = command.trim();
        if command.is_empty() {
            return Err(AdbError::InvalidArgument("command must not be empty".into()));
        }

        let output = self.run(device_args(device, ["shell", command])).await?;
        let stdout = output.stdout_text();
        let stderr = output.stderr_text();
        let exit_code = output.exit_code.unwrap_or(-1);

        if exit_code != 0
            && stdout.is_empty()
            && ADB_ERROR_PREFIXES.iter().any(|p| stderr.starts_with(p))
        {
            return Err(AdbError::CommandFailed {
                code: exit_code,
                stderr,
            });
        }

        let (stdout, truncated) = truncate_text(stdout, self.max_output_bytes());
        let (stderr, _) = truncate_text(stderr, self.max_output_bytes());

        Ok(ShellOutput {
            stdout,
            stderr,
            exit_code,
            truncated,
        })
    }
}
