//! Process execution seam
//!
//! Everything the server does ends up as an `adb <args>` invocation. The
//! [`CommandRunner`] trait is that single call, so the real process can be
//! swapped for the mock backend or a scripted one in tests.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error, instrument};

use crate::error::{AdbError, AdbResult};

/// Captured result of one adb invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
}

impl RawOutput {
    /// Successful exit with the given stdout
    pub fn ok(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: Vec::new(),
            exit_code: Some(0),
        }
    }

    /// Failed exit with the given stderr
    pub fn failed(code: i32, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: Vec::new(),
            stderr: stderr.into(),
            exit_code: Some(code),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).trim().to_string()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }

    /// stdout and stderr joined; the package manager writes to either
    pub fn combined_text(&self) -> String {
        let stdout = self.stdout_text();
        let stderr = self.stderr_text();
        match (stdout.is_empty(), stderr.is_empty()) {
            (_, true) => stdout,
            (true, false) => stderr,
            (false, false) => format!("{}\n{}", stdout, stderr),
        }
    }

    /// The output itself on a zero exit, `CommandFailed` otherwise
    pub fn check(self) -> AdbResult<Self> {
        if self.success() {
            return Ok(self);
        }
        let stderr = self.stderr_text();
        Err(AdbError::CommandFailed {
            code: self.exit_code.unwrap_or(-1),
            // Some adb builds print errors on stdout
            stderr: if stderr.is_empty() {
                self.stdout_text()
            } else {
                stderr
            },
        })
    }

    /// Trimmed stdout on a zero exit, `CommandFailed` otherwise
    pub fn into_checked(self) -> AdbResult<String> {
        self.check().map(|out| out.stdout_text())
    }
}

/// Runs `adb` with the given arguments
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, args: &[String], timeout: Duration) -> AdbResult<RawOutput>;
}

/// Spawns the real adb executable
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    adb_path: String,
}

impl ProcessRunner {
    pub fn new(adb_path: impl Into<String>) -> Self {
        Self {
            adb_path: adb_path.into(),
        }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    #[instrument(skip(self, timeout), fields(cmd = %args.join(" ")))]
    async fn run(&self, args: &[String], timeout: Duration) -> AdbResult<RawOutput> {
        debug!("executing: {} {}", self.adb_path, args.join(" "));

        let child = Command::new(&self.adb_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AdbError::NotFound {
                        path: self.adb_path.clone(),
                    }
                } else {
                    AdbError::Spawn(e)
                }
            })?;

        // Dropping the wait future on timeout kills the child
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                error!(secs = timeout.as_secs(), "adb command timed out");
                return Err(AdbError::Timeout {
                    secs: timeout.as_secs(),
                });
            }
        };

        Ok(RawOutput {
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code: output.status.code(),
        })
    }
}
