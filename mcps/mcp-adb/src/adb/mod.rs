//! adb client
//!
//! [`Adb`] wraps a [`CommandRunner`] with the configured timeouts and the
//! daemon retry policy. Operations live in the submodules as `impl Adb`
//! blocks, one per feature area.

mod device;
mod file;
mod logcat;
mod mock;
mod package;
mod runner;
mod screenshot;
mod shell;

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

pub use device::*;
pub use file::{validate_pull_target, validate_remote_path};
pub use logcat::*;
pub use mock::*;
pub use package::*;
pub use runner::*;
pub use screenshot::*;
pub use shell::*;

use crate::config::Config;
use crate::error::{AdbError, AdbResult};

const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// stderr fragments printed when the client cannot reach the adb server
const DAEMON_FAILURES: &[&str] = &[
    "cannot connect to daemon",
    "daemon not running",
    "daemon still not running",
    "failed to start daemon",
];

/// Handle for issuing adb commands
#[derive(Clone)]
pub struct Adb {
    runner: Arc<dyn CommandRunner>,
    timeout: Duration,
    transfer_timeout: Duration,
    retry_attempts: u32,
    retry_backoff: Duration,
    max_output_bytes: usize,
}

impl Adb {
    /// Client backed by the real adb executable
    pub fn new(config: &Config) -> Self {
        Self::with_runner(Arc::new(ProcessRunner::new(&config.adb.path)), config)
    }

    /// Client backed by the canned mock device farm
    pub fn mock(config: &Config) -> Self {
        Self::with_runner(Arc::new(MockRunner::new()), config)
    }

    pub fn with_runner(runner: Arc<dyn CommandRunner>, config: &Config) -> Self {
        Self {
            runner,
            timeout: config.adb.timeout(),
            transfer_timeout: config.adb.transfer_timeout(),
            retry_attempts: config.adb.retry_attempts.max(1),
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            max_output_bytes: config.limits.max_output_bytes,
        }
    }

    /// Override the pause between daemon retries
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn max_output_bytes(&self) -> usize {
        self.max_output_bytes
    }

    /// Run adb with the default timeout
    pub(crate) async fn run(&self, args: Vec<String>) -> AdbResult<RawOutput> {
        self.run_with_timeout(args, self.timeout).await
    }

    /// Run adb with the transfer timeout (install, push, pull)
    pub(crate) async fn run_transfer(&self, args: Vec<String>) -> AdbResult<RawOutput> {
        self.run_with_timeout(args, self.transfer_timeout).await
    }

    /// Run and require a zero exit, returning trimmed stdout
    pub(crate) async fn run_checked(&self, args: Vec<String>) -> AdbResult<String> {
        self.run(args).await?.into_checked()
    }

    async fn run_with_timeout(&self, args: Vec<String>, timeout: Duration) -> AdbResult<RawOutput> {
        let mut attempt = 1;
        loop {
            let result = self
                .runner
                .run(&args, timeout)
                .await
                .and_then(detect_daemon_failure);

            match result {
                Err(e) if e.is_transient() && attempt < self.retry_attempts => {
                    warn!(attempt, max = self.retry_attempts, "{}, retrying", e);
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

/// Turn a failed run whose stderr blames the daemon into `DaemonUnavailable`
fn detect_daemon_failure(output: RawOutput) -> AdbResult<RawOutput> {
    if output.success() {
        return Ok(output);
    }
    let stderr = output.stderr_text();
    let lower = stderr.to_ascii_lowercase();
    if DAEMON_FAILURES.iter().any(|f| lower.contains(f)) {
        return Err(AdbError::DaemonUnavailable(stderr));
    }
    Ok(output)
}

/// `-s <serial>` followed by `rest`
pub(crate) fn device_args<I, S>(serial: &str, rest: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut args = vec!["-s".to_string(), serial.to_string()];
    args.extend(rest.into_iter().map(Into::into));
    args
}

/// Cut text to at most `max_bytes`, backing off to a char boundary
pub(crate) fn truncate_text(mut text: String, max_bytes: usize) -> (String, bool) {
    if text.len() <= max_bytes {
        return (text, false);
    }
    let mut cut = max_bytes;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
    (text, true)
}
