use std::path::Path;

use tracing::{info, instrument};

use super::{device_args, Adb};
use crate::error::{AdbError, AdbResult};

/// Last non-empty line of adb's output, which holds the transfer summary
fn summary_line(text: &str) -> String {
    text.lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default()
        .to_string()
}

pub fn validate_remote_path(remote: &str) -> AdbResult<()> {
    if remote.trim().is_empty() {
        return Err(AdbError::InvalidArgument("remote_path must not be empty".into()));
    }
    Ok(())
}

/// The directory a pull writes into must already exist
pub fn validate_pull_target(local: &Path) -> AdbResult<()> {
    if let Some(parent) = local.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            return Err(AdbError::InvalidArgument(format!(
                "local directory does not exist: {}",
                parent.display()
            )));
        }
    }
    Ok(())
}

impl Adb {
    /// Copy a local file or directory onto the device
    #[instrument(skip(self))]
    pub async fn push(&self, device: &str, local: &Path, remote: &str) -> AdbResult<String> {
        validate_remote_path(remote)?;
        if !local.exists() {
            return Err(AdbError::InvalidArgument(format!(
                "local file not found: {}",
                local.display()
            )));
        }

        let stdout = self
            .run_transfer(device_args(
                device,
                ["push".to_string(), local.display().to_string(), remote.to_string()],
            ))
            .await?
            .into_checked()?;

        info!(device, local = %local.display(), remote, "pushed");
        Ok(summary_line(&stdout))
    }

    /// Copy a file or directory from the device
    #[instrument(skip(self))]
    pub async fn pull(&self, device: &str, remote: &str, local: &Path) -> AdbResult<String> {
        validate_remote_path(remote)?;
        validate_pull_target(local)?;

        let stdout = self
            .run_transfer(device_args(
                device,
                ["pull".to_string(), remote.to_string(), local.display().to_string()],
            ))
            .await?
            .into_checked()?;

        info!(device, remote, local = %local.display(), "pulled");
        Ok(summary_line(&stdout))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::adb::{RawOutput, ScriptedRunner};
    use crate::config::Config;

    fn adb_with(runner: Arc<ScriptedRunner>) -> Adb {
        Adb::with_runner(runner, &Config::default())
    }

    #[test]
    fn test_summary_line() {
        assert_eq!(
            summary_line("[ 50%] /sdcard/a.txt\na.txt: 1 file pushed, 0 skipped.\n\n"),
            "a.txt: 1 file pushed, 0 skipped."
        );
        assert_eq!(summary_line(""), "");
    }

    #[tokio::test]
    async fn test_push() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("notes.txt");
        std::fs::write(&local, "hello").unwrap();

        let runner = Arc::new(ScriptedRunner::new());
        runner.push_output(RawOutput::ok(
            "notes.txt: 1 file pushed, 0 skipped. 0.1 MB/s (5 bytes in 0.001s)\n",
        ));
        let adb = adb_with(runner.clone());

        let summary = adb
            .push("emulator-5554", &local, "/sdcard/notes.txt")
            .await
            .unwrap();

        assert!(summary.contains("1 file pushed"));
        let call = &runner.calls()[0];
        assert_eq!(call[2], "push");
        assert_eq!(call[4], "/sdcard/notes.txt");
        assert_eq!(runner.timeouts(), [Config::default().adb.transfer_timeout()]);
    }

    #[tokio::test]
    async fn test_pull_uses_transfer_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.adb.timeout_secs = 5;
        config.adb.transfer_timeout_secs = 600;

        let runner = Arc::new(ScriptedRunner::new());
        runner.push_output(RawOutput::ok("/sdcard/a.txt: 1 file pulled, 0 skipped."));
        let adb = Adb::with_runner(runner.clone(), &config);

        adb.pull("emulator-5554", "/sdcard/a.txt", &dir.path().join("a.txt"))
            .await
            .unwrap();
        assert_eq!(runner.timeouts(), [Duration::from_secs(600)]);
    }

    #[tokio::test]
    async fn test_push_missing_local_file() {
        let runner = Arc::new(ScriptedRunner::new());
        let adb = adb_with(runner.clone());

        let err = adb
            .push("emulator-5554", Path::new("/no/such/file"), "/sdcard/x")
            .await
            .unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_pull_remote_missing() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(ScriptedRunner::new());
        runner.push_output(RawOutput::failed(
            1,
            "adb: error: failed to stat remote object '/sdcard/nope': No such file or directory",
        ));
        let adb = adb_with(runner);

        let err = adb
            .pull("emulator-5554", "/sdcard/nope", &dir.path().join("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, AdbError::CommandFailed { stderr, .. } if stderr.contains("remote object")));
    }

    #[tokio::test]
    async fn test_pull_into_missing_directory() {
        let runner = Arc::new(ScriptedRunner::new());
        let adb = adb_with(runner);

        let err = adb
            .pull("emulator-5554", "/sdcard/a.txt", Path::new("/no/such/dir/a.txt"))
            .await
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
