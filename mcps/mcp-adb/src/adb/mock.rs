//! Runners that never touch a real adb
//!
//! [`MockRunner`] answers like a host with two attached devices and backs
//! the `--mock` flag. [`ScriptedRunner`] replays queued responses and
//! records every call, for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::runner::{CommandRunner, RawOutput};
use crate::error::{AdbError, AdbResult};
use crate::validation::synthetic_png;

pub const MOCK_EMULATOR: &str = "emulator-5554";
pub const MOCK_PHONE: &str = "R58M123ABC";

const MOCK_DEVICES: &str = "List of devices attached
emulator-5554          device product:sdk_gphone64_x86_64 model:sdk_gphone64_x86_64 device:emu64xa transport_id:1
R58M123ABC             device usb:1-1 product:beyond1lteeea model:SM_G973F device:beyond1 transport_id:2
";

const MOCK_GETPROP: &str = "[ro.build.display.id]: [UE1A.230829.036]
[ro.build.version.release]: [14]
[ro.build.version.sdk]: [34]
[ro.product.manufacturer]: [Google]
[ro.product.model]: [sdk_gphone64_x86_64]
[ro.serialno]: [EMULATOR34X1X1X0]
[persist.sys.timezone]: []
";

const MOCK_LOGCAT: &str = "--------- beginning of main
10-16 09:12:01.101 I/ActivityManager(  512): Start proc 4242:com.example.app/u0a190 for activity
10-16 09:12:01.356 D/ExampleApp( 4242): onCreate
10-16 09:12:02.004 W/ExampleApp( 4242): slow frame: 48ms
10-16 09:12:03.870 E/ExampleApp( 4242): network request failed: timeout
";

/// Canned responses for a fake host with two ready devices
#[derive(Debug, Default)]
pub struct MockRunner;

impl MockRunner {
    pub fn new() -> Self {
        Self
    }

    fn respond(&self, args: &[String]) -> RawOutput {
        // Drop the `-s <serial>` prefix; every mock device answers alike
        let args: Vec<&str> = match args {
            [flag, _serial, rest @ ..] if flag == "-s" => rest.iter().map(String::as_str).collect(),
            _ => args.iter().map(String::as_str).collect(),
        };

        match args.as_slice() {
            ["devices", ..] => RawOutput::ok(MOCK_DEVICES),
            ["shell", "getprop"] => RawOutput::ok(MOCK_GETPROP),
            ["shell", "am", "force-stop", _] => RawOutput::ok(""),
            ["shell", "am", "start", "-n", component] => {
                RawOutput::ok(format!("Starting: Intent {{ cmp={} }}", component))
            }
            ["shell", "monkey", "-p", package, ..] => RawOutput::ok(format!(
                "  bash arg: -p\n  bash arg: {}\nEvents injected: 1",
                package
            )),
            ["shell", command] => RawOutput::ok(format!("mock output for: {}", command)),
            ["install", .., apk] => RawOutput::ok(format!(
                "Performing Streamed Install\nSuccess\n[mock] {}",
                apk
            )),
            ["uninstall", ..] => RawOutput::ok("Success"),
            ["push", local, _remote] => RawOutput::ok(format!(
                "{}: 1 file pushed, 0 skipped. 12.4 MB/s (1024 bytes in 0.000s)",
                local
            )),
            ["pull", remote, _local] => RawOutput::ok(format!(
                "{}: 1 file pulled, 0 skipped. 9.8 MB/s (1024 bytes in 0.000s)",
                remote
            )),
            ["logcat", "-c"] => RawOutput::ok(""),
            ["logcat", ..] => RawOutput::ok(MOCK_LOGCAT),
            ["exec-out", "screencap", "-p"] => RawOutput::ok(synthetic_png(1080, 2400)),
            other => RawOutput::failed(1, format!("mock: unsupported command: {}", other.join(" "))),
        }
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, args: &[String], _timeout: Duration) -> AdbResult<RawOutput> {
        tracing::debug!("mock adb {}", args.join(" "));
        Ok(self.respond(args))
    }
}

/// Replays queued responses in order and records the arguments and timeout
/// of each call
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    responses: Mutex<VecDeque<AdbResult<RawOutput>>>,
    calls: Mutex<Vec<(Vec<String>, Duration)>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_output(&self, output: RawOutput) -> &Self {
        self.lock_responses().push_back(Ok(output));
        self
    }

    pub fn push_error(&self, error: AdbError) -> &Self {
        self.lock_responses().push_back(Err(error));
        self
    }

    /// Arguments of every call so far
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.lock_calls().iter().map(|(args, _)| args.clone()).collect()
    }

    /// Timeout passed to every call so far
    pub fn timeouts(&self) -> Vec<Duration> {
        self.lock_calls().iter().map(|(_, timeout)| *timeout).collect()
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<(Vec<String>, Duration)>> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_responses(&self) -> std::sync::MutexGuard<'_, VecDeque<AdbResult<RawOutput>>> {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, args: &[String], timeout: Duration) -> AdbResult<RawOutput> {
        self.lock_calls().push((args.to_vec(), timeout));

        self.lock_responses().pop_front().unwrap_or_else(|| {
            Ok(RawOutput::failed(
                1,
                format!("no scripted response for: adb {}", args.join(" ")),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_mock_devices() {
        let out = MockRunner::new()
            .run(&args(&["devices", "-l"]), Duration::from_secs(1))
            .await
            .unwrap();
        assert!(out.stdout_text().contains(MOCK_EMULATOR));
        assert!(out.stdout_text().contains(MOCK_PHONE));
    }

    #[tokio::test]
    async fn test_mock_strips_serial() {
        let out = MockRunner::new()
            .run(
                &args(&["-s", MOCK_PHONE, "shell", "ls /"]),
                Duration::from_secs(1),
            )
            .await
            .unwrap();
        assert_eq!(out.stdout_text(), "mock output for: ls /");
    }

    #[tokio::test]
    async fn test_mock_unknown_command_fails() {
        let out = MockRunner::new()
            .run(&args(&["reboot", "bootloader"]), Duration::from_secs(1))
            .await
            .unwrap();
        assert!(!out.success());
    }

    #[tokio::test]
    async fn test_scripted_runner_replays_in_order() {
        let runner = ScriptedRunner::new();
        runner
            .push_output(RawOutput::ok("first"))
            .push_error(AdbError::Timeout { secs: 1 });

        let first = runner.run(&args(&["a"]), Duration::from_secs(1)).await;
        let second = runner.run(&args(&["b"]), Duration::from_secs(2)).await;
        let third = runner.run(&args(&["c"]), Duration::from_secs(3)).await;

        assert_eq!(first.unwrap().stdout_text(), "first");
        assert!(matches!(second, Err(AdbError::Timeout { .. })));
        assert!(!third.unwrap().success());
        assert_eq!(runner.calls(), vec![args(&["a"]), args(&["b"]), args(&["c"])]);
        assert_eq!(
            runner.timeouts(),
            [1, 2, 3].map(Duration::from_secs).to_vec()
        );
    }
}
