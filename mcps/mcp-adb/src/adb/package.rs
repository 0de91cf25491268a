//! App lifecycle: install, uninstall, launch, force-stop

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{info, instrument};

use super::{device_args, Adb};
use crate::error::{AdbError, AdbResult};

const LAUNCHER_CATEGORY: &str = "android.intent.category.LAUNCHER";

fn package_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)+$")
            .expect("package regex is valid")
    })
}

fn activity_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\.?[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)*$")
            .expect("activity regex is valid")
    })
}

fn failure_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Failure \[([^\]]+)\]").expect("failure regex is valid"))
}

/// Reject anything that is not a dotted Java package name
pub fn validate_package_name(package: &str) -> AdbResult<()> {
    if package_regex().is_match(package) {
        Ok(())
    } else {
        Err(AdbError::InvalidArgument(format!(
            "invalid package name: {:?}",
            package
        )))
    }
}

/// Accept `.MainActivity` or `com.example.app.MainActivity`
pub fn validate_activity(activity: &str) -> AdbResult<()> {
    if activity_regex().is_match(activity) {
        Ok(())
    } else {
        Err(AdbError::InvalidArgument(format!(
            "invalid activity name: {:?}",
            activity
        )))
    }
}

/// Whether `am start` or `monkey` output reports that nothing launched
///
/// Both exit 0 on failure. Only their own error lines count, so component or
/// package names that merely contain "Error" are not mistaken for one.
pub fn launch_failed(output: &str) -> bool {
    output.contains("No activities found")
        || output.lines().map(str::trim).any(|line| {
            line.starts_with("Error:")
                || line.starts_with("Error type")
                || line.starts_with("** Error")
        })
}

/// Outcome of a package manager command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PmOutcome {
    Success,
    /// Failure code such as `INSTALL_FAILED_ALREADY_EXISTS`
    Failure(String),
    /// Neither marker present; carries the raw output
    Unknown(String),
}

/// Classify `adb install` / `adb uninstall` output
pub fn parse_pm_result(output: &str) -> PmOutcome {
    if let Some(caps) = failure_regex().captures(output) {
        return PmOutcome::Failure(caps[1].to_string());
    }
    if output.lines().any(|l| l.trim() == "Success") {
        return PmOutcome::Success;
    }
    PmOutcome::Unknown(output.trim().to_string())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InstallOptions {
    /// `-r`: replace an existing install
    pub replace: bool,
    /// `-g`: grant every runtime permission
    pub grant_permissions: bool,
}

impl Adb {
    #[instrument(skip(self))]
    pub async fn install(
        &self,
        device: &str,
        apk_path: &Path,
        options: InstallOptions,
    ) -> AdbResult<String> {
        if !apk_path.is_file() {
            return Err(AdbError::InvalidArgument(format!(
                "APK file not found: {}",
                apk_path.display()
            )));
        }

        let mut rest = vec!["install".to_string()];
        if options.replace {
            rest.push("-r".into());
        }
        if options.grant_permissions {
            rest.push("-g".into());
        }
        rest.push(apk_path.display().to_string());

        let output = self.run_transfer(device_args(device, rest)).await?;
        let text = output.combined_text();

        match parse_pm_result(&text) {
            PmOutcome::Success if output.success() => {
                info!(device, apk = %apk_path.display(), "installed");
                Ok(format!("Successfully installed {}", apk_path.display()))
            }
            PmOutcome::Failure(code) => Err(AdbError::InstallFailed(code)),
            PmOutcome::Success | PmOutcome::Unknown(_) => Err(AdbError::InstallFailed(text)),
        }
    }

    #[instrument(skip(self))]
    pub async fn uninstall(&self, device: &str, package: &str, keep_data: bool) -> AdbResult<String> {
        validate_package_name(package)?;

        let mut rest = vec!["uninstall"];
        if keep_data {
            rest.push("-k");
        }
        rest.push(package);

        let output = self.run(device_args(device, rest)).await?;
        let text = output.combined_text();

        match parse_pm_result(&text) {
            PmOutcome::Success if output.success() => {
                info!(device, package, "uninstalled");
                Ok(format!("Successfully uninstalled {}", package))
            }
            PmOutcome::Failure(code) => Err(AdbError::UninstallFailed(code)),
            PmOutcome::Success | PmOutcome::Unknown(_) => Err(AdbError::UninstallFailed(text)),
        }
    }

    /// Launch an app, through an explicit activity or its launcher intent
    #[instrument(skip(self))]
    pub async fn start_app(
        &self,
        device: &str,
        package: &str,
        activity: Option<&str>,
    ) -> AdbResult<String> {
        validate_package_name(package)?;

        let rest = match activity {
            Some(activity) => {
                validate_activity(activity)?;
                vec![
                    "shell".to_string(),
                    "am".into(),
                    "start".into(),
                    "-n".into(),
                    format!("{}/{}", package, activity),
                ]
            }
            None => vec![
                "shell".to_string(),
                "monkey".into(),
                "-p".into(),
                package.into(),
                "-c".into(),
                LAUNCHER_CATEGORY.into(),
                "1".into(),
            ],
        };

        let output = self.run(device_args(device, rest)).await?;
        let text = output.combined_text();

        if !output.success() || launch_failed(&text) {
            return Err(AdbError::LaunchFailed(text));
        }

        info!(device, package, "started");
        Ok(format!("Started {}", package))
    }

    #[instrument(skip(self))]
    pub async fn stop_app(&self, device: &str, package: &str) -> AdbResult<String> {
        validate_package_name(package)?;
        self.run_checked(device_args(device, ["shell", "am", "force-stop", package]))
            .await?;
        Ok(format!("Stopped {}", package))
    }
}
