use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::instrument;

use super::{device_args, truncate_text, Adb};
use crate::error::{AdbError, AdbResult};

/// logcat priority filter, lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogPriority {
    Verbose,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Silent,
}

impl LogPriority {
    /// Single-letter form used in filter expressions
    pub fn letter(self) -> char {
        match self {
            LogPriority::Verbose => 'V',
            LogPriority::Debug => 'D',
            LogPriority::Info => 'I',
            LogPriority::Warn => 'W',
            LogPriority::Error => 'E',
            LogPriority::Fatal => 'F',
            LogPriority::Silent => 'S',
        }
    }
}

impl FromStr for LogPriority {
    type Err = AdbError;

    /// Accepts the letter or the full name, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v" | "verbose" => Ok(LogPriority::Verbose),
            "d" | "debug" => Ok(LogPriority::Debug),
            "i" | "info" => Ok(LogPriority::Info),
            "w" | "warn" | "warning" => Ok(LogPriority::Warn),
            "e" | "error" => Ok(LogPriority::Error),
            "f" | "fatal" => Ok(LogPriority::Fatal),
            "s" | "silent" => Ok(LogPriority::Silent),
            other => Err(AdbError::InvalidArgument(format!(
                "unknown log priority {:?}, expected one of V D I W E F S",
                other
            ))),
        }
    }
}

impl fmt::Display for LogPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

#[derive(Debug, Clone)]
pub struct LogcatOptions {
    pub lines: u32,
    pub priority: Option<LogPriority>,
    pub tag: Option<String>,
    /// Clear the buffer before dumping
    pub clear: bool,
}

impl Default for LogcatOptions {
    fn default() -> Self {
        Self {
            lines: 200,
            priority: None,
            tag: None,
            clear: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LogcatOutput {
    pub text: String,
    /// Log lines in `text`, after truncation
    pub lines: usize,
    pub truncated: bool,
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_.\-/]+$").expect("tag regex is valid"))
}

/// Arguments for the dump command (without `-s <serial>`)
pub fn build_logcat_args(options: &LogcatOptions) -> AdbResult<Vec<String>> {
    if options.lines == 0 {
        return Err(AdbError::InvalidArgument("lines must be at least 1".into()));
    }

    let mut args = vec![
        "logcat".to_string(),
        "-d".into(),
        "-v".into(),
        "time".into(),
        "-t".into(),
        options.lines.to_string(),
    ];

    let tag = options.tag.as_deref().map(str::trim).filter(|t| !t.is_empty());
    match (tag, options.priority) {
        (Some(tag), priority) => {
            if !tag_regex().is_match(tag) {
                return Err(AdbError::InvalidArgument(format!("invalid log tag: {:?}", tag)));
            }
            let priority = priority.unwrap_or(LogPriority::Verbose);
            args.push(format!("{}:{}", tag, priority));
            args.push("*:S".into());
        }
        (None, Some(priority)) => args.push(format!("*:{}", priority)),
        (None, None) => {}
    }

    Ok(args)
}

impl Adb {
    /// Dump recent log lines, optionally clearing the buffer first
    #[instrument(skip(self))]
    pub async fn logcat(&self, device: &str, options: &LogcatOptions) -> AdbResult<LogcatOutput> {
        let args = build_logcat_args(options)?;

        if options.clear {
            self.run_checked(device_args(device, ["logcat", "-c"]))
                .await?;
        }

        let stdout = self.run_checked(device_args(device, args)).await?;
        let (text, truncated) = truncate_text(stdout, self.max_output_bytes());
        let lines = text
            .lines()
            .filter(|l| !l.starts_with("--------- beginning of"))
            .count();

        Ok(LogcatOutput {
            text,
            lines,
            truncated,
        })
    }
}
