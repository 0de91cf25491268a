//! Configuration loading for mcp-adb
//!
//! Configuration is resolved in layers, later layers winning:
//! 1. Built-in defaults
//! 2. The first TOML file found:
//!    `--config` / `MCP_ADB_CONFIG`, `./mcp-adb.toml`,
//!    `$XDG_CONFIG_HOME/mcp-adb/config.toml`, `~/.mcp-adb.toml`
//! 3. Environment: `MCP_ADB_PATH`, `MCP_ADB_TIMEOUT`, `MCP_ADB_LOG_LEVEL`
//! 4. Command-line flags (applied by the binary)

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::server::TOOL_NAMES;

pub const ENV_CONFIG_PATH: &str = "MCP_ADB_CONFIG";
pub const ENV_ADB_PATH: &str = "MCP_ADB_PATH";
pub const ENV_TIMEOUT: &str = "MCP_ADB_TIMEOUT";
pub const ENV_LOG_LEVEL: &str = "MCP_ADB_LOG_LEVEL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub adb: AdbConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Log level for the mcp_adb target
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// "text" or "json"
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdbConfig {
    /// adb executable, bare name resolved through PATH
    #[serde(default = "default_adb_path")]
    pub path: String,
    /// Per-command timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Timeout for install, push and pull, which move whole files
    #[serde(default = "default_transfer_timeout")]
    pub transfer_timeout_secs: u64,
    /// Total attempts for commands that hit a daemon start-up failure
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
}

fn default_adb_path() -> String {
    "adb".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_transfer_timeout() -> u64 {
    300
}

fn default_retry_attempts() -> u32 {
    3
}

impl Default for AdbConfig {
    fn default() -> Self {
        Self {
            path: default_adb_path(),
            timeout_secs: default_timeout(),
            transfer_timeout_secs: default_transfer_timeout(),
            retry_attempts: default_retry_attempts(),
        }
    }
}

impl AdbConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_secs(self.transfer_timeout_secs.max(self.timeout_secs))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Tools exposed to clients
    #[serde(default = "default_enabled_tools")]
    pub enabled: Vec<String>,
}

fn default_enabled_tools() -> Vec<String> {
    TOOL_NAMES.iter().map(|s| s.to_string()).collect()
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled_tools(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Cap on text returned from shell and logcat, in bytes
    #[serde(default = "default_max_output")]
    pub max_output_bytes: usize,
    #[serde(default = "default_logcat_lines")]
    pub logcat_default_lines: u32,
    #[serde(default = "default_logcat_max_lines")]
    pub logcat_max_lines: u32,
}

fn default_max_output() -> usize {
    1024 * 1024
}

fn default_logcat_lines() -> u32 {
    200
}

fn default_logcat_max_lines() -> u32 {
    5000
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_output_bytes: default_max_output(),
            logcat_default_lines: default_logcat_lines(),
            logcat_max_lines: default_logcat_max_lines(),
        }
    }
}

/// Outcome of [`Config::load`]
///
/// Loading happens before tracing is set up, so problems are collected here
/// and logged by the caller once it is.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    /// File the configuration came from, `None` for built-in defaults
    pub source: Option<PathBuf>,
    pub warnings: Vec<String>,
}

impl Config {
    /// Load configuration from the first file found, then apply the environment
    ///
    /// A file that cannot be read or parsed is reported and skipped; the
    /// server still starts on defaults.
    pub fn load(explicit: Option<&Path>) -> LoadedConfig {
        let mut warnings = Vec::new();
        let mut source = None;

        let candidates = Self::candidate_paths(explicit);
        if let Some(path) = explicit.filter(|p| !p.exists()) {
            warnings.push(format!("Config file {} does not exist", path.display()));
        }

        let mut config = match candidates.into_iter().find(|p| p.exists()) {
            Some(path) => match Self::from_file(&path) {
                Ok(config) => {
                    source = Some(path);
                    config
                }
                Err(e) => {
                    warnings.push(format!("{}, using defaults", e));
                    Self::default()
                }
            },
            None => Self::default(),
        };

        warnings.extend(config.apply_overrides_from(|key| std::env::var(key).ok()));
        warnings.extend(config.sanitize());

        LoadedConfig {
            config,
            source,
            warnings,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn candidate_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
        if let Some(path) = explicit {
            return vec![path.to_path_buf()];
        }

        let mut paths = Vec::new();
        if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
            paths.push(PathBuf::from(env_path));
        }
        paths.push(PathBuf::from("mcp-adb.toml"));
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("mcp-adb").join("config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".mcp-adb.toml"));
        }
        paths
    }

    /// Apply environment-style overrides from `lookup`, returning warnings
    /// for values that were ignored
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(path) = lookup(ENV_ADB_PATH).filter(|p| !p.trim().is_empty()) {
            self.adb.path = path;
        }

        if let Some(raw) = lookup(ENV_TIMEOUT) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.adb.timeout_secs = secs,
                _ => warnings.push(format!(
                    "Ignoring {}={:?}: not a positive integer",
                    ENV_TIMEOUT, raw
                )),
            }
        }

        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|l| !l.trim().is_empty()) {
            self.server.log_level = level.trim().to_ascii_lowercase();
        }

        warnings
    }

    /// Drop unknown or repeated tool names and repair out-of-range limits
    pub fn sanitize(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();
        let mut seen = Vec::new();

        self.tools.enabled.retain(|name| {
            if !TOOL_NAMES.contains(&name.as_str()) {
                warnings.push(format!("Unknown tool '{}' in tools.enabled, ignoring", name));
                return false;
            }
            if seen.contains(name) {
                return false;
            }
            seen.push(name.clone());
            true
        });

        if self.adb.timeout_secs == 0 {
            warnings.push("adb.timeout_secs must be positive, using the default".to_string());
            self.adb.timeout_secs = default_timeout();
        }
        if self.adb.retry_attempts == 0 {
            self.adb.retry_attempts = 1;
        }
        if self.limits.logcat_max_lines == 0 {
            self.limits.logcat_max_lines = default_logcat_max_lines();
        }
        self.limits.logcat_default_lines = self
            .limits
            .logcat_default_lines
            .clamp(1, self.limits.logcat_max_lines);
        self.server.log_level = self.server.log_level.trim().to_ascii_lowercase();

        warnings
    }

    pub fn is_tool_enabled(&self, name: &str) -> bool {
        self.tools.enabled.iter().any(|t| t == name)
    }
}
