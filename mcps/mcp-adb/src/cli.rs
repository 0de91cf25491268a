//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;

use crate::config::{Config, ENV_CONFIG_PATH};

#[derive(Debug, Parser)]
#[command(name = "mcp-adb")]
#[command(version, about = "MCP server for Android Debug Bridge device management")]
pub struct Args {
    /// Config file (default: ./mcp-adb.toml, then the user config directory)
    #[arg(short, long, env = ENV_CONFIG_PATH)]
    pub config: Option<PathBuf>,

    /// adb executable to run
    #[arg(long)]
    pub adb_path: Option<String>,

    /// Per-command timeout in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Log level for this server (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Answer from canned device responses instead of running adb
    #[arg(long)]
    pub mock: bool,

    /// Print a device report and exit instead of serving MCP
    #[arg(long)]
    pub demo: bool,
}

impl Args {
    /// Flags win over both the config file and the environment
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(path) = &self.adb_path {
            config.adb.path = path.clone();
        }
        if let Some(secs) = self.timeout {
            config.adb.timeout_secs = secs;
        }
        if let Some(level) = &self.log_level {
            config.server.log_level = level.to_ascii_lowercase();
        }
    }
}
