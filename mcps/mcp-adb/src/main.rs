//! ADB MCP Server
//!
//! Android device management over MCP: device listing, app install and
//! uninstall, file push and pull, shell, logcat and screen capture.
//!
//! # Usage
//!
//! Run directly: `mcp-adb` (needs `adb` on PATH, or `--adb-path`)
//!
//! Or configure in `.mcp.json`:
//! ```json
//! { "mcpServers": { "adb": { "command": "./mcp-adb" } } }
//! ```

use clap::Parser;
use mcp_common::{init_tracing, LogFormat};

use mcp_adb::cli::Args;
use mcp_adb::{demo, Adb, AdbMcpServer, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let loaded = Config::load(args.config.as_deref());
    let mut config = loaded.config;
    args.apply_to(&mut config);

    init_tracing(
        "mcp_adb",
        &config.server.log_level,
        LogFormat::parse(&config.server.log_format),
    )?;

    for warning in &loaded.warnings {
        tracing::warn!("{}", warning);
    }
    match &loaded.source {
        Some(path) => tracing::info!("Loaded config from {}", path.display()),
        None => tracing::info!("Using default configuration"),
    }

    let adb = if args.mock {
        tracing::info!("Using mock adb backend");
        Adb::mock(&config)
    } else {
        Adb::new(&config)
    };
    let server = AdbMcpServer::new(config, adb);

    if args.demo {
        print!("{}", demo::run(&server).await?);
        return Ok(());
    }

    mcp_common::serve_stdio(server, "mcp-adb").await
}
