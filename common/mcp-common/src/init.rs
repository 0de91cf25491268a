//! Tracing setup shared by MCP servers
//!
//! stdout belongs to the MCP transport, so every log line goes to stderr.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable single-line output
    #[default]
    Text,
    /// One JSON object per line, for log aggregation
    Json,
}

impl LogFormat {
    /// Parse a format name, falling back to text for anything unrecognised
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }

    /// `LOG_FORMAT=json` in the environment forces JSON regardless of config
    fn resolve(self) -> Self {
        match std::env::var("LOG_FORMAT") {
            Ok(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => self,
        }
    }
}

/// Build the filter directive for a crate at the given level
///
/// Levels are lower-cased so `INFO` from older config files still parses.
pub fn level_directive(crate_name: &str, level: &str) -> String {
    format!("{}={}", crate_name, level.trim().to_ascii_lowercase())
}

/// Initialize tracing for an MCP server binary
///
/// `RUST_LOG` directives are honoured first; `level` is added for
/// `crate_name` on top of them. Calling this twice returns an error instead
/// of panicking, so demo runs and tests can share a process.
pub fn init_tracing(crate_name: &str, level: &str, format: LogFormat) -> anyhow::Result<()> {
    let filter =
        EnvFilter::from_default_env().add_directive(level_directive(crate_name, level).parse()?);

    let registry = tracing_subscriber::registry().with(filter);

    match format.resolve() {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init()?,
    }

    Ok(())
}

/// Serve `server` over stdio until the client disconnects
pub async fn serve_stdio<S>(server: S, name: &str) -> anyhow::Result<()>
where
    S: rmcp::ServerHandler,
{
    use rmcp::ServiceExt;

    tracing::info!("Starting {} MCP Server", name);

    let service = server.serve(rmcp::transport::stdio()).await?;

    tracing::info!("Server running, waiting for requests...");

    service.waiting().await?;

    tracing::info!("Server shutting down");
    Ok(())
}
