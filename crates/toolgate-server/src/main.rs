//! MCP server entry point for toolgate.
//!
//! Serves the MCP protocol on stdio; logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! toolgate --root ~/projects/site --allow-ext log
//! ```
//!
//! Or configure in an MCP client:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "toolgate": {
//!       "command": "toolgate",
//!       "args": ["--root", "/path/to/project"],
//!       "env": { "GITHUB_TOKEN": "ghp_xxx" }
//!     }
//!   }
//! }
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use rmcp::ServiceExt;
use rmcp::transport::stdio;
use toolgate_server::{Cli, LogFormat, ToolgateService};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    tracing::info!("Starting toolgate v{}", env!("CARGO_PKG_VERSION"));

    let dispatcher = cli
        .dispatcher()
        .context("failed to configure providers")?;
    for (provider, healthy) in dispatcher.health() {
        if healthy {
            tracing::info!(provider = %provider, "provider ready");
        } else {
            tracing::warn!(provider = %provider, "provider registered without credentials");
        }
    }

    // stdout carries the MCP protocol
    let service = ToolgateService::new(dispatcher).serve(stdio()).await?;
    service.waiting().await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,toolgate_server=debug"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .init(),
    }
}
