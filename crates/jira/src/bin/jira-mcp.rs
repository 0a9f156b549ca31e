use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use toolrelay_jira::JiraConnection;
use toolrelay_mcp::cli::CommonArgs;
use toolrelay_mcp::protocol::ServerInfo;
use toolrelay_mcp::{logging, ConfigSource, McpServer, ToolRegistry};

#[derive(Parser, Debug)]
#[command(name = "jira-mcp")]
#[command(about = "MCP server for Jira Cloud worklogs, issues, comments and transitions", long_about = None)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.common.log_format);

    let source = ConfigSource::load(args.common.config.as_deref())?;

    let mut registry = ToolRegistry::new();
    toolrelay_jira::register_all(&mut registry, Arc::new(JiraConnection::new(source)))
        .context("Failed to register Jira tools")?;

    let server = McpServer::new(
        ServerInfo::new("jira-mcp-server", env!("CARGO_PKG_VERSION")),
        registry,
    );

    tokio::select! {
        result = server.serve_stdio() => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted, shutting down"),
    }

    Ok(())
}
