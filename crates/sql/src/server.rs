// Process wiring shared by the mysql-mcp and postgres-mcp binaries

use crate::session::SessionHandle;
use crate::tools::register_all;
use anyhow::{Context, Result};
use std::sync::Arc;
use toolrelay_mcp::protocol::ServerInfo;
use toolrelay_mcp::{McpServer, ToolRegistry};
use tracing::info;

/// Serve the database tools on stdio until EOF or Ctrl-C, then close the
/// session if one was opened.
pub async fn run(handle: SessionHandle) -> Result<()> {
    let handle = Arc::new(handle);

    let mut registry = ToolRegistry::new();
    register_all(&mut registry, handle.clone()).context("Failed to register database tools")?;

    let server = McpServer::new(
        ServerInfo::new(handle.dialect().server_name(), env!("CARGO_PKG_VERSION")),
        registry,
    );

    let result = tokio::select! {
        result = server.serve_stdio() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
            Ok(())
        }
    };

    handle.close().await;
    result
}
