// MCP (Model Context Protocol) plumbing shared by every toolrelay adapter:
// protocol types, the tool registry, the dispatcher boundary and the stdio server.

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod format;
pub mod framing;
pub mod logging;
pub mod protocol;
pub mod server;
pub mod tools;

pub use config::{ConfigError, ConfigSource};
pub use dispatcher::Dispatcher;
pub use server::McpServer;
pub use tools::{Tool, ToolRegistry};
