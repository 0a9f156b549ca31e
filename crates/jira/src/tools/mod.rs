// Jira tools exposed over MCP

mod issue;
mod search;
mod transitions;
mod view;
mod worklog;

pub use issue::{GetCommentsTool, GetIssueTool};
pub use search::SearchJqlTool;
pub use transitions::{GetTransitionsTool, TransitionIssueTool};
pub use worklog::AddWorklogTool;

use crate::client::JiraConnection;
use std::sync::Arc;
use toolrelay_mcp::tools::RegistryError;
use toolrelay_mcp::ToolRegistry;

/// Register the six Jira tools, all sharing one lazily-configured client.
pub fn register_all(
    registry: &mut ToolRegistry,
    connection: Arc<JiraConnection>,
) -> Result<(), RegistryError> {
    registry.register(Arc::new(AddWorklogTool::new(connection.clone())))?;
    registry.register(Arc::new(SearchJqlTool::new(connection.clone())))?;
    registry.register(Arc::new(GetIssueTool::new(connection.clone())))?;
    registry.register(Arc::new(GetCommentsTool::new(connection.clone())))?;
    registry.register(Arc::new(GetTransitionsTool::new(connection.clone())))?;
    registry.register(Arc::new(TransitionIssueTool::new(connection)))?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::client::JiraConnection;
    use crate::config::{API_TOKEN_VAR, BASE_URL_VAR, EMAIL_VAR};
    use std::sync::Arc;
    use toolrelay_mcp::ConfigSource;
    use wiremock::MockServer;

    /// A connection pointed at the mock server with fixed credentials.
    pub fn connection(server: &MockServer) -> Arc<JiraConnection> {
        Arc::new(JiraConnection::new(ConfigSource::from_pairs([
            (BASE_URL_VAR, server.uri()),
            (EMAIL_VAR, "me@example.com".to_string()),
            (API_TOKEN_VAR, "tok".to_string()),
        ])))
    }
}
