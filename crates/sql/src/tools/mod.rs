// Database tools exposed over MCP; the same five for both backends

mod catalog;
mod query;

pub use catalog::{DescribeTableTool, ListSchemasTool, ListTablesTool};
pub use query::{ExecuteSelectQueryTool, ExplainQueryTool};

use crate::session::SessionHandle;
use std::sync::Arc;
use toolrelay_mcp::tools::RegistryError;
use toolrelay_mcp::ToolRegistry;

pub fn register_all(
    registry: &mut ToolRegistry,
    handle: Arc<SessionHandle>,
) -> Result<(), RegistryError> {
    registry.register(Arc::new(ExecuteSelectQueryTool::new(handle.clone())))?;
    registry.register(Arc::new(DescribeTableTool::new(handle.clone())))?;
    registry.register(Arc::new(ExplainQueryTool::new(handle.clone())))?;
    registry.register(Arc::new(ListTablesTool::new(handle.clone())))?;
    registry.register(Arc::new(ListSchemasTool::new(handle)))?;
    Ok(())
}
