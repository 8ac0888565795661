//! Tool discovery across remote MCP servers.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use mcp::{Client, ServerConfig};

use crate::tools::{RemoteTool, Tool};

/// How many servers are queried at once unless configured otherwise.
pub const DEFAULT_DISCOVERY_CONCURRENCY: usize = 16;

/// Handshake with one server and wrap each of its tools.
pub async fn tools_for_server(config: ServerConfig) -> mcp::Result<Vec<Arc<dyn Tool>>> {
    let client = Arc::new(Client::new(config)?);
    let defs = client.list_tools().await?;
    Ok(defs
        .into_iter()
        .map(|def| Arc::new(RemoteTool::new(client.clone(), def)) as Arc<dyn Tool>)
        .collect())
}

/// Discover tools on every server, at most `concurrency` at a time.
///
/// A server that fails contributes nothing; the failure is logged and the
/// other servers are unaffected. Results keep configuration order.
pub async fn discover_tools(configs: &[ServerConfig], concurrency: usize) -> Vec<Arc<dyn Tool>> {
    let per_server: Vec<Vec<Arc<dyn Tool>>> = stream::iter(configs.iter().cloned())
        .map(|config| async move {
            let label = config.label().to_string();
            match tools_for_server(config).await {
                Ok(tools) => {
                    tracing::info!(server = %label, count = tools.len(), "discovered remote tools");
                    tools
                }
                Err(error) => {
                    tracing::warn!(server = %label, %error, "failed to get tools from MCP server");
                    Vec::new()
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    per_server.into_iter().flatten().collect()
}
