use crate::schema::SchemaError;
use thiserror::Error;

/// Errors that can occur during tool execution.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("duplicate tool name: {0}")]
    Duplicate(String),
    #[error("invalid arguments for tool \"{tool}\": {source}")]
    InvalidInput {
        tool: String,
        #[source]
        source: SchemaError,
    },
    #[error("invalid output from tool \"{tool}\": {source}")]
    InvalidOutput {
        tool: String,
        #[source]
        source: SchemaError,
    },
    #[error("execution failed: {0}")]
    Execution(String),
    #[error(transparent)]
    Remote(#[from] mcp::Error),
}
