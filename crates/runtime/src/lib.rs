//! Parley runtime: the agent decision loop and its tools.
//!
//! This crate turns a user's instruction into either a reply or a series of
//! tool executions by repeatedly consulting a language model.
//!
//! # Overview
//!
//! - **Agent**: owns the conversation history and runs the decision loop.
//!   Each turn asks the model to pick `respond` or a tool, asks for the tool's
//!   arguments, executes it, and loops until the model responds.
//! - **Tool**: a named capability with schema-checked input and output.
//!   Local tools implement [`Tool`] directly; remote ones are proxied over
//!   MCP by [`RemoteTool`].
//! - **TextGenerator**: the language-model interface. [`OpenAiBackend`]
//!   implements it for OpenAI-compatible providers.
//!
//! # Example
//!
//! ```no_run
//! use runtime::{Agent, OpenAiBackend, ToolRegistry, discover_tools};
//! use mcp::ServerConfig;
//!
//! # async fn example() -> Result<(), runtime::ToolError> {
//! let backend = OpenAiBackend::builder("gpt-4o-mini").api_key("sk-...").build();
//!
//! let servers = [ServerConfig::new("http://localhost:3000/mcp")];
//! let mut tools = ToolRegistry::new();
//! for tool in discover_tools(&servers, runtime::DEFAULT_DISCOVERY_CONCURRENCY).await {
//!     tools.register(tool)?;
//! }
//!
//! let mut agent = Agent::new(backend, tools);
//! let result = agent.run("What's on my calendar today?").await;
//! println!("{}", result.response);
//! # Ok(())
//! # }
//! ```

pub mod agent;
mod backend;
pub mod boundary;
mod error;
pub mod llm;
pub mod schema;
pub mod tools;

#[cfg(test)]
mod testing;

pub use agent::{Agent, AgentConfig, HistoryEntry, RESPOND, RetryPolicy, RunResult};
pub use backend::{OPENAI_BASE_URL, OpenAiBackend, OpenAiBackendBuilder};
pub use error::{Error, Result};
pub use llm::{GenerateRequest, GenerateResponse, JsonResponse, ModelError, TextGenerator};
pub use schema::{Schema, SchemaError};
pub use tools::{
    DEFAULT_DISCOVERY_CONCURRENCY, RemoteTool, StopSignal, StopTool, Tool, ToolError,
    ToolExecution, ToolRegistry, ToolResult, discover_tools, execute,
};
