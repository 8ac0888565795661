//! MCP (Model Context Protocol) client library.
//!
//! This crate speaks JSON-RPC 2.0 over HTTP POST to remote MCP servers. A
//! [`Client`] is one session with one server: it performs the
//! `initialize` / `notifications/initialized` handshake once, then lists and
//! calls tools. Responses may be plain JSON or a single SSE `data:` line.
//!
//! # Example
//!
//! ```no_run
//! use mcp::{Client, ServerConfig};
//!
//! # async fn example() -> mcp::Result<()> {
//! let config = ServerConfig::new("http://localhost:8931/mcp")
//!     .with_name("browser")
//!     .with_header("Authorization", "Bearer token");
//!
//! let client = Client::new(config)?;
//! for tool in client.list_tools().await? {
//!     println!("Tool: {}", tool.name);
//! }
//!
//! let result = client
//!     .call_tool("navigate", serde_json::json!({"url": "https://example.com"}))
//!     .await?;
//! println!("{}", result.joined_text());
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod protocol;

pub use client::{Client, SESSION_HEADER, ServerConfig};
pub use error::{Error, Result};
pub use protocol::{
    CallToolParams, CallToolResult, ClientCapabilities, ClientInfo, InitializeParams,
    InputSchema, JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
    ListToolsResult, PROTOCOL_VERSION, RequestId, Tool, ToolContent, decode_body,
};
