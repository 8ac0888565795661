//! Tools: the contract, the registry, remote proxies and discovery.

pub mod discovery;
pub mod errors;
mod registry;
mod remote;
mod stop;
mod tool;
mod types;

pub use discovery::{DEFAULT_DISCOVERY_CONCURRENCY, discover_tools, tools_for_server};
pub use errors::ToolError;
pub use registry::ToolRegistry;
pub use remote::{RemoteTool, display_name_for, translate_schema};
pub use stop::{StopSignal, StopTool};
pub use tool::{Invocation, Tool, execute, invoke};
pub use types::{ToolExecution, ToolResult};
