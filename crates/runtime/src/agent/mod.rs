//! The decision loop and the prompts it sends.

mod history;
pub mod prompt;
mod runner;

pub use history::HistoryEntry;
pub use runner::{Agent, AgentConfig, RetryPolicy, RunResult};

/// The reserved choice that ends a turn with a reply.
pub const RESPOND: &str = "respond";
