//! Tool-related types.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Outcome of a tool execution.
///
/// Failures carry `{"error": message}` as their output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    pub output: Value,
}

impl ToolResult {
    /// Create a successful result.
    pub fn success(output: Value) -> Self {
        Self {
            success: true,
            output,
        }
    }

    /// Create a failed result.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: json!({ "error": message.into() }),
        }
    }

    /// Whether this is an error.
    pub fn is_error(&self) -> bool {
        !self.success
    }

    /// The error message of a failed result.
    pub fn error_message(&self) -> Option<&str> {
        if self.success {
            return None;
        }
        self.output.get("error").and_then(Value::as_str)
    }
}

/// A record of one tool execution within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolExecution {
    pub name: String,
    pub display_name: String,
    /// Arguments the tool ran with.
    pub input: Value,
    pub success: bool,
    pub output: Value,
}
