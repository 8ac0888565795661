//! Session termination.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::schema::Schema;
use crate::tools::{Tool, ToolError, ToolResult};

/// Shared flag a host polls between runs to end the session.
///
/// Setting it never interrupts the turn in progress.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Lets the model end the session once the user is done.
pub struct StopTool {
    signal: StopSignal,
    input_schema: Schema,
    output_schema: Schema,
}

impl StopTool {
    pub fn new(signal: StopSignal) -> Self {
        Self {
            signal,
            input_schema: Schema::object(),
            output_schema: Schema::object().field(
                "stopped",
                Schema::boolean().describe("Whether the session will end after this turn"),
            ),
        }
    }
}

#[async_trait]
impl Tool for StopTool {
    fn name(&self) -> &str {
        "stop"
    }

    fn display_name(&self) -> &str {
        "Stop"
    }

    fn description(&self) -> &str {
        "End the conversation after this turn. Use it when the user says they are done, \
         says goodbye, or asks you to stop listening. Choose \"respond\" afterwards to say goodbye."
    }

    fn input_schema(&self) -> &Schema {
        &self.input_schema
    }

    fn output_schema(&self) -> &Schema {
        &self.output_schema
    }

    async fn run(&self, _args: Value) -> Result<ToolResult, ToolError> {
        self.signal.request();
        Ok(ToolResult::success(
            self.parse_output(json!({ "stopped": true }))?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::execute;

    #[tokio::test]
    async fn sets_the_shared_signal() {
        let signal = StopSignal::new();
        let tool = StopTool::new(signal.clone());
        assert!(!signal.is_requested());

        let result = execute(&tool, json!({})).await;
        assert_eq!(result, ToolResult::success(json!({"stopped": true})));
        assert!(signal.is_requested());

        signal.reset();
        assert!(!signal.is_requested());
    }
}
