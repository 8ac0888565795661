//! The tool contract.

use async_trait::async_trait;
use serde_json::Value;

use crate::boundary;
use crate::schema::Schema;
use crate::tools::{ToolError, ToolResult};

/// A capability the agent can invoke, local or remote.
///
/// This is the boundary between the decision loop and side effects.
/// Callers go through [`execute`] or [`invoke`], never [`Tool::run`]
/// directly, so that arguments are validated and failures are contained.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Identifier the model selects the tool by.
    fn name(&self) -> &str;

    /// Label shown in execution traces.
    fn display_name(&self) -> &str;

    /// Usage guidance embedded in prompts.
    fn description(&self) -> &str;

    fn input_schema(&self) -> &Schema;

    fn output_schema(&self) -> &Schema;

    /// Run with arguments that already passed [`Tool::input_schema`].
    async fn run(&self, args: Value) -> Result<ToolResult, ToolError>;

    /// The input schema as JSON Schema.
    fn input_json_schema(&self) -> Value {
        self.input_schema().to_json_schema()
    }

    /// Validate a raw output value against [`Tool::output_schema`].
    fn parse_output(&self, output: Value) -> Result<Value, ToolError> {
        self.output_schema()
            .validate(&output)
            .map_err(|source| ToolError::InvalidOutput {
                tool: self.name().to_string(),
                source,
            })
    }
}

/// A finished execution and the arguments it used.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// The validated arguments, or the raw ones if validation failed.
    pub input: Value,
    pub result: ToolResult,
}

/// Validate `args` and run `tool`, containing every failure.
pub async fn invoke(tool: &dyn Tool, args: Value) -> Invocation {
    let validated = tool.input_schema().validate(&args);
    let input = validated.clone().unwrap_or(args);

    let result = boundary::contain(
        async {
            let args = validated.map_err(|source| ToolError::InvalidInput {
                tool: tool.name().to_string(),
                source,
            })?;
            tool.run(args).await
        },
        ToolResult::failure,
    )
    .await;

    if let Some(error) = result.error_message() {
        tracing::debug!(tool = tool.name(), error, "tool execution failed");
    }

    Invocation { input, result }
}

/// Validate `args` and run `tool`. Never fails; faults become
/// `success: false` results.
pub async fn execute(tool: &dyn Tool, args: Value) -> ToolResult {
    invoke(tool, args).await.result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FnTool;
    use serde_json::json;

    fn shout() -> FnTool {
        FnTool::new(
            "shout",
            Schema::object().field("text", Schema::string()),
            |args| {
                let text = args["text"].as_str().unwrap_or_default();
                if text == "boom" {
                    return Err(ToolError::Execution("cannot shout that".into()));
                }
                if text == "panic" {
                    panic!("vocal cords snapped");
                }
                Ok(ToolResult::success(json!({ "text": text.to_uppercase() })))
            },
        )
    }

    #[tokio::test]
    async fn runs_with_valid_arguments() {
        let tool = shout();
        let invocation = invoke(&tool, json!({"text": "hey", "ignored": true})).await;
        assert_eq!(invocation.input, json!({"text": "hey"}));
        assert_eq!(invocation.result, ToolResult::success(json!({"text": "HEY"})));
        assert_eq!(tool.calls(), 1);
    }

    #[tokio::test]
    async fn invalid_arguments_skip_the_tool() {
        let tool = shout();
        let result = execute(&tool, json!({"text": 5})).await;
        assert!(result.is_error());
        assert_eq!(
            result.error_message(),
            Some("invalid arguments for tool \"shout\": $.text: expected string, found number")
        );
        assert_eq!(tool.calls(), 0);
    }

    #[tokio::test]
    async fn errors_become_failures() {
        let result = execute(&shout(), json!({"text": "boom"})).await;
        assert_eq!(result, ToolResult::failure("execution failed: cannot shout that"));
    }

    #[tokio::test]
    async fn panics_become_failures() {
        let result = execute(&shout(), json!({"text": "panic"})).await;
        assert_eq!(
            result.error_message(),
            Some("panicked: vocal cords snapped")
        );
    }

    #[test]
    fn parse_output_checks_output_schema() {
        let tool = shout().with_output_schema(Schema::object().field("text", Schema::string()));
        assert!(tool.parse_output(json!({"text": "ok"})).is_ok());
        let err = tool.parse_output(json!({"text": 1})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidOutput { .. }));
    }
}
