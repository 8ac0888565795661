//! Local proxies for tools hosted on remote MCP servers.

use std::sync::Arc;

use async_trait::async_trait;
use mcp::{Client, InputSchema};
use serde_json::{Value, json};

use crate::schema::Schema;
use crate::tools::{Tool, ToolError, ToolResult};

/// Fallback error text when a failing remote tool says nothing.
const REMOTE_FAILURE: &str = "Tool execution failed";

/// A remote tool exposed through the local [`Tool`] contract.
pub struct RemoteTool {
    client: Arc<Client>,
    name: String,
    display_name: String,
    description: String,
    input_schema: Schema,
    output_schema: Schema,
}

impl RemoteTool {
    /// Wrap a definition returned by `tools/list` on `client`.
    pub fn new(client: Arc<Client>, def: mcp::Tool) -> Self {
        let description = def
            .description
            .unwrap_or_else(|| format!("MCP tool: {}", def.name));
        Self {
            display_name: display_name_for(&def.name),
            input_schema: translate_schema(&def.input_schema),
            output_schema: Schema::object().field(
                "content",
                Schema::array(
                    Schema::object()
                        .field("type", Schema::string())
                        .optional_field("text", Schema::string()),
                ),
            ),
            name: def.name,
            description,
            client,
        }
    }
}

#[async_trait]
impl Tool for RemoteTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> &Schema {
        &self.input_schema
    }

    fn output_schema(&self) -> &Schema {
        &self.output_schema
    }

    async fn run(&self, args: Value) -> Result<ToolResult, ToolError> {
        let result = self.client.call_tool(&self.name, args).await?;
        let text = result.joined_text();

        if result.is_error {
            let message = if text.is_empty() {
                REMOTE_FAILURE.to_string()
            } else {
                text
            };
            return Ok(ToolResult::failure(message));
        }

        let content = serde_json::to_value(&result.content)
            .map_err(|e| ToolError::Execution(format!("serialize result: {e}")))?;
        Ok(ToolResult::success(json!({
            "result": text,
            "content": content,
        })))
    }
}

/// `read_file` → `Read File`, `get-page-title` → `Get Page Title`.
pub fn display_name_for(name: &str) -> String {
    name.split(['-', '_'])
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Translate a remote parameter declaration into a local schema.
///
/// Unrecognized property types accept any value rather than failing, since
/// remote servers are outside our control.
pub fn translate_schema(input: &InputSchema) -> Schema {
    input
        .properties
        .iter()
        .fold(Schema::object(), |schema, (name, property)| {
            let field = translate_property(property);
            if input.required.iter().any(|r| r == name) {
                schema.field(name.clone(), field)
            } else {
                schema.optional_field(name.clone(), field)
            }
        })
}

fn translate_property(property: &Value) -> Schema {
    let schema = match property.get("type").and_then(Value::as_str) {
        Some("string") => Schema::string(),
        Some("number") => Schema::number(),
        Some("integer") => Schema::integer(),
        Some("boolean") => Schema::boolean(),
        Some("array") => Schema::array(Schema::any()),
        Some("object") => Schema::record(),
        _ => Schema::any(),
    };
    match property.get("description").and_then(Value::as_str) {
        Some(description) => schema.describe(description),
        None => schema,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeMcpServer;
    use crate::tools::execute;
    use mcp::ServerConfig;

    #[test]
    fn display_names_are_title_cased() {
        assert_eq!(display_name_for("read_file"), "Read File");
        assert_eq!(display_name_for("get-page-title"), "Get Page Title");
        assert_eq!(display_name_for("search"), "Search");
    }

    #[test]
    fn translates_declared_types() {
        let input: InputSchema = serde_json::from_value(json!({
            "type": "object",
            "properties": {
                "path": {"type": "string", "description": "File path"},
                "limit": {"type": "integer"},
                "ratio": {"type": "number"},
                "recursive": {"type": "boolean"},
                "globs": {"type": "array", "items": {"type": "string"}},
                "options": {"type": "object"},
                "mystery": {"type": "tuple"}
            },
            "required": ["path"]
        }))
        .unwrap();
        let schema = translate_schema(&input);

        let rendered = schema.to_json_schema();
        assert_eq!(rendered["required"], json!(["path"]));
        assert_eq!(
            rendered["properties"]["path"],
            json!({"type": "string", "description": "File path"})
        );
        assert_eq!(rendered["properties"]["limit"], json!({"type": "integer"}));
        assert_eq!(rendered["properties"]["globs"]["type"], "array");
        assert_eq!(rendered["properties"]["options"], json!({"type": "object"}));
        assert_eq!(rendered["properties"]["mystery"], json!({}));

        assert!(schema.validate(&json!({"path": "a", "mystery": [1, "x"]})).is_ok());
        assert!(schema.validate(&json!({"limit": 3})).is_err());
        assert!(schema.validate(&json!({"path": "a", "limit": 2.5})).is_err());
    }

    #[tokio::test]
    async fn proxies_calls_to_the_server() {
        let server = FakeMcpServer::new(&["echo"]);
        let url = server.spawn().await;
        let client = Arc::new(Client::new(ServerConfig::new(url)).unwrap());
        let def = client.list_tools().await.unwrap().remove(0);
        let tool = RemoteTool::new(client, def);

        assert_eq!(tool.display_name(), "Echo");
        assert_eq!(tool.description(), "Remote echo tool");

        let result = execute(&tool, json!({"text": "hello"})).await;
        assert!(result.success);
        assert_eq!(result.output["result"], "echo: hello");
        assert_eq!(
            result.output["content"],
            json!([{"type": "text", "text": "echo: hello"}])
        );
    }

    #[tokio::test]
    async fn content_blocks_pass_through_unchanged() {
        let server = FakeMcpServer::new(&["fetch"]);
        let url = server.spawn().await;
        let client = Arc::new(Client::new(ServerConfig::new(url)).unwrap());
        let def = client.list_tools().await.unwrap().remove(0);
        let tool = RemoteTool::new(client, def);

        let result = execute(&tool, json!({"text": "x"})).await;
        assert!(result.success);
        assert_eq!(result.output["result"], "x");
        assert_eq!(
            result.output["content"],
            json!([
                {"type": "resource", "resource": {"uri": "file:///a.txt", "text": "hi"}},
                {"type": "text", "text": "x", "annotations": {"priority": 1}}
            ])
        );
    }

    #[tokio::test]
    async fn remote_error_flag_becomes_failure() {
        let server = FakeMcpServer::new(&["explode", "sulk"]);
        let url = server.spawn().await;
        let client = Arc::new(Client::new(ServerConfig::new(url)).unwrap());
        let mut defs = client.list_tools().await.unwrap();
        let sulk = RemoteTool::new(client.clone(), defs.remove(1));
        let explode = RemoteTool::new(client, defs.remove(0));

        let result = execute(&explode, json!({"text": "x"})).await;
        assert_eq!(result, ToolResult::failure("explode failed\nstack trace"));

        let result = execute(&sulk, json!({"text": "x"})).await;
        assert_eq!(result, ToolResult::failure(REMOTE_FAILURE));
    }

    #[tokio::test]
    async fn transport_faults_become_failures() {
        let server = FakeMcpServer::new(&["echo"]);
        let url = server.spawn().await;
        let client = Arc::new(Client::new(ServerConfig::new(url)).unwrap());
        let def = client.list_tools().await.unwrap().remove(0);
        let tool = RemoteTool::new(client, def);

        server.fail_with_status(503);
        let result = execute(&tool, json!({"text": "x"})).await;
        assert!(result.is_error());
        assert!(result.error_message().unwrap().contains("503"));
    }
}
