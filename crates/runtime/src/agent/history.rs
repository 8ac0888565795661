use serde::{Deserialize, Serialize};

use crate::tools::ToolExecution;

/// One entry of a conversation.
///
/// Each run appends a `User` entry and then exactly one `Assistant` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HistoryEntry {
    User {
        content: String,
    },
    #[serde(rename_all = "camelCase")]
    Assistant {
        tools: Vec<ToolExecution>,
        response: String,
        is_error: bool,
    },
}

impl HistoryEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    pub fn assistant(tools: Vec<ToolExecution>, response: impl Into<String>, is_error: bool) -> Self {
        Self::Assistant {
            tools,
            response: response.into(),
            is_error,
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Self::User { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_type_tag() {
        let user = serde_json::to_value(HistoryEntry::user("hi")).unwrap();
        assert_eq!(user, json!({"type": "user", "content": "hi"}));

        let tool = ToolExecution {
            name: "read_file".into(),
            display_name: "Read File".into(),
            input: json!({"path": "a"}),
            success: true,
            output: json!("text"),
        };
        let assistant =
            serde_json::to_value(HistoryEntry::assistant(vec![tool], "Done.", false)).unwrap();
        assert_eq!(
            assistant,
            json!({
                "type": "assistant",
                "tools": [{
                    "name": "read_file",
                    "displayName": "Read File",
                    "input": {"path": "a"},
                    "success": true,
                    "output": "text"
                }],
                "response": "Done.",
                "isError": false
            })
        );

        let back: HistoryEntry = serde_json::from_value(assistant).unwrap();
        assert!(!back.is_user());
    }
}
