//! Prompt and response-shape builders.
//!
//! Everything here is a pure function of its arguments, including the
//! clock, which is captured once in [`PromptContext`].

use chrono::{DateTime, Local};
use serde_json::Value;

use super::{HistoryEntry, RESPOND};
use crate::llm::JsonResponse;
use crate::schema::Schema;
use crate::tools::{Tool, ToolExecution, ToolRegistry};

/// Facts appended to every system prompt.
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub now: DateTime<Local>,
    pub user_name: Option<String>,
}

impl PromptContext {
    pub fn now(user_name: Option<String>) -> Self {
        Self {
            now: Local::now(),
            user_name,
        }
    }

    fn render(&self) -> String {
        let mut out = String::from("## Context\n");
        if let Some(name) = &self.user_name {
            out.push_str(&format!(
                "The user's name is \"{name}\". Sign anything written on their behalf with this name.\n"
            ));
        }
        out.push_str(&format!(
            "The current date is {} at {}.\n",
            self.now.format("%B %-d, %Y (%A)"),
            self.now.format("%-I:%M %p (UTC%:z)"),
        ));
        out
    }
}

pub fn decision_system_prompt(tools: &ToolRegistry, context: &PromptContext) -> String {
    let descriptions: String = tools
        .iter()
        .map(|t| format!("- {}: {}\n", t.name(), t.description()))
        .collect();
    let choices = std::iter::once(RESPOND)
        .chain(tools.names())
        .map(|name| format!("\"{name}\""))
        .collect::<Vec<_>>()
        .join(" | ");

    format!(
        "You are a helpful assistant that decides how to respond to user requests.

## Available Tools
{descriptions}
## Your Task
Analyze the user's request and the conversation history, then decide what to do next.

## Response Format
Respond with JSON only:
{{
  \"reasoning\": \"Brief explanation of why you chose this action\",
  \"choice\": {choices}
}}

## Rules
- If you are not sure what the user is referring to, use a tool to gather more information.
- Use \"respond\" when you need to talk to the user or have completed their request.
- Read the tool descriptions carefully. They explain when and how to use each tool.

{}",
        context.render()
    )
}

pub fn final_system_prompt(reasoning: &str, context: &PromptContext) -> String {
    format!(
        "You are a helpful assistant that responds to the user.

You are responding to the user because: {reasoning}

## Response Format
Respond with JSON only:
{{
  \"response\": \"What you want to say to the user\"
}}

## Rules
- Be concise and helpful; your reply will be spoken aloud.
- If you just used a tool, briefly confirm what you did or ask for next steps.
- If you are answering a question, give the answer directly.

{}",
        context.render()
    )
}

pub fn tool_arguments_system_prompt(
    tool: &dyn Tool,
    reasoning: &str,
    context: &PromptContext,
) -> String {
    let schema = serde_json::to_string_pretty(&tool.input_json_schema()).unwrap_or_default();
    format!(
        "You are a helpful assistant. You need to provide arguments for the \"{}\" tool.

The reason for calling this tool is: {reasoning}

## Tool Description
{}

## Parameters Schema
{schema}

## Response Format
Respond with JSON matching the parameters schema above.

## Rules
- Provide all required parameters.
- Use appropriate values based on the conversation context.

{}",
        tool.name(),
        tool.description(),
        context.render()
    )
}

/// Render prior turns, oldest first, separated by blank lines.
pub fn format_history(history: &[HistoryEntry]) -> String {
    history
        .iter()
        .map(|entry| match entry {
            HistoryEntry::User { content } => format!("User: {content}"),
            HistoryEntry::Assistant {
                tools, response, ..
            } => {
                if tools.is_empty() {
                    return format!("Assistant: {response}");
                }
                let used = tools
                    .iter()
                    .map(|t| format!("{}({}) → {}", t.name, t.input, t.output))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Assistant: [Tools used: {used}]\n{response}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn user_prompt(history: &[HistoryEntry], input: &str) -> String {
    if history.is_empty() {
        return format!("## Current User Input\n{input}");
    }
    format!(
        "## Conversation History\n{}\n\n## Current User Input\n{input}",
        format_history(history)
    )
}

/// The effective input after a tool ran within the same turn.
pub fn continuation(execution: &ToolExecution, request: &str) -> String {
    let outcome = if execution.success {
        "succeeded"
    } else {
        "failed"
    };
    format!(
        "Tool \"{}\" was executed and {outcome}.
Arguments: {}
Result: {}

The user's original request was: {request}

If the original request is complete, choose \"respond\" to confirm what was done. \
Only choose another tool if more actions are needed.",
        execution.name, execution.input, execution.output
    )
}

pub fn decision_response(tools: &ToolRegistry) -> JsonResponse {
    let choices = std::iter::once(RESPOND).chain(tools.names());
    let schema = Schema::object()
        .field(
            "reasoning",
            Schema::string().describe("Brief explanation of why you chose this action"),
        )
        .field(
            "choice",
            Schema::one_of(choices).describe("\"respond\" or the name of a tool to use"),
        );
    JsonResponse::new(
        "decision",
        "Which action to take next",
        schema.to_json_schema(),
    )
}

pub fn final_response() -> JsonResponse {
    let schema = Schema::object().field(
        "response",
        Schema::string().describe("What you want to say to the user"),
    );
    JsonResponse::new(
        "final_response",
        "The reply to the user",
        schema.to_json_schema(),
    )
}

pub fn tool_arguments(tool: &dyn Tool) -> JsonResponse {
    JsonResponse::new(
        "tool_arguments",
        format!("Arguments for the {} tool", tool.name()),
        tool.input_json_schema(),
    )
}

/// Extract the reply text's JSON, tolerating surrounding whitespace and a
/// Markdown code fence.
pub fn reply_json(text: &str) -> serde_json::Result<Value> {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);
    serde_json::from_str(inner.trim())
}
