//! The decision loop.

use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::prompt::{self, PromptContext};
use super::{HistoryEntry, RESPOND};
use crate::boundary;
use crate::llm::{GenerateRequest, JsonResponse, ModelError, TextGenerator};
use crate::tools::{self, Invocation, ToolExecution, ToolRegistry};
use crate::{Error, Result};

/// How model calls are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub attempts: u32,
    /// Fixed pause between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_millis(500),
        }
    }
}

/// Tuning for one [`Agent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    /// Decision rounds allowed per run. Running out ends the run with
    /// [`Error::MaxIterations`].
    pub max_iterations: usize,
    /// Applied to every structured model call.
    pub retry: RetryPolicy,
    /// Name the model signs messages with.
    pub user_name: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 16,
            retry: RetryPolicy::default(),
            user_name: None,
        }
    }
}

/// Outcome of one [`Agent::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    /// The reply, or the fault message when `is_error` is set.
    pub response: String,
    pub history: Vec<HistoryEntry>,
    pub is_error: bool,
}

#[derive(Debug, Deserialize)]
struct Decision {
    #[serde(default)]
    reasoning: String,
    choice: String,
}

#[derive(Debug, Deserialize)]
struct FinalReply {
    response: String,
}

enum Failure {
    Model(ModelError),
    Malformed(String),
}

/// A conversational agent.
///
/// Each turn alternates between asking the model what to do next and
/// running the chosen tool, until the model chooses to respond.
pub struct Agent<G> {
    id: Uuid,
    generator: G,
    tools: ToolRegistry,
    history: Vec<HistoryEntry>,
    config: AgentConfig,
}

impl<G: TextGenerator> Agent<G> {
    pub fn new(generator: G, tools: ToolRegistry) -> Self {
        Self {
            id: Uuid::new_v4(),
            generator,
            tools,
            history: Vec::new(),
            config: AgentConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Handle one user turn. Never fails; faults are reported through
    /// [`RunResult::is_error`] and recorded in the history.
    pub async fn run(&mut self, input: impl Into<String>) -> RunResult {
        self.run_with(input, &mut |_| {}).await
    }

    /// [`Agent::run`], calling `observer` after every tool execution.
    pub async fn run_with(
        &mut self,
        input: impl Into<String>,
        observer: &mut (dyn FnMut(&ToolExecution) + Send),
    ) -> RunResult {
        let input = input.into();
        let prior = self.history.clone();
        self.history.push(HistoryEntry::user(input.as_str()));

        let mut executions = Vec::new();
        let (response, is_error) = boundary::contain(
            async {
                self.turn(&prior, &input, &mut executions, observer)
                    .await
                    .map(|response| (response, false))
            },
            |fault| (fault, true),
        )
        .await;

        if is_error {
            tracing::warn!(agent = %self.id, error = %response, "agent run failed");
        }

        self.history
            .push(HistoryEntry::assistant(executions, response.as_str(), is_error));
        RunResult {
            response,
            history: self.history.clone(),
            is_error,
        }
    }

    async fn turn(
        &self,
        prior: &[HistoryEntry],
        request: &str,
        executions: &mut Vec<ToolExecution>,
        observer: &mut (dyn FnMut(&ToolExecution) + Send),
    ) -> Result<String> {
        let context = PromptContext::now(self.config.user_name.clone());
        let decision_system = prompt::decision_system_prompt(&self.tools, &context);
        let decision_response = prompt::decision_response(&self.tools);
        let mut input = request.to_string();

        for iteration in 1..=self.config.max_iterations {
            let user_prompt = prompt::user_prompt(prior, &input);
            tracing::debug!(agent = %self.id, iteration, prompt = %user_prompt, "requesting decision");

            let decision: Decision = self
                .ask(&decision_system, &user_prompt, &decision_response)
                .await?;
            tracing::info!(
                agent = %self.id,
                iteration,
                choice = %decision.choice,
                reasoning = %decision.reasoning,
                "decision"
            );

            if decision.choice == RESPOND {
                let system = prompt::final_system_prompt(&decision.reasoning, &context);
                let reply: FinalReply = self
                    .ask(&system, &user_prompt, &prompt::final_response())
                    .await?;
                return Ok(reply.response);
            }

            let tool = self
                .tools
                .get(&decision.choice)
                .ok_or_else(|| Error::UnknownTool(decision.choice.clone()))?;

            let system =
                prompt::tool_arguments_system_prompt(tool.as_ref(), &decision.reasoning, &context);
            let args: serde_json::Value = self
                .ask(&system, &user_prompt, &prompt::tool_arguments(tool.as_ref()))
                .await?;

            let Invocation { input: used, result } = tools::invoke(tool.as_ref(), args).await;
            let execution = ToolExecution {
                name: tool.name().to_string(),
                display_name: tool.display_name().to_string(),
                input: used,
                success: result.success,
                output: result.output,
            };
            observer(&execution);
            input = prompt::continuation(&execution, request);
            executions.push(execution);
        }

        Err(Error::MaxIterations(self.config.max_iterations))
    }

    /// One structured model call, retried on model errors and on replies
    /// that do not parse as `T`.
    async fn ask<T: DeserializeOwned>(
        &self,
        system: &str,
        user_prompt: &str,
        response: &JsonResponse,
    ) -> Result<T> {
        let attempts = self.config.retry.attempts.max(1);
        let mut attempt = 1;

        loop {
            let request = GenerateRequest {
                system: Some(system),
                prompt: user_prompt,
                json_response: Some(response),
            };
            let failure = match self.generator.generate_text(request).await {
                Ok(reply) => match prompt::reply_json(&reply.text).and_then(serde_json::from_value) {
                    Ok(parsed) => return Ok(parsed),
                    Err(e) => Failure::Malformed(e.to_string()),
                },
                Err(e) => Failure::Model(e),
            };

            if attempt >= attempts {
                return Err(match failure {
                    Failure::Model(source) => Error::Model { attempts, source },
                    Failure::Malformed(reason) => Error::MalformedReply {
                        name: response.name.clone(),
                        attempts,
                        reason,
                    },
                });
            }

            let reason = match &failure {
                Failure::Model(e) => e.to_string(),
                Failure::Malformed(reason) => reason.clone(),
            };
            tracing::warn!(
                agent = %self.id,
                response = %response.name,
                attempt,
                %reason,
                "model call failed, retrying"
            );
            tokio::time::sleep(self.config.retry.delay).await;
            attempt += 1;
        }
    }
}
