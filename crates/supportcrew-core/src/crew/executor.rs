use crate::constants::defaults;
use crate::error::CrewError;
use crate::llm::{LlmClient, Message, ToolCall};
use crate::tools::{self, SharedTool};
use std::sync::Arc;

/// Everything the backend needs to perform one task, already rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPrompt {
    pub task: String,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub can_delegate: bool,
    pub description: String,
    pub expected_output: String,
}

/// The seam where a language-model backend plugs into the crew runner.
///
/// Retries and backoff, if any, belong inside implementations: only they know
/// which failures are transient.
#[async_trait::async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, prompt: &TaskPrompt, tools: &[SharedTool]) -> Result<String, CrewError>;
}

/// Executor backed by an [`LlmClient`], with a bounded tool-calling loop.
pub struct LlmExecutor {
    llm: Arc<dyn LlmClient>,
    max_iterations: usize,
}

impl LlmExecutor {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            max_iterations: defaults::MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    async fn execute_tool(&self, tools: &[SharedTool], tool_call: &ToolCall) -> (bool, String) {
        let tool_name = &tool_call.function.name;

        let params = match tool_call.parse_arguments() {
            Ok(p) => p,
            Err(e) => {
                return (false, format!("Failed to parse tool arguments: {e}"));
            }
        };

        let Some(tool) = tools::find(tools, tool_name) else {
            return (false, format!("Tool '{}' not found", tool_name));
        };

        match tool.execute(params).await {
            Ok(value) => {
                let result_str =
                    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
                (true, result_str)
            }
            Err(e) => (false, format!("Error: {e}")),
        }
    }
}

pub fn system_message(prompt: &TaskPrompt) -> String {
    let mut msg = format!("You are {}. {}\nYour personal goal is: {}", prompt.role, prompt.backstory, prompt.goal);
    if !prompt.can_delegate {
        msg.push_str("\nYou must complete this task yourself; do not hand it off to a coworker.");
    }
    msg
}

pub fn task_message(prompt: &TaskPrompt, has_tools: bool) -> String {
    let mut msg = format!(
        "Current Task: {}\n\nThis is the expected criteria for your final answer: {}\n\
         You MUST return the actual complete content as the final answer, not a summary.",
        prompt.description, prompt.expected_output
    );
    if has_tools {
        msg.push_str("\n\nUse the tools available to you to gather what you need before answering.");
    }
    msg.push_str("\n\nBegin! Give your best final answer.");
    msg
}

#[async_trait::async_trait]
impl Executor for LlmExecutor {
    async fn execute(&self, prompt: &TaskPrompt, tools: &[SharedTool]) -> Result<String, CrewError> {
        let tool_definitions = tools::definitions(tools);
        let mut messages = vec![
            Message::system(system_message(prompt)),
            Message::user(task_message(prompt, !tools.is_empty())),
        ];

        for iteration in 1..=self.max_iterations {
            tracing::debug!(task = %prompt.task, role = %prompt.role, iteration, "calling model");

            let response = self.llm.chat(&messages, &tool_definitions).await?;
            let tool_calls = response.tool_calls().to_vec();

            if tool_calls.is_empty() {
                return Ok(response.message.content);
            }

            messages.push(response.message);

            for tool_call in &tool_calls {
                let (success, result_str) = self.execute_tool(tools, tool_call).await;
                if success {
                    tracing::info!(tool = %tool_call.function.name, "tool call succeeded");
                } else {
                    tracing::warn!(tool = %tool_call.function.name, result = %result_str, "tool call failed");
                }
                messages.push(Message::tool_result(&tool_call.id, result_str));
            }
        }

        Err(CrewError::MaxIterations(self.max_iterations))
    }
}
