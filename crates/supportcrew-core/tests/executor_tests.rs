use supportcrew_core::crew::executor::{system_message, task_message};
use supportcrew_core::llm::{Embedding, FunctionCall, ToolCall};
use supportcrew_core::{
    CrewError, Executor, LlmClient, LlmExecutor, LlmResponse, Message, Role, SharedTool,
    TaskPrompt, Tool, ToolDefinition, ToolResult,
};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Mock LLM that returns pre-programmed responses and records every request.
struct MockLlm {
    responses: Mutex<VecDeque<LlmResponse>>,
    requests: Mutex<Vec<(Vec<Message>, Vec<String>)>>,
}

impl MockLlm {
    fn new(responses: Vec<LlmResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<(Vec<Message>, Vec<String>)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmClient for MockLlm {
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse, CrewError> {
        self.requests.lock().unwrap().push((
            messages.to_vec(),
            tools.iter().map(|t| t.name.clone()).collect(),
        ));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| CrewError::Llm("no more responses".into()))
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>, CrewError> {
        Ok(texts.iter().map(|t| vec![t.len() as f32]).collect())
    }
}

fn text(content: &str) -> LlmResponse {
    LlmResponse {
        message: Message::assistant(content),
        usage: None,
    }
}

fn tool_call(id: &str, name: &str, arguments: &str) -> LlmResponse {
    LlmResponse {
        message: Message::assistant_with_tools(
            "",
            vec![ToolCall {
                id: id.to_string(),
                call_type: "function".to_string(),
                function: FunctionCall {
                    name: name.to_string(),
                    arguments: arguments.to_string(),
                },
            }],
        ),
        usage: None,
    }
}

/// Simple echo tool for testing.
struct EchoTool;

#[async_trait::async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echoes input"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {"text": {"type": "string"}},
            "required": ["text"]
        })
    }

    async fn execute(&self, params: Value) -> ToolResult {
        Ok(serde_json::json!({"echoed": params["text"]}))
    }
}

/// Tool that returns an error.
struct ErrorTool;

#[async_trait::async_trait]
impl Tool for ErrorTool {
    fn name(&self) -> &str {
        "error"
    }

    fn description(&self) -> &str {
        "Always returns an error"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _params: Value) -> ToolResult {
        Err(CrewError::tool("error", "Intentional error"))
    }
}

fn prompt() -> TaskPrompt {
    TaskPrompt {
        task: "resolve".into(),
        role: "Senior Support Representative".into(),
        goal: "Be helpful".into(),
        backstory: "You support Acme.".into(),
        can_delegate: false,
        description: "Acme asks about memory".into(),
        expected_output: "A complete answer".into(),
    }
}

#[tokio::test]
async fn test_plain_answer_single_call() {
    let llm = Arc::new(MockLlm::new(vec![text("Here is the answer")]));
    let executor = LlmExecutor::new(llm.clone());

    let output = executor.execute(&prompt(), &[]).await.unwrap();

    assert_eq!(output, "Here is the answer");
    let requests = llm.requests();
    assert_eq!(requests.len(), 1);
    let (messages, tool_names) = &requests[0];
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::System);
    assert!(messages[0].content.contains("Senior Support Representative"));
    assert!(messages[0].content.contains("You support Acme."));
    assert_eq!(messages[1].role, Role::User);
    assert!(messages[1].content.contains("Acme asks about memory"));
    assert!(messages[1].content.contains("A complete answer"));
    assert!(tool_names.is_empty());
}

#[tokio::test]
async fn test_tool_call_then_answer() {
    let llm = Arc::new(MockLlm::new(vec![
        tool_call("call_1", "echo", r#"{"text": "docs"}"#),
        text("Answer using docs"),
    ]));
    let executor = LlmExecutor::new(llm.clone());
    let toolset = vec![Arc::new(EchoTool) as SharedTool];

    let output = executor.execute(&prompt(), &toolset).await.unwrap();

    assert_eq!(output, "Answer using docs");
    let requests = llm.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].1, vec!["echo".to_string()]);

    let second = &requests[1].0;
    // system, user, assistant tool call, tool result
    assert_eq!(second.len(), 4);
    assert!(second[2].tool_calls.is_some());
    assert_eq!(second[3].role, Role::Tool);
    assert_eq!(second[3].tool_call_id.as_deref(), Some("call_1"));
    assert!(second[3].content.contains("docs"));
}

#[tokio::test]
async fn test_tool_error_reported_to_model() {
    let llm = Arc::new(MockLlm::new(vec![
        tool_call("call_1", "error", "{}"),
        text("Recovered"),
    ]));
    let executor = LlmExecutor::new(llm.clone());
    let toolset = vec![Arc::new(ErrorTool) as SharedTool];

    let output = executor.execute(&prompt(), &toolset).await.unwrap();

    assert_eq!(output, "Recovered");
    let requests = llm.requests();
    let result_msg = &requests[1].0[3];
    assert!(result_msg.content.starts_with("Error:"));
    assert!(result_msg.content.contains("Intentional error"));
}

#[tokio::test]
async fn test_unknown_tool_reported_to_model() {
    let llm = Arc::new(MockLlm::new(vec![
        tool_call("call_1", "missing", "{}"),
        text("Done"),
    ]));
    let executor = LlmExecutor::new(llm.clone());

    let output = executor.execute(&prompt(), &[]).await.unwrap();

    assert_eq!(output, "Done");
    assert!(llm.requests()[1].0[3].content.contains("Tool 'missing' not found"));
}

#[tokio::test]
async fn test_bad_tool_arguments_reported_to_model() {
    let llm = Arc::new(MockLlm::new(vec![
        tool_call("call_1", "echo", "not json"),
        text("Done"),
    ]));
    let executor = LlmExecutor::new(llm.clone());
    let toolset = vec![Arc::new(EchoTool) as SharedTool];

    executor.execute(&prompt(), &toolset).await.unwrap();

    assert!(llm.requests()[1].0[3]
        .content
        .contains("Failed to parse tool arguments"));
}

#[tokio::test]
async fn test_max_iterations() {
    let llm = Arc::new(MockLlm::new(vec![
        tool_call("c1", "echo", r#"{"text": "a"}"#),
        tool_call("c2", "echo", r#"{"text": "b"}"#),
        tool_call("c3", "echo", r#"{"text": "c"}"#),
    ]));
    let executor = LlmExecutor::new(llm.clone()).with_max_iterations(2);
    let toolset = vec![Arc::new(EchoTool) as SharedTool];

    let err = executor.execute(&prompt(), &toolset).await.unwrap_err();

    assert!(matches!(err, CrewError::MaxIterations(2)));
    assert_eq!(llm.requests().len(), 2);
}

#[tokio::test]
async fn test_backend_error_propagates() {
    let llm = Arc::new(MockLlm::new(vec![]));
    let executor = LlmExecutor::new(llm);

    let err = executor.execute(&prompt(), &[]).await.unwrap_err();
    assert!(matches!(err, CrewError::Llm(_)));
}

#[test]
fn test_system_message_mentions_delegation_only_when_forbidden() {
    let mut p = prompt();
    assert!(system_message(&p).contains("do not hand it off"));
    p.can_delegate = true;
    assert!(!system_message(&p).contains("do not hand it off"));
    assert!(system_message(&p).contains("Your personal goal is: Be helpful"));
}

#[test]
fn test_task_message_tool_hint() {
    let p = prompt();
    assert!(task_message(&p, true).contains("Use the tools"));
    assert!(!task_message(&p, false).contains("Use the tools"));
}
