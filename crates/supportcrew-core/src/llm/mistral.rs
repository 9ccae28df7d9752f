use crate::constants::{defaults, endpoints, models};
use crate::error::CrewError;
use crate::llm::traits::*;
use crate::tools::ToolDefinition;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Client for the Mistral chat-completions and embeddings API.
/// Speaks the OpenAI-compatible wire format, so `with_base_url` can point it
/// at any compatible endpoint.
pub struct MistralClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    embed_model: String,
    base_url: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    timeout: Duration,
}

impl MistralClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        let timeout = Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS);
        Self {
            client: build_http_client(timeout),
            api_key: api_key.into(),
            model: models::DEFAULT_CHAT_MODEL.to_string(),
            embed_model: models::DEFAULT_EMBED_MODEL.to_string(),
            base_url: endpoints::MISTRAL_BASE_URL.to_string(),
            temperature: None,
            max_tokens: None,
            timeout,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_embed_model(mut self, model: impl Into<String>) -> Self {
        self.embed_model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.client = build_http_client(timeout);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_tool_defs(&self, tools: &[ToolDefinition]) -> Vec<Value> {
        tools
            .iter()
            .map(|t| {
                serde_json::json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    }
                })
            })
            .collect()
    }

    async fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<String, CrewError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            tracing::warn!(%status, path, "Mistral API returned an error");
            return Err(CrewError::Llm(format!(
                "Mistral API error ({}): {}",
                status, response_text
            )));
        }

        Ok(response_text)
    }

    fn map_transport_error(&self, err: reqwest::Error) -> CrewError {
        if err.is_timeout() {
            CrewError::LlmTimeout(self.timeout)
        } else {
            CrewError::Http(err)
        }
    }
}

fn build_http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(defaults::USER_AGENT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default = "default_call_type")]
    call_type: String,
    function: WireFunction,
}

fn default_call_type() -> String {
    "function".to_string()
}

#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

pub(crate) fn to_wire_messages(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|m| {
            let mut wire = serde_json::json!({
                "role": m.role,
                "content": m.content,
            });
            match (m.role, &m.tool_calls, &m.tool_call_id) {
                (Role::Assistant, Some(calls), _) => {
                    let calls: Vec<Value> = calls
                        .iter()
                        .map(|tc| {
                            serde_json::json!({
                                "id": tc.id,
                                "type": "function",
                                "function": {
                                    "name": tc.function.name,
                                    "arguments": tc.function.arguments,
                                }
                            })
                        })
                        .collect();
                    wire["tool_calls"] = Value::Array(calls);
                }
                (Role::Tool, _, Some(id)) => wire["tool_call_id"] = Value::String(id.clone()),
                _ => {}
            }
            wire
        })
        .collect()
}

pub(crate) fn parse_chat_response(body: &str) -> Result<LlmResponse, CrewError> {
    let api_response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| CrewError::Llm(format!("Failed to parse response: {e}")))?;

    let choice = api_response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CrewError::Llm("No response from API".into()))?;

    let content = choice.message.content.unwrap_or_default();

    // Mistral may send arguments as an object rather than an encoded string.
    let tool_calls: Vec<ToolCall> = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|tc| ToolCall {
            id: tc.id,
            call_type: tc.call_type,
            function: FunctionCall {
                name: tc.function.name,
                arguments: match tc.function.arguments {
                    Value::String(s) => s,
                    other => other.to_string(),
                },
            },
        })
        .collect();

    let message = if tool_calls.is_empty() {
        Message::assistant(content)
    } else {
        Message::assistant_with_tools(content, tool_calls)
    };

    Ok(LlmResponse {
        message,
        usage: api_response.usage.map(|u| Usage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        }),
    })
}

pub(crate) fn parse_embeddings(body: &str, expected: usize) -> Result<Vec<Embedding>, CrewError> {
    let mut response: EmbeddingResponse = serde_json::from_str(body)
        .map_err(|e| CrewError::Llm(format!("Failed to parse embeddings: {e}")))?;

    if response.data.len() != expected {
        return Err(CrewError::Llm(format!(
            "Expected {} embeddings, got {}",
            expected,
            response.data.len()
        )));
    }

    response.data.sort_by_key(|d| d.index);
    Ok(response.data.into_iter().map(|d| d.embedding).collect())
}

#[async_trait::async_trait]
impl LlmClient for MistralClient {
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse, CrewError> {
        let request_body = ChatRequest {
            model: self.model.clone(),
            messages: to_wire_messages(messages),
            tools: if tools.is_empty() {
                None
            } else {
                Some(self.build_tool_defs(tools))
            },
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        tracing::debug!(model = %self.model, messages = messages.len(), tools = tools.len(), "chat request");
        let body = self
            .post_json(endpoints::CHAT_COMPLETIONS_PATH, &request_body)
            .await?;
        let response = parse_chat_response(&body)?;

        if let Some(ref usage) = response.usage {
            tracing::debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "chat usage"
            );
        }

        Ok(response)
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>, CrewError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request_body = EmbeddingRequest {
            model: &self.embed_model,
            input: texts,
        };

        let body = self
            .post_json(endpoints::EMBEDDINGS_PATH, &request_body)
            .await?;
        parse_embeddings(&body, texts.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_reply() {
        let body = r#"{
            "choices": [{"message": {"role": "assistant", "content": "Hello there"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        }"#;

        let response = parse_chat_response(body).unwrap();
        assert_eq!(response.message.content, "Hello there");
        assert!(response.tool_calls().is_empty());
        let usage = response.usage.unwrap();
        assert_eq!(usage.input_tokens, 12);
        assert_eq!(usage.output_tokens, 3);
    }

    #[test]
    fn test_parse_tool_call_with_object_arguments() {
        let body = r#"{
            "choices": [{"message": {
                "role": "assistant",
                "content": "",
                "tool_calls": [{
                    "id": "abc123",
                    "function": {"name": "scrape_website", "arguments": {"url": "https://example.com"}}
                }]
            }}]
        }"#;

        let response = parse_chat_response(body).unwrap();
        let calls = response.tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "abc123");
        assert_eq!(calls[0].call_type, "function");
        assert_eq!(calls[0].function.name, "scrape_website");
        let args = calls[0].parse_arguments().unwrap();
        assert_eq!(args["url"], "https://example.com");
    }

    #[test]
    fn test_parse_empty_choices_is_error() {
        let err = parse_chat_response(r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, CrewError::Llm(_)));
    }

    #[test]
    fn test_parse_embeddings_sorted_by_index() {
        let body = r#"{"data": [
            {"embedding": [0.5, 0.5], "index": 1},
            {"embedding": [1.0, 0.0], "index": 0}
        ]}"#;

        let vectors = parse_embeddings(body, 2).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.5, 0.5]]);
    }

    #[test]
    fn test_parse_embeddings_count_mismatch() {
        let body = r#"{"data": [{"embedding": [1.0], "index": 0}]}"#;
        assert!(parse_embeddings(body, 2).is_err());
    }

    #[test]
    fn test_wire_messages_tool_roles() {
        let call = ToolCall {
            id: "call_1".into(),
            call_type: "function".into(),
            function: FunctionCall {
                name: "scrape_website".into(),
                arguments: "{}".into(),
            },
        };
        let messages = vec![
            Message::system("sys"),
            Message::assistant_with_tools("", vec![call]),
            Message::tool_result("call_1", "page text"),
        ];

        let wire = to_wire_messages(&messages);
        assert_eq!(wire[0]["role"], "system");
        assert_eq!(wire[1]["role"], "assistant");
        assert_eq!(wire[1]["tool_calls"][0]["function"]["name"], "scrape_website");
        assert_eq!(messages[2].role, Role::Tool);
        assert_eq!(wire[2]["role"], "tool");
        assert_eq!(wire[2]["tool_call_id"], "call_1");
        assert!(wire[0].get("tool_call_id").is_none());
        assert!(wire[2].get("tool_calls").is_none());
    }

    #[test]
    fn test_builder_trims_base_url() {
        let client = MistralClient::new("key")
            .with_base_url("http://localhost:8080/")
            .with_model("mistral-large-latest");
        assert_eq!(client.base_url, "http://localhost:8080");
        assert_eq!(client.model(), "mistral-large-latest");
    }
}
