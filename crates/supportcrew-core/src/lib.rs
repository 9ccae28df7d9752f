pub mod config;
pub mod constants;
pub mod crew;
pub mod error;
pub mod llm;
pub mod tools;

// Re-export key types
pub use config::Settings;
pub use crew::{
    define_role, AgentRole, Crew, CrewEvent, CrewOutput, Executor, LlmExecutor, PipelineContext,
    TaskPrompt, TaskResult, TaskSpec,
};
pub use error::{CrewError, Result};
pub use llm::{Embedding, LlmClient, LlmResponse, Message, MistralClient, Role};
pub use tools::{ScrapeWebsiteTool, SharedTool, Tool, ToolDefinition, ToolResult};
