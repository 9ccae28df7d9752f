use crate::error::CrewError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

pub type ToolResult = Result<Value, CrewError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters_schema(&self) -> Value;

    async fn execute(&self, params: Value) -> ToolResult;

    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Tools are shared between task definitions and the executor.
pub type SharedTool = Arc<dyn Tool>;

pub fn definitions(tools: &[SharedTool]) -> Vec<ToolDefinition> {
    tools.iter().map(|t| t.to_definition()).collect()
}

/// First tool with the given name, in declaration order.
pub fn find<'a>(tools: &'a [SharedTool], name: &str) -> Option<&'a SharedTool> {
    tools.iter().find(|t| t.name() == name)
}
