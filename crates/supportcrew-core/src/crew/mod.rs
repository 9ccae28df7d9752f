pub mod context;
pub mod executor;
pub mod role;
pub mod runner;
pub mod support;
pub mod task;
pub mod template;

pub use context::PipelineContext;
pub use executor::{Executor, LlmExecutor, TaskPrompt};
pub use role::{define_role, AgentRole};
pub use runner::{Crew, CrewEvent, CONTEXT_HEADER};
pub use task::{CrewOutput, TaskResult, TaskSpec};
