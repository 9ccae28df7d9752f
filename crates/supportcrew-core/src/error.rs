use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrewError {
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Task {task} is assigned to unknown role '{role}'")]
    UnknownRole { task: usize, role: String },

    #[error("Task {task} depends on '{depends_on}', which is not an earlier task")]
    InvalidDependency { task: usize, depends_on: String },

    #[error("Crew has no tasks to run")]
    EmptyPipeline,

    #[error("Task {task} ({role}): missing placeholder '{placeholder}'")]
    MissingPlaceholder {
        task: usize,
        role: String,
        placeholder: String,
    },

    #[error("Task {task} ({role}): executor failed: {message}")]
    Executor {
        task: usize,
        role: String,
        message: String,
    },

    #[error("Task {task} ({role}): timed out after {after:?}")]
    Timeout {
        task: usize,
        role: String,
        after: Duration,
    },

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("LLM request timed out after {0:?}")]
    LlmTimeout(Duration),

    #[error("Tool error: {tool}: {message}")]
    Tool { tool: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Executor exceeded maximum iterations ({0})")]
    MaxIterations(usize),
}

impl CrewError {
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Attribute a backend failure to the task that was running when it happened.
    /// Deadline failures become `Timeout`, everything else becomes `Executor`.
    pub fn at_task(self, task: usize, role: &str) -> Self {
        match self {
            Self::LlmTimeout(after) => Self::Timeout {
                task,
                role: role.to_string(),
                after,
            },
            err @ (Self::Executor { .. } | Self::Timeout { .. }) => err,
            other => Self::Executor {
                task,
                role: role.to_string(),
                message: other.to_string(),
            },
        }
    }

    /// Index of the task the error originated from, when it belongs to one.
    pub fn task_index(&self) -> Option<usize> {
        match self {
            Self::UnknownRole { task, .. }
            | Self::InvalidDependency { task, .. }
            | Self::MissingPlaceholder { task, .. }
            | Self::Executor { task, .. }
            | Self::Timeout { task, .. } => Some(*task),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CrewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_task_maps_timeout() {
        let err = CrewError::LlmTimeout(Duration::from_secs(3)).at_task(1, "Reviewer");
        assert!(matches!(
            err,
            CrewError::Timeout { task: 1, ref role, after } if role == "Reviewer" && after == Duration::from_secs(3)
        ));
    }

    #[test]
    fn test_at_task_wraps_backend_error() {
        let err = CrewError::Llm("rate limited".into()).at_task(0, "Responder");
        match err {
            CrewError::Executor { task, role, message } => {
                assert_eq!(task, 0);
                assert_eq!(role, "Responder");
                assert!(message.contains("rate limited"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_task_index() {
        let err = CrewError::UnknownRole {
            task: 2,
            role: "Ghost".into(),
        };
        assert_eq!(err.task_index(), Some(2));
        assert_eq!(CrewError::EmptyPipeline.task_index(), None);
    }
}
