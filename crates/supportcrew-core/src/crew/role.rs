use crate::crew::context::PipelineContext;
use crate::crew::template;
use crate::error::{CrewError, Result};
use serde::{Deserialize, Serialize};

/// A named persona that conditions how the model answers a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRole {
    name: String,
    goal: String,
    backstory_template: String,
    can_delegate: bool,
}

/// Build a role. `name` and `goal` must be non-blank.
pub fn define_role(
    name: impl Into<String>,
    goal: impl Into<String>,
    backstory_template: impl Into<String>,
    can_delegate: bool,
) -> Result<AgentRole> {
    let name = name.into();
    let goal = goal.into();

    if name.trim().is_empty() {
        return Err(CrewError::InvalidRole("role name must not be empty".into()));
    }
    if goal.trim().is_empty() {
        return Err(CrewError::InvalidRole(format!(
            "role '{name}' must have a goal"
        )));
    }

    Ok(AgentRole {
        name,
        goal,
        backstory_template: backstory_template.into(),
        can_delegate,
    })
}

impl AgentRole {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn can_delegate(&self) -> bool {
        self.can_delegate
    }

    /// Render the backstory for a run. Returns the missing placeholder name on failure.
    pub fn backstory(&self, context: &PipelineContext) -> std::result::Result<String, String> {
        template::render(&self.backstory_template, context)
    }
}
