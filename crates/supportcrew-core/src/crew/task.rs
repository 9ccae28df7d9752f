use crate::tools::SharedTool;

/// A templated unit of work assigned to a role by name.
#[derive(Clone)]
pub struct TaskSpec {
    pub name: String,
    pub description_template: String,
    pub expected_output_template: String,
    pub assigned_role: String,
    pub tools: Vec<SharedTool>,
    /// Name of an earlier task whose output is handed to this one.
    pub depends_on: Option<String>,
}

impl TaskSpec {
    pub fn new(
        name: impl Into<String>,
        description_template: impl Into<String>,
        expected_output_template: impl Into<String>,
        assigned_role: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description_template: description_template.into(),
            expected_output_template: expected_output_template.into(),
            assigned_role: assigned_role.into(),
            tools: Vec::new(),
            depends_on: None,
        }
    }

    pub fn with_tool(mut self, tool: SharedTool) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_tools(mut self, tools: impl IntoIterator<Item = SharedTool>) -> Self {
        self.tools.extend(tools);
        self
    }

    pub fn depends_on(mut self, task_name: impl Into<String>) -> Self {
        self.depends_on = Some(task_name.into());
        self
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }
}

impl std::fmt::Debug for TaskSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskSpec")
            .field("name", &self.name)
            .field("assigned_role", &self.assigned_role)
            .field("tools", &self.tool_names())
            .field("depends_on", &self.depends_on)
            .finish()
    }
}

/// Outcome of one task in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    pub index: usize,
    pub task: String,
    pub role: String,
    pub rendered_description: String,
    pub output_text: String,
}

/// Every task result of a run, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrewOutput {
    pub run_id: String,
    pub results: Vec<TaskResult>,
}

impl CrewOutput {
    /// The last task's result, which is the crew's answer.
    pub fn final_result(&self) -> Option<&TaskResult> {
        self.results.last()
    }

    pub fn into_final(self) -> Option<TaskResult> {
        self.results.into_iter().last()
    }
}
