use crate::constants::defaults;
use crate::crew::context::PipelineContext;
use crate::crew::executor::{Executor, TaskPrompt};
use crate::crew::role::AgentRole;
use crate::crew::task::{CrewOutput, TaskResult, TaskSpec};
use crate::crew::template;
use crate::error::{CrewError, Result};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Header placed between a task's description and the output it depends on.
pub const CONTEXT_HEADER: &str = "\n\nThis is the context you're working with:\n";

/// Events emitted while a crew runs.
#[derive(Debug, Clone)]
pub enum CrewEvent {
    TaskStarted {
        index: usize,
        task: String,
        role: String,
    },
    TaskFinished(TaskResult),
    Complete {
        tasks: usize,
    },
    Error(String),
}

/// A validated set of roles and tasks, executed strictly in declaration order.
///
/// The crew holds no per-run state, so one value can serve any number of runs.
#[derive(Debug, Clone)]
pub struct Crew {
    roles: Vec<AgentRole>,
    tasks: Vec<TaskSpec>,
    timeout: Duration,
}

/// A task whose templates have been rendered for one run.
struct PreparedTask<'a> {
    spec: &'a TaskSpec,
    prompt: TaskPrompt,
    dependency: Option<usize>,
}

impl Crew {
    pub fn new(roles: Vec<AgentRole>, tasks: Vec<TaskSpec>) -> Self {
        Self {
            roles,
            tasks,
            timeout: Duration::from_secs(defaults::TASK_TIMEOUT_SECS),
        }
    }

    /// Deadline applied to each executor call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn roles(&self) -> &[AgentRole] {
        &self.roles
    }

    pub fn tasks(&self) -> &[TaskSpec] {
        &self.tasks
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn role(&self, name: &str) -> Option<&AgentRole> {
        self.roles.iter().find(|r| r.name() == name)
    }

    /// Check role assignments and dependencies without running anything.
    pub fn validate(&self) -> Result<()> {
        if self.tasks.is_empty() {
            return Err(CrewError::EmptyPipeline);
        }

        for (index, task) in self.tasks.iter().enumerate() {
            if self.role(&task.assigned_role).is_none() {
                return Err(CrewError::UnknownRole {
                    task: index,
                    role: task.assigned_role.clone(),
                });
            }

            if let Some(ref dep) = task.depends_on {
                let earlier = self.tasks[..index].iter().any(|t| &t.name == dep);
                if !earlier {
                    return Err(CrewError::InvalidDependency {
                        task: index,
                        depends_on: dep.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Render every template up front so a missing value fails before any executor call.
    fn prepare(&self, context: &PipelineContext) -> Result<Vec<PreparedTask<'_>>> {
        let mut prepared = Vec::with_capacity(self.tasks.len());

        for (index, spec) in self.tasks.iter().enumerate() {
            let role = self.role(&spec.assigned_role).ok_or_else(|| CrewError::UnknownRole {
                task: index,
                role: spec.assigned_role.clone(),
            })?;

            let missing = |placeholder: String| CrewError::MissingPlaceholder {
                task: index,
                role: role.name().to_string(),
                placeholder,
            };

            let description = template::render(&spec.description_template, context).map_err(missing)?;
            let expected_output =
                template::render(&spec.expected_output_template, context).map_err(missing)?;
            let backstory = role.backstory(context).map_err(missing)?;
            let goal = template::render(role.goal(), context).map_err(missing)?;

            let dependency = spec
                .depends_on
                .as_ref()
                .and_then(|dep| self.tasks[..index].iter().position(|t| &t.name == dep));

            prepared.push(PreparedTask {
                spec,
                prompt: TaskPrompt {
                    task: spec.name.clone(),
                    role: role.name().to_string(),
                    goal,
                    backstory,
                    can_delegate: role.can_delegate(),
                    description,
                    expected_output,
                },
                dependency,
            });
        }

        Ok(prepared)
    }

    /// Run the crew and return the final task's result.
    pub async fn run(&self, executor: &dyn Executor, context: &PipelineContext) -> Result<TaskResult> {
        let output = self.run_with_events(executor, context, None).await?;
        output.into_final().ok_or(CrewError::EmptyPipeline)
    }

    /// Run the crew and return every task result.
    pub async fn run_all(&self, executor: &dyn Executor, context: &PipelineContext) -> Result<CrewOutput> {
        self.run_with_events(executor, context, None).await
    }

    /// Run the crew, emitting [`CrewEvent`]s through the channel when one is given.
    pub async fn run_with_events(
        &self,
        executor: &dyn Executor,
        context: &PipelineContext,
        event_tx: Option<UnboundedSender<CrewEvent>>,
    ) -> Result<CrewOutput> {
        let result = self.execute(executor, context, &event_tx).await;
        if let Err(ref e) = result {
            tracing::error!(error = %e, "crew run aborted");
            Self::emit(&event_tx, CrewEvent::Error(e.to_string()));
        }
        result
    }

    async fn execute(
        &self,
        executor: &dyn Executor,
        context: &PipelineContext,
        event_tx: &Option<UnboundedSender<CrewEvent>>,
    ) -> Result<CrewOutput> {
        self.validate()?;
        let prepared = self.prepare(context)?;

        let run_id = uuid::Uuid::new_v4().to_string();
        tracing::info!(%run_id, tasks = prepared.len(), "starting crew run");

        let mut results: Vec<TaskResult> = Vec::with_capacity(prepared.len());

        for (index, task) in prepared.into_iter().enumerate() {
            let mut prompt = task.prompt;
            if let Some(dep) = task.dependency {
                prompt.description.push_str(CONTEXT_HEADER);
                prompt.description.push_str(&results[dep].output_text);
            }

            Self::emit(
                event_tx,
                CrewEvent::TaskStarted {
                    index,
                    task: prompt.task.clone(),
                    role: prompt.role.clone(),
                },
            );
            tracing::info!(%run_id, index, task = %prompt.task, role = %prompt.role, "task started");

            let outcome =
                tokio::time::timeout(self.timeout, executor.execute(&prompt, &task.spec.tools))
                    .await;
            let output_text = match outcome {
                Ok(Ok(text)) => text,
                Ok(Err(e)) => return Err(e.at_task(index, &prompt.role)),
                Err(_) => {
                    return Err(CrewError::Timeout {
                        task: index,
                        role: prompt.role,
                        after: self.timeout,
                    })
                }
            };

            let result = TaskResult {
                index,
                task: prompt.task,
                role: prompt.role,
                rendered_description: prompt.description,
                output_text,
            };

            tracing::info!(%run_id, index, chars = result.output_text.len(), "task finished");
            Self::emit(event_tx, CrewEvent::TaskFinished(result.clone()));
            results.push(result);
        }

        Self::emit(event_tx, CrewEvent::Complete { tasks: results.len() });
        Ok(CrewOutput { run_id, results })
    }

    fn emit(tx: &Option<UnboundedSender<CrewEvent>>, event: CrewEvent) {
        if let Some(ref tx) = tx {
            let _ = tx.send(event);
        }
    }
}
