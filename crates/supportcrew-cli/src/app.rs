use anyhow::{Context, Result};
use std::sync::Arc;
use supportcrew_core::crew::support::support_crew;
use supportcrew_core::{
    CrewEvent, Executor, LlmExecutor, PipelineContext, ScrapeWebsiteTool, Settings, SharedTool,
    TaskResult,
};
use tokio::sync::mpsc;

use crate::args::Cli;

/// Resolve settings: config file (explicit or default), then environment, then flags.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match cli.config {
        Some(ref path) => Settings::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Settings::load(),
    };
    settings.apply_env()?;
    cli.apply_to(&mut settings);
    Ok(settings)
}

/// Build the support crew and run it with the given executor.
pub async fn run_support_crew(
    settings: &Settings,
    executor: &dyn Executor,
    context: &PipelineContext,
    quiet: bool,
) -> Result<TaskResult> {
    if settings.crew.memory {
        tracing::warn!("crew memory is enabled in config but not supported; running without it");
    }

    let docs_tool: SharedTool = Arc::new(ScrapeWebsiteTool::new(settings.crew.docs_url.clone()));
    let crew = support_crew(vec![docs_tool])?.with_timeout(settings.task_timeout());

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<CrewEvent>();
    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if !quiet {
                print_event(&event);
            }
        }
    });

    let output = crew.run_with_events(executor, context, Some(event_tx)).await;
    printer.await?;

    let output = output?;
    output
        .into_final()
        .context("crew finished without producing a result")
}

pub async fn run(cli: Cli) -> Result<String> {
    let settings = load_settings(&cli)?;
    let llm = settings.build_llm_client()?;
    let executor = LlmExecutor::new(llm).with_max_iterations(settings.crew.max_iterations);

    let result = run_support_crew(&settings, &executor, &cli.context(), cli.quiet).await?;
    Ok(result.output_text)
}

fn print_event(event: &CrewEvent) {
    match event {
        CrewEvent::TaskStarted { index, task, role } => {
            eprintln!("[{}] {role}: working on {task}...", index + 1)
        }
        CrewEvent::TaskFinished(result) => eprintln!(
            "[{}] {} finished ({} chars)",
            result.index + 1,
            result.role,
            result.output_text.len()
        ),
        CrewEvent::Complete { tasks } => eprintln!("Crew completed {tasks} task(s)\n"),
        CrewEvent::Error(e) => eprintln!("Error: {e}"),
    }
}
