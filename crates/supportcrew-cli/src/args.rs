use clap::Parser;
use std::path::PathBuf;
use supportcrew_core::crew::support::default_inputs;
use supportcrew_core::{PipelineContext, Settings};

#[derive(Parser, Debug)]
#[command(name = "supportcrew")]
#[command(about = "Answer a customer inquiry with a support agent and a QA reviewer")]
#[command(version)]
pub struct Cli {
    /// Customer organisation the inquiry comes from
    #[arg(long)]
    pub customer: Option<String>,

    /// Person who reached out
    #[arg(long)]
    pub person: Option<String>,

    /// The customer's question
    #[arg(long)]
    pub inquiry: Option<String>,

    /// Extra template value, e.g. --set product=crewAI (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,

    /// Chat model to use
    #[arg(short, long)]
    pub model: Option<String>,

    /// Per-task deadline in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,

    /// Documentation page the support agent reads
    #[arg(long)]
    pub docs_url: Option<String>,

    /// Config file (defaults to the user config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Do not print progress to stderr
    #[arg(short, long)]
    pub quiet: bool,
}

/// Parse a `key=value` pair. Keys must be non-empty; values may contain `=`.
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

impl Cli {
    /// Inputs for the run: defaults, then `--set` values, then the named flags.
    pub fn context(&self) -> PipelineContext {
        let mut context = default_inputs();
        for (key, value) in &self.set {
            context.insert(key.clone(), value.clone());
        }
        if let Some(ref customer) = self.customer {
            context.insert("customer", customer.clone());
        }
        if let Some(ref person) = self.person {
            context.insert("person", person.clone());
        }
        if let Some(ref inquiry) = self.inquiry {
            context.insert("inquiry", inquiry.clone());
        }
        context
    }

    /// Command-line flags win over config file and environment.
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(ref model) = self.model {
            settings.llm.model = model.clone();
        }
        if let Some(secs) = self.timeout_secs {
            settings.crew.task_timeout_secs = secs;
        }
        if let Some(ref url) = self.docs_url {
            settings.crew.docs_url = url.clone();
        }
    }
}
