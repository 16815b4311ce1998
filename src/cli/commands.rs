use clap::{Args, Subcommand};

use crate::config::LlmProviderKind;

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Print the plan for a task without opening a browser
    Plan(PlanArgs),

    /// Ask the language model for a strategic analysis of a task
    Analyze(AnalyzeArgs),

    /// Plan, execute and evaluate a task in Chromium
    Run(RunArgs),
}

/// Flags shared by every command that may talk to a language model.
#[derive(Args, Clone, Debug, Default)]
pub struct LlmArgs {
    /// Override `llm.provider`
    #[arg(long, value_enum)]
    pub provider: Option<LlmProviderKind>,

    /// Override `llm.model`
    #[arg(long)]
    pub model: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct PlanArgs {
    /// Natural-language goal
    #[arg(short, long)]
    pub task: String,

    /// Maximum steps to plan ahead
    #[arg(long)]
    pub lookahead: Option<usize>,

    #[command(flatten)]
    pub llm: LlmArgs,
}

#[derive(Args, Clone, Debug)]
pub struct AnalyzeArgs {
    /// Natural-language goal
    #[arg(short, long)]
    pub task: String,

    #[command(flatten)]
    pub llm: LlmArgs,
}

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Natural-language goal
    #[arg(short, long)]
    pub task: String,

    /// Page to open before the first plan is made
    #[arg(short, long)]
    pub url: Option<String>,

    /// Override `agent.max_steps`
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Override `agent.max_retries`
    #[arg(long)]
    pub max_retries: Option<usize>,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,

    #[command(flatten)]
    pub llm: LlmArgs,
}

impl LlmArgs {
    pub fn apply(&self, config: &mut crate::config::LlmConfig) {
        if let Some(provider) = self.provider {
            config.provider = provider;
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
    }
}
