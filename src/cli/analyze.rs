use agent_core::Orchestrator;
use anyhow::Result;

use super::commands::AnalyzeArgs;
use super::output::OutputFormat;
use crate::config::AppConfig;
use crate::llm::build_provider;

pub async fn cmd_analyze(args: AnalyzeArgs, mut config: AppConfig, output: OutputFormat) -> Result<()> {
    args.llm.apply(&mut config.llm);

    let mut orchestrator = Orchestrator::new(config.agent);
    if let Some(llm) = build_provider(&config.llm)? {
        orchestrator = orchestrator.with_llm(llm);
    }

    let analysis = orchestrator.analyze_task(&args.task).await?;
    output.emit(&analysis, |analysis| {
        println!("Task: {}", analysis.task);
        println!("Model: {}", analysis.model);
        println!();
        println!("{}", analysis.analysis);
    })
}
