use agent_core::{Plan, PlanGenerator, PlannerConfig};
use anyhow::Result;
use serde::Serialize;
use tracing::info;

use super::commands::PlanArgs;
use super::output::OutputFormat;
use crate::config::AppConfig;
use crate::llm::build_provider;

#[derive(Serialize)]
struct PlanReport {
    task: String,
    #[serde(flatten)]
    plan: Plan,
}

pub async fn cmd_plan(args: PlanArgs, mut config: AppConfig, output: OutputFormat) -> Result<()> {
    args.llm.apply(&mut config.llm);
    let lookahead_steps = args.lookahead.unwrap_or(config.agent.lookahead_steps);

    let mut planner = PlanGenerator::new(PlannerConfig { lookahead_steps });
    if let Some(llm) = build_provider(&config.llm)? {
        planner = planner.with_llm(llm);
    }

    info!(task = %args.task, lookahead_steps, "Planning without a browser");
    let plan = planner.plan(&args.task, None, &[]).await;
    let report = PlanReport {
        task: args.task,
        plan,
    };
    output.emit(&report, print_plan)
}

fn print_plan(report: &PlanReport) {
    println!("Plan for: {}", report.task);
    println!("Source: {:?}", report.plan.source());
    for (index, step) in report.plan.steps().iter().enumerate() {
        let args = serde_json::Value::Object(step.args.clone());
        println!("{:>3}. {} {}", index + 1, step.action_name(), args);
        if !step.metadata.reason.is_empty() {
            println!("     reason: {}", step.metadata.reason);
        }
        if let Some(expected) = &step.metadata.expected_outcome {
            println!("     expect: {expected}");
        }
    }
    println!("Success criteria: {}", report.plan.success_criteria());
}
