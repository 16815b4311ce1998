use std::sync::Arc;

use agent_core::{LlmProvider, TaskResult};
use anyhow::{bail, Result};

use super::commands::RunArgs;
use super::output::OutputFormat;
use crate::config::AppConfig;
use crate::llm::build_provider;

pub async fn cmd_run(args: RunArgs, mut config: AppConfig, output: OutputFormat) -> Result<()> {
    args.llm.apply(&mut config.llm);
    if let Some(max_steps) = args.max_steps {
        config.agent.max_steps = max_steps;
    }
    if let Some(max_retries) = args.max_retries {
        config.agent.max_retries = max_retries;
    }
    if args.headful {
        config.browser.headless = false;
    }

    let llm = build_provider(&config.llm)?;
    let result = execute(&args, &config, llm).await?;
    output.emit(&result, print_result)?;

    if !result.success {
        bail!(
            "task failed: {}",
            result.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

#[cfg(feature = "chromium")]
async fn execute(
    args: &RunArgs,
    config: &AppConfig,
    llm: Option<Arc<dyn LlmProvider>>,
) -> Result<TaskResult> {
    use action_primitives::BrowserController;
    use agent_core::Orchestrator;
    use anyhow::Context;
    use cdp_adapter::ChromiumBrowser;
    use perceiver_structural::StructuralAnalyzer;
    use serde_json::json;
    use tracing::info;

    let browser = Arc::new(
        ChromiumBrowser::launch(config.browser.chromium())
            .await
            .context("Failed to launch Chromium")?,
    );
    let controller = Arc::new(BrowserController::with_config(
        browser.clone(),
        config.browser.controller(),
    ));

    let mut orchestrator = Orchestrator::new(config.agent.clone())
        .with_actions(controller.clone())
        .with_analyzer(StructuralAnalyzer::with_config(config.analyzer.clone()));
    if let Some(llm) = llm {
        orchestrator = orchestrator.with_llm(llm);
    }

    let page = match &args.url {
        Some(url) => {
            let navigate_args = json!({ "url": url }).as_object().cloned().unwrap_or_default();
            let opened = controller.execute_named("navigate", navigate_args, None).await;
            if !opened.ok {
                browser.shutdown().await;
                bail!(
                    "could not open {url}: {}",
                    opened.error.as_deref().unwrap_or("unknown error")
                );
            }
            info!(url = %url, "Opened start page");
            opened.page
        }
        None => None,
    };

    let result = orchestrator.execute_task(&args.task, page).await;
    browser.shutdown().await;
    Ok(result)
}

#[cfg(not(feature = "chromium"))]
async fn execute(
    _args: &RunArgs,
    _config: &AppConfig,
    _llm: Option<Arc<dyn LlmProvider>>,
) -> Result<TaskResult> {
    bail!("`webpilot run` needs a browser backend; rebuild with `--features chromium`")
}

fn print_result(result: &TaskResult) {
    let status = if result.success { "completed" } else { "failed" };
    println!("Task {status}: {}", result.task);
    println!(
        "Steps: {}   Time: {} ms",
        result.steps_executed, result.total_time_ms
    );
    if let Some(final_result) = &result.final_result {
        println!("Result: {final_result}");
    }
    if let Some(error) = &result.error {
        println!("Error: {error}");
    }
    for entry in &result.execution_log {
        println!("  - {}", entry.phase());
    }
}
