use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use super::analyze::cmd_analyze;
use super::commands::Commands;
use super::env::CliArgs;
use super::plan::cmd_plan;
use super::run::cmd_run;
use super::runtime::{init_logging, load_config, load_local_env_overrides, LoadedConfig};
use crate::config::AppConfig;

pub async fn run() -> Result<()> {
    load_local_env_overrides();
    let cli = CliArgs::parse();

    init_logging(&cli.log_level, cli.debug)?;
    info!("Starting WebPilot v{}", env!("CARGO_PKG_VERSION"));

    let LoadedConfig { config, .. } = load_config(cli.config.as_ref()).await?;

    match dispatch(&cli, config).await {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(err) => {
            error!("Command failed: {}", err);
            Err(err)
        }
    }
}

async fn dispatch(cli: &CliArgs, config: AppConfig) -> Result<()> {
    match cli.command.clone() {
        Commands::Plan(args) => cmd_plan(args, config, cli.output).await,
        Commands::Analyze(args) => cmd_analyze(args, config, cli.output).await,
        Commands::Run(args) => cmd_run(args, config, cli.output).await,
    }
}
