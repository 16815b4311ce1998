pub mod app;
mod analyze;
mod commands;
mod env;
mod output;
mod plan;
mod run;
mod runtime;

pub use commands::Commands;
pub use env::CliArgs;
pub use output::OutputFormat;
pub use runtime::{init_logging, load_config, load_local_env_overrides, LoadedConfig};
