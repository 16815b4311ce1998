use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    /// Print `value` as pretty JSON, or hand over to `human` for text output.
    pub fn emit<T: Serialize>(self, value: &T, human: impl FnOnce(&T)) -> Result<()> {
        match self {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Human => human(value),
        }
        Ok(())
    }
}
