//! WebPilot command-line front end: configuration, logging, generative
//! backends and the `webpilot` subcommands.

pub mod cli;
pub mod config;
pub mod llm;

pub use config::{AppConfig, BrowserConfig, LlmConfig, LlmProviderKind};
