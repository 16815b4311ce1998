//! Generative backends selectable from configuration.

mod openai;
mod utils;

use std::sync::Arc;
use std::time::Duration;

use agent_core::{LlmProvider, MockLlmProvider};
use anyhow::{bail, Result};
use tracing::info;

use crate::config::{LlmConfig, LlmProviderKind};

pub use openai::{OpenAiConfig, OpenAiLlmProvider};
pub use utils::extract_json_object;

/// `None` when the run should stay deterministic.
pub fn build_provider(config: &LlmConfig) -> Result<Option<Arc<dyn LlmProvider>>> {
    let provider: Arc<dyn LlmProvider> = match config.provider {
        LlmProviderKind::None => return Ok(None),
        LlmProviderKind::Mock => {
            if config.mock_responses.is_empty() {
                Arc::new(MockLlmProvider::new())
            } else {
                Arc::new(MockLlmProvider::with_responses(config.mock_responses.clone()))
            }
        }
        LlmProviderKind::Openai => {
            let Some(api_key) = config.api_key.clone() else {
                bail!(
                    "llm.provider is openai but {} is not set",
                    config.api_key_env
                );
            };
            Arc::new(OpenAiLlmProvider::new(OpenAiConfig {
                api_key,
                model: config.model.clone(),
                api_base: config.base_url.clone(),
                temperature: config.temperature,
                timeout: Duration::from_secs(config.timeout_secs),
            })?)
        }
    };
    info!(
        provider = provider.provider_name(),
        model = provider.model_name(),
        "Language model configured"
    );
    Ok(Some(provider))
}
