//! Application configuration: YAML file, then environment, then CLI flags.

use std::path::PathBuf;

use action_primitives::ControllerConfig;
use agent_core::OrchestratorConfig;
use anyhow::{Context, Result};
use perceiver_structural::AnalyzerConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub agent: OrchestratorConfig,
    pub analyzer: AnalyzerConfig,
    pub llm: LlmConfig,
    pub browser: BrowserConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    /// Deterministic planning and evaluation only
    #[default]
    None,
    Mock,
    Openai,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProviderKind,
    pub model: String,
    pub base_url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub temperature: f32,
    pub timeout_secs: u64,
    /// Canned answers for the `mock` provider, cycled in order.
    pub mock_responses: Vec<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProviderKind::None,
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            temperature: 0.2,
            timeout_secs: 60,
            mock_responses: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    pub executable: Option<PathBuf>,
    pub user_data_dir: Option<PathBuf>,
    pub no_sandbox: bool,
    pub navigation_timeout_ms: u64,
    pub wait_timeout_ms: u64,
    pub allowed_schemes: Vec<String>,
    pub loop_threshold: usize,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        let controller = ControllerConfig::default();
        Self {
            headless: true,
            executable: None,
            user_data_dir: None,
            no_sandbox: false,
            navigation_timeout_ms: 30_000,
            wait_timeout_ms: 10_000,
            allowed_schemes: controller.allowed_schemes,
            loop_threshold: controller.loop_threshold,
        }
    }
}

impl BrowserConfig {
    pub fn controller(&self) -> ControllerConfig {
        ControllerConfig {
            allowed_schemes: self.allowed_schemes.clone(),
            loop_threshold: self.loop_threshold,
            ..ControllerConfig::default()
        }
    }

    #[cfg(feature = "chromium")]
    pub fn chromium(&self) -> cdp_adapter::ChromiumConfig {
        cdp_adapter::ChromiumConfig {
            executable: self.executable.clone(),
            user_data_dir: self.user_data_dir.clone(),
            headless: self.headless,
            no_sandbox: self.no_sandbox,
            navigation_timeout_ms: self.navigation_timeout_ms,
            wait_timeout_ms: self.wait_timeout_ms,
            ..cdp_adapter::ChromiumConfig::default()
        }
    }
}

impl AppConfig {
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse config file")
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Apply `WEBPILOT_*` overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(provider) = get("WEBPILOT_LLM_PROVIDER") {
            self.llm.provider = <LlmProviderKind as clap::ValueEnum>::from_str(&provider, true)
                .map_err(|_| anyhow::anyhow!("invalid WEBPILOT_LLM_PROVIDER: {provider}"))?;
        }
        if let Some(model) = get("WEBPILOT_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(base_url) = get("WEBPILOT_LLM_BASE_URL") {
            self.llm.base_url = base_url;
        }
        if self.llm.api_key.is_none() {
            self.llm.api_key = get(&self.llm.api_key_env);
        }
        if let Some(headless) = get("WEBPILOT_HEADLESS") {
            self.browser.headless =
                !matches!(headless.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off");
        }
        if let Some(max_steps) = get("WEBPILOT_MAX_STEPS") {
            self.agent.max_steps = max_steps
                .parse()
                .with_context(|| format!("invalid WEBPILOT_MAX_STEPS: {max_steps}"))?;
        }
        if let Some(max_retries) = get("WEBPILOT_MAX_RETRIES") {
            self.agent.max_retries = max_retries
                .parse()
                .with_context(|| format!("invalid WEBPILOT_MAX_RETRIES: {max_retries}"))?;
        }
        Ok(())
    }
}
