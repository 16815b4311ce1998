use std::time::Duration;

use agent_core::{AgentError, ChatMessage, LlmError, LlmProvider, LlmResponse, TokenUsage};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::utils::extract_json_object;

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub temperature: f32,
    pub timeout: Duration,
}

/// Chat-completions client for OpenAI and API-compatible servers.
pub struct OpenAiLlmProvider {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiLlmProvider {
    pub fn new(config: OpenAiConfig) -> Result<Self, AgentError> {
        if config.api_key.trim().is_empty() {
            return Err(AgentError::invalid_request("missing OpenAI API key"));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| {
                AgentError::invalid_request(format!("failed to build HTTP client: {err}"))
            })?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        )
    }

    fn request_body(&self, messages: &[ChatMessage], json_mode: bool) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            response_format: json_mode.then(|| ResponseFormat {
                r#type: "json_object".to_string(),
            }),
            messages: messages.to_vec(),
        }
    }

    async fn send(&self, body: &ChatCompletionRequest) -> Result<LlmResponse, LlmError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| LlmError::Transport(format!("openai request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<response unavailable>".to_string());
            warn!(target: "openai", %status, "Request rejected");
            return Err(LlmError::Rejected(format!("openai returned {status}: {text}")));
        }

        let response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| LlmError::Transport(format!("openai response invalid: {err}")))?;
        into_llm_response(response, &self.config.model)
    }
}

#[async_trait]
impl LlmProvider for OpenAiLlmProvider {
    async fn complete_json(&self, prompt: &str, schema: &Value) -> Result<Value, LlmError> {
        let messages = [
            ChatMessage::system(format!(
                "Respond with a single JSON object that conforms to this JSON schema:\n{schema}"
            )),
            ChatMessage::user(prompt),
        ];
        let response = self.send(&self.request_body(&messages, true)).await?;
        let json = extract_json_object(&response.content)
            .ok_or_else(|| LlmError::MalformedJson("response holds no JSON object".to_string()))?;
        debug!(target: "openai", chars = json.len(), "JSON completion received");
        serde_json::from_str(&json).map_err(|err| LlmError::MalformedJson(err.to_string()))
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<LlmResponse, LlmError> {
        self.send(&self.request_body(messages, false)).await
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}

fn into_llm_response(
    response: ChatCompletionResponse,
    requested_model: &str,
) -> Result<LlmResponse, LlmError> {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| LlmError::MalformedJson("openai response missing content".to_string()))?;
    Ok(LlmResponse {
        content,
        model: response
            .model
            .unwrap_or_else(|| requested_model.to_string()),
        usage: response.usage.map(|usage| TokenUsage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
        }),
    })
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    r#type: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}
