use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::LlmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// Abstraction over generative backends so multiple vendors can plug into the agent core.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Ask for a JSON value shaped by `schema` (a JSON Schema document).
    async fn complete_json(&self, prompt: &str, schema: &Value) -> Result<Value, LlmError>;

    /// Free-form chat completion.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<LlmResponse, LlmError>;

    fn model_name(&self) -> &str;

    fn provider_name(&self) -> &str;
}

/// `complete_json` followed by a typed decode; decode failures are schema violations.
pub async fn complete_typed<T: DeserializeOwned>(
    provider: &dyn LlmProvider,
    prompt: &str,
    schema: &Value,
) -> Result<T, LlmError> {
    let value = provider.complete_json(prompt, schema).await?;
    serde_json::from_value(value).map_err(|err| LlmError::Schema(err.to_string()))
}

const MOCK_DEFAULT_RESPONSE: &str = r#"{"action": "noop", "reason": "mock response"}"#;

type ResponseHandler = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// One recorded call against [`MockLlmProvider`].
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    CompleteJson { prompt: String, schema: Value },
    Chat { messages: Vec<ChatMessage> },
}

impl MockCall {
    pub fn prompt(&self) -> &str {
        match self {
            MockCall::CompleteJson { prompt, .. } => prompt,
            MockCall::Chat { messages } => messages.last().map(|m| m.content.as_str()).unwrap_or(""),
        }
    }
}

#[derive(Default)]
struct MockState {
    call_count: usize,
    history: Vec<MockCall>,
}

/// Deterministic provider used for tests and offline development.
///
/// Answers come from a handler when one is set, otherwise from the canned
/// list in round-robin order (`call_count % len`).
#[derive(Clone, Default)]
pub struct MockLlmProvider {
    responses: Vec<String>,
    handler: Option<ResponseHandler>,
    state: Arc<Mutex<MockState>>,
}

impl fmt::Debug for MockLlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockLlmProvider")
            .field("responses", &self.responses.len())
            .field("handler", &self.handler.is_some())
            .field("call_count", &self.call_count())
            .finish()
    }
}

impl MockLlmProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: responses.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_handler(handler: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self {
            handler: Some(Arc::new(handler)),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().call_count
    }

    pub fn call_history(&self) -> Vec<MockCall> {
        self.state.lock().history.clone()
    }

    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.call_count = 0;
        state.history.clear();
    }

    fn respond(&self, call: MockCall) -> String {
        let mut state = self.state.lock();
        let content = if let Some(handler) = &self.handler {
            handler(call.prompt())
        } else if self.responses.is_empty() {
            MOCK_DEFAULT_RESPONSE.to_string()
        } else {
            self.responses[state.call_count % self.responses.len()].clone()
        };
        state.call_count += 1;
        state.history.push(call);
        content
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    async fn complete_json(&self, prompt: &str, schema: &Value) -> Result<Value, LlmError> {
        let content = self.respond(MockCall::CompleteJson {
            prompt: prompt.to_string(),
            schema: schema.clone(),
        });
        serde_json::from_str(&content).map_err(|err| LlmError::MalformedJson(err.to_string()))
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<LlmResponse, LlmError> {
        let content = self.respond(MockCall::Chat {
            messages: messages.to_vec(),
        });
        Ok(LlmResponse {
            content,
            model: self.model_name().to_string(),
            usage: None,
        })
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}
