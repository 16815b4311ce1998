use thiserror::Error;

/// Errors emitted by the agent-core crate.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Raised when a task is malformed or missing required fields.
    #[error("invalid agent request: {0}")]
    InvalidRequest(String),

    /// Raised when an operation needs a generative backend and none is configured.
    #[error("no language model configured")]
    LlmUnavailable,

    /// Raised when the generative backend fails where no fallback exists.
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// Raised when orchestration reaches a state it should never be in.
    #[error("internal orchestration error: {0}")]
    Internal(String),
}

impl AgentError {
    /// Helper for wrapping static string errors.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

/// Failures of the generative text capability.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// Network or HTTP failure talking to the backend.
    #[error("llm transport error: {0}")]
    Transport(String),

    /// The backend answered with something that is not JSON.
    #[error("llm returned malformed JSON: {0}")]
    MalformedJson(String),

    /// JSON parsed but does not satisfy the requested schema.
    #[error("llm response violates schema: {0}")]
    Schema(String),

    /// The backend rejected the request (auth, quota, bad model, ...).
    #[error("llm request rejected: {0}")]
    Rejected(String),
}
