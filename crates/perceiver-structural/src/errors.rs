use pilot_core_types::PageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PerceiverError {
    #[error(transparent)]
    Page(#[from] PageError),
    #[error("unexpected script result: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for PerceiverError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
