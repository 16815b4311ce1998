use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::PageId;

/// Errors raised by a live page while reading from it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PageError {
    /// The page (or its browser) has gone away.
    #[error("page closed: {0}")]
    Closed(String),

    /// Script evaluation failed inside the page.
    #[error("script evaluation failed: {0}")]
    Evaluation(String),

    /// Transport-level failure talking to the browser.
    #[error("browser I/O error: {0}")]
    Io(String),
}

/// A live document the automation layers can inspect.
///
/// Implementations wrap a concrete browser tab. Reads must not mutate page
/// state; mutation goes through the action layer.
#[async_trait]
pub trait BrowserPage: Send + Sync + fmt::Debug {
    /// Stable identifier of this page for logging and correlation.
    fn id(&self) -> &PageId;

    /// Current document URL.
    async fn url(&self) -> Result<String, PageError>;

    /// Current document title.
    async fn title(&self) -> Result<String, PageError>;

    /// Evaluate a JavaScript function expression in the page.
    ///
    /// `script` is a function expression such as `(sel) => ...`; it is
    /// invoked with `arg` (or no argument when `None`) and its JSON-serialisable
    /// return value is handed back.
    async fn evaluate(&self, script: &str, arg: Option<Value>) -> Result<Value, PageError>;
}

/// Shared handle to a live page, exclusively used by one task run at a time.
pub type PageHandle = Arc<dyn BrowserPage>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct EchoPage {
        id: PageId,
    }

    #[async_trait]
    impl BrowserPage for EchoPage {
        fn id(&self) -> &PageId {
            &self.id
        }

        async fn url(&self) -> Result<String, PageError> {
            Ok("https://example.com/".to_string())
        }

        async fn title(&self) -> Result<String, PageError> {
            Ok("Example".to_string())
        }

        async fn evaluate(&self, _script: &str, arg: Option<Value>) -> Result<Value, PageError> {
            arg.ok_or_else(|| PageError::Evaluation("no argument".to_string()))
        }
    }

    #[tokio::test]
    async fn page_handle_is_object_safe() {
        let page: PageHandle = Arc::new(EchoPage { id: PageId::new() });
        assert_eq!(page.title().await.unwrap(), "Example");
        assert_eq!(
            page.evaluate("(x) => x", Some(json!(3))).await.unwrap(),
            json!(3)
        );
        let err = page.evaluate("() => 1", None).await.unwrap_err();
        assert_eq!(err.to_string(), "script evaluation failed: no argument");
    }
}
