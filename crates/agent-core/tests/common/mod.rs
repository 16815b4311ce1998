#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use action_primitives::{
    ActionError, ActionExecutor, ActionKind, ActionOutcome, ActionRequest,
};
use agent_core::{MockLlmProvider, Step};
use async_trait::async_trait;
use parking_lot::Mutex;
use perceiver_structural::scripts;
use pilot_core_types::{BrowserPage, PageError, PageHandle, PageId};
use serde_json::{json, Value};

/// Page that knows a fixed set of selectors and answers every other script
/// with an empty result.
#[derive(Debug, Default)]
pub struct FakePage {
    id: PageId,
    url: String,
    selectors: HashSet<String>,
}

impl FakePage {
    pub fn new(url: &str) -> Self {
        Self {
            id: PageId::new(),
            url: url.to_string(),
            selectors: HashSet::new(),
        }
    }

    pub fn with_selector(mut self, selector: &str) -> Self {
        self.selectors.insert(selector.to_string());
        self
    }

    pub fn handle(self) -> PageHandle {
        Arc::new(self)
    }
}

#[async_trait]
impl BrowserPage for FakePage {
    fn id(&self) -> &PageId {
        &self.id
    }

    async fn url(&self) -> Result<String, PageError> {
        Ok(self.url.clone())
    }

    async fn title(&self) -> Result<String, PageError> {
        Ok("Fake".to_string())
    }

    async fn evaluate(&self, script: &str, arg: Option<Value>) -> Result<Value, PageError> {
        if script == scripts::ELEMENT_STATE {
            let selector = arg.as_ref().and_then(Value::as_str).unwrap_or_default();
            if self.selectors.contains(selector) {
                return Ok(json!({
                    "visible": true, "enabled": true, "text": "", "value": "",
                    "tagName": "button", "type": "",
                    "boundingBox": { "x": 0.0, "y": 0.0, "width": 10.0, "height": 10.0 }
                }));
            }
            return Ok(Value::Null);
        }
        if script == scripts::MAIN_CONTENT {
            return Ok(json!("Fake page body"));
        }
        Ok(json!([]))
    }
}

/// What a [`ScriptedActions`] saw for one dispatch.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub kind: ActionKind,
    pub args: Value,
    pub page_url: Option<String>,
}

/// Size of the fake screenshot payload in bytes
pub const SCREENSHOT_BYTES: usize = 1_000_000;

/// Action capability with canned behaviour per kind:
/// navigate opens a [`FakePage`], extract_text returns `extract_text`,
/// screenshot yields a large base64 artifact, `#missing` fails, everything
/// else succeeds.
pub struct ScriptedActions {
    pub extract_text: String,
    seen: Mutex<Vec<SeenRequest>>,
    released: Mutex<Vec<String>>,
}

impl ScriptedActions {
    pub fn new(extract_text: &str) -> Arc<Self> {
        Arc::new(Self {
            extract_text: extract_text.to_string(),
            seen: Mutex::new(Vec::new()),
            released: Mutex::new(Vec::new()),
        })
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().clone()
    }

    /// URLs of pages handed back through `release_page`
    pub fn released(&self) -> Vec<String> {
        self.released.lock().clone()
    }
}

#[async_trait]
impl ActionExecutor for ScriptedActions {
    async fn execute_action(&self, request: ActionRequest) -> Result<ActionOutcome, ActionError> {
        let page_url = match &request.page {
            Some(page) => page.url().await.ok(),
            None => None,
        };
        self.seen.lock().push(SeenRequest {
            kind: request.kind,
            args: Value::Object(request.args.clone()),
            page_url,
        });

        let outcome = match request.kind {
            ActionKind::Navigate => {
                let url = request.arg_str("url").unwrap_or_default();
                ActionOutcome::success(Some(json!("navigated")))
                    .with_page(FakePage::new(url).with_selector("body").handle())
            }
            ActionKind::ExtractText => ActionOutcome::success(Some(json!(self.extract_text))),
            ActionKind::Screenshot => {
                let encoded = "A".repeat(SCREENSHOT_BYTES / 3 * 4);
                ActionOutcome::success(Some(json!({ "format": "png", "bytes": SCREENSHOT_BYTES })))
                    .with_artifact(encoded)
            }
            _ if request.arg_str("selector") == Some("#missing") => {
                ActionOutcome::failure("Element not found: #missing")
            }
            _ => ActionOutcome::success(Some(json!("done"))),
        };
        Ok(outcome)
    }

    async fn release_page(&self, page: &PageHandle) {
        let url = page.url().await.unwrap_or_default();
        self.released.lock().push(url);
    }
}

/// Dispatch always blows up.
pub struct BrokenActions;

#[async_trait]
impl ActionExecutor for BrokenActions {
    async fn execute_action(&self, _request: ActionRequest) -> Result<ActionOutcome, ActionError> {
        Err(ActionError::BrowserIo("connection reset".to_string()))
    }
}

/// Dispatch panics.
pub struct PanickingActions;

#[async_trait]
impl ActionExecutor for PanickingActions {
    async fn execute_action(&self, _request: ActionRequest) -> Result<ActionOutcome, ActionError> {
        panic!("driver crashed");
    }
}

pub fn mock_llm<I, S>(responses: I) -> Arc<MockLlmProvider>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Arc::new(MockLlmProvider::with_responses(responses))
}

pub fn click(selector: Option<&str>) -> Step {
    let args = match selector {
        Some(selector) => json!({ "selector": selector }),
        None => json!({}),
    };
    Step::new(
        ActionKind::Click,
        args.as_object().cloned().unwrap_or_default(),
    )
}
