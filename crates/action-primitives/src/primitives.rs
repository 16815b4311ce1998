//! Low-level browser primitives and the typed action they are driven by

use std::time::Duration;

use async_trait::async_trait;
use pilot_core_types::PageHandle;
use serde_json::Value;

use crate::errors::ActionError;
use crate::types::{ActionArgs, ActionKind};

/// Primitives a concrete browser backend must provide.
///
/// Every method except [`BrowserActions::go_to_url`] runs against an
/// already-open page.
#[async_trait]
pub trait BrowserActions: Send + Sync {
    /// Load `url` and return the handle of the page now showing it
    async fn go_to_url(&self, url: &str) -> Result<PageHandle, ActionError>;

    async fn click(&self, page: &PageHandle, selector: &str) -> Result<(), ActionError>;

    async fn fill(&self, page: &PageHandle, selector: &str, text: &str)
        -> Result<(), ActionError>;

    async fn extract_text(&self, page: &PageHandle, selector: &str)
        -> Result<String, ActionError>;

    /// Scroll `selector` into view, or the viewport down when `None`
    async fn scroll(&self, page: &PageHandle, selector: Option<&str>) -> Result<(), ActionError>;

    async fn wait_for(
        &self,
        page: &PageHandle,
        selector: &str,
        timeout: Option<Duration>,
    ) -> Result<(), ActionError>;

    /// PNG bytes of the viewport or the full page
    async fn screenshot(&self, page: &PageHandle, full_page: bool)
        -> Result<Vec<u8>, ActionError>;

    /// Close a page opened by [`BrowserActions::go_to_url`]
    async fn release_page(&self, _page: &PageHandle) {}
}

/// Typed form of an `(ActionKind, args)` pair
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserAction {
    Navigate { url: String },
    Click { selector: String },
    Fill { selector: String, text: String },
    ExtractText { selector: String },
    Wait { selector: String, timeout: Option<Duration> },
    Screenshot { full_page: bool },
    Scroll { selector: Option<String> },
}

impl BrowserAction {
    /// Build the typed action, checking that required arguments are present
    pub fn from_parts(kind: ActionKind, args: &ActionArgs) -> Result<Self, ActionError> {
        let name = kind.as_str();
        let action = match kind {
            ActionKind::Navigate => BrowserAction::Navigate {
                url: required(args, name, "url")?,
            },
            ActionKind::Click => BrowserAction::Click {
                selector: required(args, name, "selector")?,
            },
            ActionKind::Fill => BrowserAction::Fill {
                selector: required(args, name, "selector")?,
                text: args
                    .get("text")
                    .or_else(|| args.get("value"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or(ActionError::MissingArgument {
                        action: name,
                        argument: "text",
                    })?,
            },
            ActionKind::ExtractText => BrowserAction::ExtractText {
                selector: required(args, name, "selector")?,
            },
            ActionKind::Wait => BrowserAction::Wait {
                selector: required(args, name, "selector")?,
                timeout: args
                    .get("timeout_ms")
                    .and_then(Value::as_u64)
                    .map(Duration::from_millis),
            },
            ActionKind::Screenshot => BrowserAction::Screenshot {
                full_page: args
                    .get("full_page")
                    .and_then(Value::as_bool)
                    .unwrap_or(true),
            },
            ActionKind::Scroll => BrowserAction::Scroll {
                selector: optional_str(args, "selector"),
            },
        };
        Ok(action)
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            BrowserAction::Navigate { .. } => ActionKind::Navigate,
            BrowserAction::Click { .. } => ActionKind::Click,
            BrowserAction::Fill { .. } => ActionKind::Fill,
            BrowserAction::ExtractText { .. } => ActionKind::ExtractText,
            BrowserAction::Wait { .. } => ActionKind::Wait,
            BrowserAction::Screenshot { .. } => ActionKind::Screenshot,
            BrowserAction::Scroll { .. } => ActionKind::Scroll,
        }
    }
}

fn optional_str(args: &ActionArgs, key: &str) -> Option<String> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string)
}

fn required(
    args: &ActionArgs,
    action: &'static str,
    argument: &'static str,
) -> Result<String, ActionError> {
    optional_str(args, argument).ok_or(ActionError::MissingArgument { action, argument })
}
