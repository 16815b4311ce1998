//! Request and outcome types shared by every action backend

use std::fmt;
use std::str::FromStr;

use pilot_core_types::PageHandle;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ActionError;

/// Free-form action arguments (`url`, `selector`, `text`, `full_page`, ...)
pub type ActionArgs = Map<String, Value>;

/// Closed set of browser actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    #[serde(alias = "goto")]
    Navigate,
    Click,
    Fill,
    ExtractText,
    Wait,
    Screenshot,
    Scroll,
}

impl ActionKind {
    pub const ALL: [ActionKind; 7] = [
        ActionKind::Navigate,
        ActionKind::Click,
        ActionKind::Fill,
        ActionKind::ExtractText,
        ActionKind::Wait,
        ActionKind::Screenshot,
        ActionKind::Scroll,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Navigate => "navigate",
            ActionKind::Click => "click",
            ActionKind::Fill => "fill",
            ActionKind::ExtractText => "extract_text",
            ActionKind::Wait => "wait",
            ActionKind::Screenshot => "screenshot",
            ActionKind::Scroll => "scroll",
        }
    }

    /// Kinds that target a page element and therefore need a selector
    pub fn requires_selector(&self) -> bool {
        matches!(
            self,
            ActionKind::Click
                | ActionKind::Fill
                | ActionKind::ExtractText
                | ActionKind::Wait
                | ActionKind::Scroll
        )
    }

    /// Kinds that operate on an existing page
    pub fn requires_page(&self) -> bool {
        !matches!(self, ActionKind::Navigate)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "navigate" | "goto" => Ok(ActionKind::Navigate),
            "click" => Ok(ActionKind::Click),
            "fill" => Ok(ActionKind::Fill),
            "extract_text" => Ok(ActionKind::ExtractText),
            "wait" => Ok(ActionKind::Wait),
            "screenshot" => Ok(ActionKind::Screenshot),
            "scroll" => Ok(ActionKind::Scroll),
            _ => Err(ActionError::UnknownAction(s.to_string())),
        }
    }
}

/// One action to perform, with the page it should run against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRequest {
    pub kind: ActionKind,
    #[serde(default)]
    pub args: ActionArgs,
    #[serde(skip)]
    pub page: Option<PageHandle>,
}

impl ActionRequest {
    pub fn new(kind: ActionKind, args: ActionArgs) -> Self {
        Self {
            kind,
            args,
            page: None,
        }
    }

    pub fn with_page(mut self, page: PageHandle) -> Self {
        self.page = Some(page);
        self
    }

    pub fn arg_str(&self, key: &str) -> Option<&str> {
        self.args.get(key).and_then(Value::as_str)
    }
}

/// Result of a single dispatch
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActionOutcome {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Base64 payload of a binary result (screenshot PNG); `result` only
    /// carries its summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
    /// Page produced by a navigation; callers adopt it for later steps
    #[serde(skip)]
    pub page: Option<PageHandle>,
}

impl ActionOutcome {
    pub fn success(result: Option<Value>) -> Self {
        Self {
            ok: true,
            result,
            error: None,
            artifact: None,
            page: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(error.into()),
            artifact: None,
            page: None,
        }
    }

    pub fn with_artifact(mut self, artifact: String) -> Self {
        self.artifact = Some(artifact);
        self
    }

    pub fn with_page(mut self, page: PageHandle) -> Self {
        self.page = Some(page);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_kinds_and_alias() {
        assert_eq!("navigate".parse::<ActionKind>().unwrap(), ActionKind::Navigate);
        assert_eq!("goto".parse::<ActionKind>().unwrap(), ActionKind::Navigate);
        assert_eq!(
            "extract_text".parse::<ActionKind>().unwrap(),
            ActionKind::ExtractText
        );
        let err = "hover".parse::<ActionKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown action type: hover");
    }

    #[test]
    fn serde_uses_snake_case() {
        let kind: ActionKind = serde_json::from_str("\"extract_text\"").unwrap();
        assert_eq!(kind, ActionKind::ExtractText);
        assert_eq!(
            serde_json::to_string(&ActionKind::Screenshot).unwrap(),
            "\"screenshot\""
        );
        for kind in ActionKind::ALL {
            assert_eq!(kind.as_str().parse::<ActionKind>().unwrap(), kind);
        }
    }

    #[test]
    fn selector_requirements() {
        assert!(!ActionKind::Navigate.requires_selector());
        assert!(!ActionKind::Screenshot.requires_selector());
        assert!(ActionKind::Scroll.requires_selector());
        assert!(ActionKind::Fill.requires_page());
        assert!(!ActionKind::Navigate.requires_page());
    }
}
