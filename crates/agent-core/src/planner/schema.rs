//! Structured-response schema for plan generation and its typed form.

use action_primitives::{ActionArgs, ActionKind};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::plan::{Step, StepMetadata};

const ACTION_NAMES: [&str; 7] = [
    "navigate",
    "click",
    "fill",
    "extract_text",
    "wait",
    "screenshot",
    "scroll",
];

/// JSON Schema for a single plan item; also used for step corrections.
pub static STEP_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "step_number": { "type": "integer" },
            "action": { "type": "string", "enum": ACTION_NAMES },
            "selector": { "type": "string", "description": "CSS selector for the target element" },
            "value": { "type": "string", "description": "URL for navigate, text for fill" },
            "reason": { "type": "string", "description": "Why this step is needed" },
            "expected_outcome": { "type": "string" },
            "fallback": { "type": "string", "description": "What to try if this step fails" }
        },
        "required": ["action", "reason"]
    })
});

pub static PLAN_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "steps": { "type": "array", "items": STEP_SCHEMA.clone() },
            "success_criteria": { "type": "string", "description": "How to tell the task is done" }
        },
        "required": ["steps", "success_criteria"]
    })
});

/// Typed plan response; decoding fails on unknown actions or missing fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResponse {
    pub steps: Vec<PlanItem>,
    pub success_criteria: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanItem {
    #[serde(default)]
    pub step_number: u32,
    pub action: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_outcome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

impl PlanItem {
    /// Map the item onto step arguments.
    ///
    /// `navigate` takes its URL from `value` (else `selector`), `fill` takes
    /// `selector` plus `text` from `value`, `screenshot` is always full-page,
    /// every other kind takes `selector`.
    pub fn to_step(&self) -> Step {
        let mut args = ActionArgs::new();
        match self.action {
            ActionKind::Navigate => {
                if let Some(url) = self.value.as_ref().or(self.selector.as_ref()) {
                    args.insert("url".into(), Value::String(url.clone()));
                }
            }
            ActionKind::Fill => {
                if let Some(selector) = &self.selector {
                    args.insert("selector".into(), Value::String(selector.clone()));
                }
                args.insert(
                    "text".into(),
                    Value::String(self.value.clone().unwrap_or_default()),
                );
            }
            ActionKind::Screenshot => {
                args.insert("full_page".into(), Value::Bool(true));
            }
            ActionKind::Click | ActionKind::ExtractText | ActionKind::Wait | ActionKind::Scroll => {
                if let Some(selector) = &self.selector {
                    args.insert("selector".into(), Value::String(selector.clone()));
                }
            }
        }

        Step {
            action: Some(self.action),
            args,
            metadata: StepMetadata {
                reason: self.reason.clone(),
                expected_outcome: self.expected_outcome.clone(),
                fallback: self.fallback.clone(),
            },
        }
    }
}
