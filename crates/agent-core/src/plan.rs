//! Step and plan model.

use action_primitives::{ActionArgs, ActionKind};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Planning annotations carried alongside a step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepMetadata {
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_outcome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

/// One atomic browser action with its arguments.
///
/// `action == None` is the no-op step the fallback planner emits when it has
/// nothing better; the executor rejects it before dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(rename = "type")]
    pub action: Option<ActionKind>,
    #[serde(default)]
    pub args: ActionArgs,
    #[serde(default)]
    pub metadata: StepMetadata,
}

impl Step {
    pub fn new(action: ActionKind, args: ActionArgs) -> Self {
        Self {
            action: Some(action),
            args,
            metadata: StepMetadata::default(),
        }
    }

    pub fn noop() -> Self {
        Self {
            action: None,
            args: ActionArgs::new(),
            metadata: StepMetadata::default(),
        }
    }

    pub fn navigate(url: impl Into<String>) -> Self {
        Self::new(ActionKind::Navigate, args_of(json!({ "url": url.into() })))
    }

    pub fn extract_text(selector: impl Into<String>) -> Self {
        Self::new(
            ActionKind::ExtractText,
            args_of(json!({ "selector": selector.into() })),
        )
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.metadata.reason = reason.into();
        self
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.metadata.fallback = Some(fallback.into());
        self
    }

    pub fn arg_str(&self, key: &str) -> Option<&str> {
        self.args.get(key).and_then(Value::as_str)
    }

    /// Non-blank `selector` argument, if any
    pub fn selector(&self) -> Option<&str> {
        self.arg_str("selector").filter(|s| !s.trim().is_empty())
    }

    /// Action name for logs and prompts; `noop` when absent
    pub fn action_name(&self) -> &'static str {
        self.action.map(|kind| kind.as_str()).unwrap_or("noop")
    }
}

pub(crate) fn args_of(value: Value) -> ActionArgs {
    match value {
        Value::Object(map) => map,
        _ => ActionArgs::new(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource {
    /// Produced from a validated generative response
    Generated,
    /// Produced by the deterministic rule-based planner
    Fallback,
}

/// An ordered sequence of steps plus the criterion for success.
///
/// Plans are never edited once built; replanning replaces them whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    steps: Vec<Step>,
    success_criteria: String,
    source: PlanSource,
}

impl Plan {
    pub fn new(steps: Vec<Step>, success_criteria: impl Into<String>, source: PlanSource) -> Self {
        Self {
            steps,
            success_criteria: success_criteria.into(),
            source,
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn success_criteria(&self) -> &str {
        &self.success_criteria
    }

    pub fn source(&self) -> PlanSource {
        self.source
    }
}
