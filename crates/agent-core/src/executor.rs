//! Step validation, dispatch and bounded retry with generative correction.

use std::sync::Arc;

use action_primitives::{ActionExecutor, ActionKind, ActionRequest};
use perceiver_structural::StructuralAnalyzer;
use pilot_core_types::PageHandle;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::llm_provider::{complete_typed, LlmProvider};
use crate::plan::Step;
use crate::planner::{PlanItem, STEP_SCHEMA};
use crate::prompt;

const DEFAULT_SUGGESTION: &str = "Try a different selector";

/// Outcome of executing one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub step: Step,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_outcome: Option<String>,
    /// Hint offered when validation rejects a selector
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Error variant when dispatch itself failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception_kind: Option<String>,
    /// Binary payload from the action (base64 screenshot). Never serialized,
    /// so prompts built from results stay small.
    #[serde(skip)]
    pub artifact: Option<String>,
    /// Page produced by the action (navigation)
    #[serde(skip)]
    pub page: Option<PageHandle>,
}

impl StepResult {
    fn rejected(step: &Step, error: impl Into<String>) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(error.into()),
            step: step.clone(),
            expected_outcome: None,
            suggestion: None,
            exception_kind: None,
            artifact: None,
            page: None,
        }
    }

    fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Result text when the action produced a string
    pub fn text(&self) -> Option<&str> {
        self.result.as_ref().and_then(Value::as_str)
    }
}

/// A step paired with what happened when it ran.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutedStep {
    pub step: Step,
    pub result: StepResult,
}

/// Runs steps against the action capability after validating them.
#[derive(Clone, Default)]
pub struct StepExecutor {
    actions: Option<Arc<dyn ActionExecutor>>,
    analyzer: Option<StructuralAnalyzer>,
    llm: Option<Arc<dyn LlmProvider>>,
}

impl StepExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_actions(mut self, actions: Arc<dyn ActionExecutor>) -> Self {
        self.actions = Some(actions);
        self
    }

    pub fn with_analyzer(mut self, analyzer: StructuralAnalyzer) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    pub fn with_llm(mut self, llm: Arc<dyn LlmProvider>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub async fn execute(&self, step: &Step, page: Option<&PageHandle>) -> StepResult {
        let Some(kind) = step.action else {
            return StepResult::rejected(step, "no action type");
        };

        if kind.requires_selector() {
            let Some(selector) = step.selector() else {
                return StepResult::rejected(step, format!("no selector for {kind}"))
                    .with_suggestion(fallback_hint(step));
            };

            if let (Some(page), Some(analyzer)) = (page, &self.analyzer) {
                let context = analyzer.element_context(page.as_ref(), selector).await;
                if !context.exists {
                    let mut error = format!("selector not found: {selector}");
                    if let Some(fallback) = &step.metadata.fallback {
                        error.push_str(&format!(" (fallback: {fallback})"));
                    }
                    debug!(action = %kind, selector, "Rejected step before dispatch");
                    return StepResult::rejected(step, error).with_suggestion(fallback_hint(step));
                }
            }
        }

        let Some(actions) = &self.actions else {
            return StepResult::rejected(step, "no controller available");
        };

        let mut request = ActionRequest::new(kind, step.args.clone());
        if kind != ActionKind::Navigate {
            if let Some(page) = page {
                request = request.with_page(page.clone());
            }
        }

        match actions.execute_action(request).await {
            Ok(outcome) => StepResult {
                ok: outcome.ok,
                result: outcome.result,
                error: outcome.error,
                step: step.clone(),
                expected_outcome: step.metadata.expected_outcome.clone(),
                suggestion: None,
                exception_kind: None,
                artifact: outcome.artifact,
                page: outcome.page,
            },
            Err(err) => {
                warn!(action = %kind, error = %err, "Action dispatch failed");
                let mut result = StepResult::rejected(step, err.to_string());
                result.exception_kind = Some(err.kind().to_string());
                result
            }
        }
    }

    /// Hand a page the run no longer needs back to the action capability.
    pub async fn release_page(&self, page: &PageHandle) {
        if let Some(actions) = &self.actions {
            actions.release_page(page).await;
        }
    }

    /// Up to `max_attempts` tries; between tries a corrected step may replace
    /// the current one. Returns the last observed result.
    pub async fn execute_with_retry(
        &self,
        step: &Step,
        page: Option<&PageHandle>,
        max_attempts: usize,
    ) -> StepResult {
        let attempts = max_attempts.max(1);
        let mut current = step.clone();
        let mut last = self.execute(&current, page).await;

        for attempt in 1..attempts {
            if last.ok || is_malformed(&current) {
                break;
            }
            if let Some(corrected) = self.correction(&current, &last, page).await {
                info!(attempt, action = corrected.action_name(), "Retrying with corrected step");
                current = corrected;
            } else {
                debug!(attempt, "Retrying step unchanged");
            }
            last = self.execute(&current, page).await;
        }
        last
    }

    async fn correction(
        &self,
        step: &Step,
        failed: &StepResult,
        page: Option<&PageHandle>,
    ) -> Option<Step> {
        let llm = self.llm.as_ref()?;

        let page_context = match (page, &self.analyzer) {
            (Some(page), Some(analyzer)) => Some(analyzer.analyze(page.as_ref()).await.prompt_context()),
            _ => None,
        };
        let step_json = serde_json::to_string(step).unwrap_or_default();
        let prompt = prompt::correction_prompt(
            &step_json,
            failed.error.as_deref().unwrap_or("unknown error"),
            page_context.as_deref(),
        );

        match complete_typed::<PlanItem>(llm.as_ref(), &prompt, &STEP_SCHEMA).await {
            Ok(item) => Some(item.to_step()),
            Err(err) => {
                warn!(error = %err, "Step correction unavailable");
                None
            }
        }
    }
}

/// Steps rejected for a missing action or selector are not worth retrying
fn is_malformed(step: &Step) -> bool {
    match step.action {
        None => true,
        Some(kind) => kind.requires_selector() && step.selector().is_none(),
    }
}

fn fallback_hint(step: &Step) -> String {
    step.metadata
        .fallback
        .clone()
        .unwrap_or_else(|| DEFAULT_SUGGESTION.to_string())
}
