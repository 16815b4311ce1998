//! Per-step judgment and the end-of-run completion check.

use std::sync::Arc;

use action_primitives::ActionKind;
use once_cell::sync::Lazy;
use perceiver_structural::{PageStructure, StructuralAnalyzer};
use pilot_core_types::PageHandle;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::LlmError;
use crate::executor::StepResult;
use crate::llm_provider::{complete_typed, LlmProvider};
use crate::orchestrator::ExecutionLogEntry;
use crate::plan::Step;
use crate::prompt;

/// Extractions at or below this many characters do not count as an answer.
const MEANINGFUL_TEXT_CHARS: usize = 10;

pub static EVALUATION_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "success": { "type": "boolean", "description": "Whether the step executed successfully" },
            "task_complete": { "type": "boolean", "description": "Whether the overall task is now complete" },
            "confidence": { "type": "number", "minimum": 0, "maximum": 1 },
            "error": { "type": "string", "description": "Error description if the step failed" },
            "result": { "type": "string", "description": "Extracted result if the task is complete" },
            "should_replan": { "type": "boolean" },
            "replan_reason": { "type": "string" },
            "next_action_hint": { "type": "string" }
        },
        "required": ["success", "task_complete"]
    })
});

static COMPLETION_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "complete": { "type": "boolean" },
            "result": { "type": "string" },
            "reason": { "type": "string" }
        },
        "required": ["complete"]
    })
});

/// Judgment of one executed step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub success: bool,
    pub task_complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default)]
    pub should_replan: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replan_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_action_hint: Option<String>,
}

impl Evaluation {
    fn step_failed(error: &str) -> Self {
        Self {
            success: false,
            task_complete: false,
            error: Some(error.to_string()),
            should_replan: true,
            replan_reason: Some(format!("step failed: {error}")),
            ..Self::default()
        }
    }

    fn judgment_failed(reason: impl std::fmt::Display) -> Self {
        Self {
            success: true,
            task_complete: false,
            error: Some(format!("evaluation failed: {reason}")),
            ..Self::default()
        }
    }
}

/// Whole-run completion verdict.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionCheck {
    pub complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Everything the evaluator may look at for one step.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationRequest<'a> {
    pub step: &'a Step,
    pub result: &'a StepResult,
    pub page: Option<&'a PageHandle>,
    pub task: &'a str,
    pub remaining_steps: usize,
    pub structure: Option<&'a PageStructure>,
}

#[derive(Clone, Default)]
pub struct ResultEvaluator {
    llm: Option<Arc<dyn LlmProvider>>,
    analyzer: StructuralAnalyzer,
}

impl ResultEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_llm(mut self, llm: Arc<dyn LlmProvider>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn with_analyzer(mut self, analyzer: StructuralAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn uses_llm(&self) -> bool {
        self.llm.is_some()
    }

    pub async fn evaluate(&self, request: EvaluationRequest<'_>) -> Evaluation {
        if !request.result.ok {
            let error = request.result.error.as_deref().unwrap_or("unknown error");
            return Evaluation::step_failed(error);
        }

        match &self.llm {
            None => heuristic(request.step, request.result, request.remaining_steps),
            Some(llm) => match self.judge(llm.as_ref(), request).await {
                Ok(evaluation) => evaluation,
                Err(err) => {
                    warn!(error = %err, "Step evaluation degraded");
                    Evaluation::judgment_failed(err)
                }
            },
        }
    }

    /// Look back over the run for a successful extraction that answers the task.
    pub async fn check_task_completion(
        &self,
        task: &str,
        execution_log: &[ExecutionLogEntry],
        page: Option<&PageHandle>,
    ) -> CompletionCheck {
        let Some(llm) = &self.llm else {
            return scan_for_extraction(execution_log);
        };

        let log_json = serde_json::to_string_pretty(execution_log).unwrap_or_default();
        let url = match page {
            Some(page) => page.url().await.ok(),
            None => None,
        };
        let prompt = prompt::completion_prompt(task, &log_json, url.as_deref());
        match complete_typed::<CompletionCheck>(llm.as_ref(), &prompt, &COMPLETION_SCHEMA).await {
            Ok(check) => check,
            Err(err) => {
                warn!(error = %err, "Completion check degraded");
                CompletionCheck {
                    complete: false,
                    result: None,
                    reason: Some("evaluation failed".to_string()),
                }
            }
        }
    }

    async fn judge(
        &self,
        llm: &dyn LlmProvider,
        request: EvaluationRequest<'_>,
    ) -> Result<Evaluation, LlmError> {
        let analyzed;
        let structure = match (request.structure, request.page) {
            (Some(structure), _) => Some(structure),
            (None, Some(page)) => {
                analyzed = self.analyzer.analyze(page.as_ref()).await;
                Some(&analyzed)
            }
            (None, None) => None,
        };
        let page_context = structure.map(PageStructure::prompt_context);

        // StepResult never serializes its page handle.
        let step_json = serde_json::to_string_pretty(request.step).unwrap_or_default();
        let result_json = serde_json::to_string_pretty(request.result).unwrap_or_default();
        let prompt = prompt::evaluation_prompt(
            request.task,
            &step_json,
            &result_json,
            page_context.as_deref(),
            request.remaining_steps,
        );

        let evaluation: Evaluation = complete_typed(llm, &prompt, &EVALUATION_SCHEMA).await?;
        if let Some(confidence) = evaluation.confidence {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(LlmError::Schema(format!(
                    "confidence {confidence} outside [0, 1]"
                )));
            }
        }
        debug!(
            success = evaluation.success,
            task_complete = evaluation.task_complete,
            "Step judged"
        );
        Ok(evaluation)
    }
}

fn heuristic(step: &Step, result: &StepResult, remaining_steps: usize) -> Evaluation {
    if step.action == Some(ActionKind::ExtractText) && remaining_steps == 0 {
        if let Some(text) = result_text(result) {
            if text.chars().count() > MEANINGFUL_TEXT_CHARS {
                return Evaluation {
                    success: true,
                    task_complete: true,
                    confidence: Some(0.7),
                    result: Some(text),
                    ..Evaluation::default()
                };
            }
        }
    }

    Evaluation {
        success: true,
        task_complete: remaining_steps == 0,
        confidence: Some(0.5),
        ..Evaluation::default()
    }
}

fn result_text(result: &StepResult) -> Option<String> {
    match result.result.as_ref()? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn scan_for_extraction(execution_log: &[ExecutionLogEntry]) -> CompletionCheck {
    let found = execution_log.iter().find_map(|entry| match entry {
        ExecutionLogEntry::Execution { step, result }
            if result.ok && step.action == Some(ActionKind::ExtractText) =>
        {
            result_text(result).filter(|text| !text.trim().is_empty())
        }
        _ => None,
    });

    match found {
        Some(text) => CompletionCheck {
            complete: true,
            result: Some(text),
            reason: None,
        },
        None => CompletionCheck {
            complete: false,
            result: None,
            reason: Some("no meaningful result extracted".to_string()),
        },
    }
}
