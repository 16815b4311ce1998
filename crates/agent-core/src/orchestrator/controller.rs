//! Plan → execute → evaluate → replan loop.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use action_primitives::ActionExecutor;
use futures::FutureExt;
use perceiver_structural::{PageStructure, StructuralAnalyzer};
use pilot_core_types::{PageHandle, TaskId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::config::OrchestratorConfig;
use super::log::ExecutionLogEntry;
use super::state::{OrchestratorState, TaskStatus};
use crate::errors::AgentError;
use crate::evaluator::{EvaluationRequest, ResultEvaluator};
use crate::executor::{ExecutedStep, StepExecutor};
use crate::llm_provider::{ChatMessage, LlmProvider};
use crate::planner::{PlanGenerator, PlannerConfig};
use crate::prompt;

/// Terminal artifact of a run.
#[derive(Debug, Clone, Serialize)]
pub struct TaskResult {
    pub task_id: TaskId,
    pub success: bool,
    pub task: String,
    pub status: TaskStatus,
    pub steps_executed: usize,
    pub final_result: Option<String>,
    pub execution_log: Vec<ExecutionLogEntry>,
    pub error: Option<String>,
    pub total_time_ms: u64,
}

/// One-shot strategic analysis of a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskAnalysis {
    pub task: String,
    pub analysis: String,
    pub model: String,
}

/// Coordinates planner, executor and evaluator for a task.
///
/// Holds no per-run state, so one instance can drive several runs at once;
/// each run owns its own [`OrchestratorState`] and page.
#[derive(Clone)]
pub struct Orchestrator {
    config: OrchestratorConfig,
    planner: PlanGenerator,
    executor: StepExecutor,
    evaluator: ResultEvaluator,
    analyzer: Option<StructuralAnalyzer>,
    llm: Option<Arc<dyn LlmProvider>>,
}

impl Orchestrator {
    pub fn new(config: OrchestratorConfig) -> Self {
        let planner = PlanGenerator::new(PlannerConfig {
            lookahead_steps: config.lookahead_steps,
        });
        Self {
            config,
            planner,
            executor: StepExecutor::new(),
            evaluator: ResultEvaluator::new(),
            analyzer: None,
            llm: None,
        }
    }

    /// Share one generative backend across planning, correction and (when
    /// enabled) evaluation.
    pub fn with_llm(mut self, llm: Arc<dyn LlmProvider>) -> Self {
        self.planner = self.planner.with_llm(llm.clone());
        self.executor = self.executor.with_llm(llm.clone());
        if self.config.llm_evaluation {
            self.evaluator = self.evaluator.with_llm(llm.clone());
        }
        self.llm = Some(llm);
        self
    }

    pub fn with_actions(mut self, actions: Arc<dyn ActionExecutor>) -> Self {
        self.executor = self.executor.with_actions(actions);
        self
    }

    pub fn with_analyzer(mut self, analyzer: StructuralAnalyzer) -> Self {
        self.executor = self.executor.with_analyzer(analyzer.clone());
        self.evaluator = self.evaluator.with_analyzer(analyzer.clone());
        self.analyzer = Some(analyzer);
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run `task` to a terminal state. Never panics or returns an error:
    /// faults become a failed [`TaskResult`].
    pub async fn execute_task(&self, task: &str, page: Option<PageHandle>) -> TaskResult {
        let task_id = TaskId::new();
        let started = Instant::now();
        let mut state = OrchestratorState::new(task, page);
        let mut log = Vec::new();

        info!(task_id = %task_id, task, "Starting task");
        let outcome = AssertUnwindSafe(self.run(&mut state, &mut log))
            .catch_unwind()
            .await;

        let (success, final_result, error) = match outcome {
            Ok(Ok(RunOutcome::Completed(result))) => (true, result, None),
            Ok(Ok(RunOutcome::Failed { error, salvaged })) => (false, salvaged, Some(error)),
            Ok(Err(err)) => (false, None, Some(err.to_string())),
            Err(panic) => (false, None, Some(panic_message(panic.as_ref()))),
        };
        if state.owns_page {
            if let Some(page) = state.page.take() {
                self.executor.release_page(&page).await;
            }
        }
        state.transition(if success {
            TaskStatus::Completed
        } else {
            TaskStatus::Failed
        });

        match &error {
            None => info!(task_id = %task_id, steps = state.steps_executed, "Task completed"),
            Some(error) => {
                warn!(task_id = %task_id, steps = state.steps_executed, error = %error, "Task failed")
            }
        }

        TaskResult {
            task_id,
            success,
            task: task.to_string(),
            status: state.status,
            steps_executed: state.steps_executed,
            final_result,
            execution_log: log,
            error,
            total_time_ms: started.elapsed().as_millis() as u64,
        }
    }

    /// One generative call describing goal, sub-goals, risks and success
    /// criteria. Executes nothing.
    pub async fn analyze_task(&self, task: &str) -> Result<TaskAnalysis, AgentError> {
        if task.trim().is_empty() {
            return Err(AgentError::invalid_request("task cannot be empty"));
        }
        let llm = self.llm.as_ref().ok_or(AgentError::LlmUnavailable)?;
        let messages = [
            ChatMessage::system(prompt::ORCHESTRATOR_SYSTEM_PROMPT),
            ChatMessage::user(prompt::analysis_prompt(task)),
        ];
        let response = llm.chat(&messages).await?;
        Ok(TaskAnalysis {
            task: task.to_string(),
            analysis: response.content,
            model: response.model,
        })
    }

    async fn run(
        &self,
        state: &mut OrchestratorState,
        log: &mut Vec<ExecutionLogEntry>,
    ) -> Result<RunOutcome, AgentError> {
        while state.steps_executed < self.config.max_steps {
            state.transition(TaskStatus::Planning);
            if state.needs_plan() {
                let structure = self.snapshot(state.page.as_ref()).await;
                let plan = self
                    .planner
                    .plan(&state.task, structure.as_ref(), &state.executed_steps)
                    .await;
                if plan.is_empty() {
                    return Ok(RunOutcome::failed("could not create plan"));
                }
                info!(steps = plan.len(), source = ?plan.source(), "New plan");
                log.push(ExecutionLogEntry::Planning { plan: plan.clone() });
                state.replace_plan(plan);
            }

            state.transition(TaskStatus::Executing);
            let step = state
                .current_step()
                .cloned()
                .ok_or_else(|| AgentError::internal("plan cursor out of range"))?;
            let result = self
                .executor
                .execute_with_retry(&step, state.page.as_ref(), self.config.executor_retries)
                .await;
            if let Some(page) = &result.page {
                self.adopt_page(state, page.clone()).await;
            }
            // A correction may have replaced the planned step.
            let executed = result.step.clone();
            state.steps_executed += 1;
            log.push(ExecutionLogEntry::Execution {
                step: executed.clone(),
                result: result.clone(),
            });
            state.executed_steps.push(ExecutedStep {
                step: executed.clone(),
                result: result.clone(),
            });

            state.transition(TaskStatus::Evaluating);
            let evaluation = self
                .evaluator
                .evaluate(EvaluationRequest {
                    step: &executed,
                    result: &result,
                    page: state.page.as_ref(),
                    task: &state.task,
                    remaining_steps: state.remaining_steps(),
                    structure: None,
                })
                .await;
            log.push(ExecutionLogEntry::Evaluation {
                evaluation: evaluation.clone(),
            });

            if evaluation.task_complete {
                return Ok(RunOutcome::Completed(evaluation.result));
            }
            if evaluation.success {
                state.advance();
                continue;
            }

            state.retry_count += 1;
            let error = evaluation
                .error
                .clone()
                .unwrap_or_else(|| "unknown error".to_string());
            if state.retry_count > self.config.max_retries {
                return Ok(RunOutcome::failed(format!("max retries exceeded: {error}")));
            }

            state.transition(TaskStatus::Replanning);
            state.discard_plan();
            let reason = evaluation.replan_reason.unwrap_or(error);
            warn!(retry = state.retry_count, reason = %reason, "Replanning");
            log.push(ExecutionLogEntry::Replanning { reason });
        }

        let check = self
            .evaluator
            .check_task_completion(&state.task, log, state.page.as_ref())
            .await;
        Ok(RunOutcome::Failed {
            error: "max steps exceeded".to_string(),
            salvaged: check.result.filter(|_| check.complete),
        })
    }

    /// Switch the run to `page`. A tab the run opened itself is released
    /// once abandoned; a page handed in by the caller is left alone.
    async fn adopt_page(&self, state: &mut OrchestratorState, page: PageHandle) {
        debug!(page = %page.id(), "Adopting page from action");
        let id = page.id().clone();
        if let Some(previous) = state.page.replace(page) {
            if state.owns_page && previous.id() != &id {
                self.executor.release_page(&previous).await;
            }
        }
        state.owns_page = true;
    }

    async fn snapshot(&self, page: Option<&PageHandle>) -> Option<PageStructure> {
        match (page, &self.analyzer) {
            (Some(page), Some(analyzer)) => Some(analyzer.analyze(page.as_ref()).await),
            _ => None,
        }
    }
}

enum RunOutcome {
    Completed(Option<String>),
    Failed {
        error: String,
        salvaged: Option<String>,
    },
}

impl RunOutcome {
    fn failed(error: impl Into<String>) -> Self {
        RunOutcome::Failed {
            error: error.into(),
            salvaged: None,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("unexpected fault: {detail}")
}
