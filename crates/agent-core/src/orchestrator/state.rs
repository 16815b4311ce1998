use std::fmt;

use pilot_core_types::PageHandle;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::executor::ExecutedStep;
use crate::plan::{Plan, Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Planning,
    Executing,
    Evaluating,
    Replanning,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Planning => "planning",
            TaskStatus::Executing => "executing",
            TaskStatus::Evaluating => "evaluating",
            TaskStatus::Replanning => "replanning",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable state of a single run. Created per run and dropped with it.
#[derive(Debug)]
pub struct OrchestratorState {
    pub task: String,
    pub status: TaskStatus,
    pub current_plan: Option<Plan>,
    pub executed_steps: Vec<ExecutedStep>,
    pub current_step_index: usize,
    pub retry_count: usize,
    pub steps_executed: usize,
    /// Page the run currently works on
    pub page: Option<PageHandle>,
    /// `page` was opened by this run rather than supplied by the caller
    pub owns_page: bool,
}

impl OrchestratorState {
    pub fn new(task: impl Into<String>, page: Option<PageHandle>) -> Self {
        Self {
            task: task.into(),
            status: TaskStatus::Pending,
            current_plan: None,
            executed_steps: Vec::new(),
            current_step_index: 0,
            retry_count: 0,
            steps_executed: 0,
            page,
            owns_page: false,
        }
    }

    pub fn transition(&mut self, status: TaskStatus) {
        if self.status != status {
            debug!(from = %self.status, to = %status, "Orchestrator state change");
            self.status = status;
        }
    }

    /// True when there is no plan or the cursor ran past its end
    pub fn needs_plan(&self) -> bool {
        match &self.current_plan {
            None => true,
            Some(plan) => self.current_step_index >= plan.len(),
        }
    }

    /// Swap in a new plan and rewind the cursor.
    pub fn replace_plan(&mut self, plan: Plan) {
        self.current_plan = Some(plan);
        self.current_step_index = 0;
    }

    pub fn discard_plan(&mut self) {
        self.current_plan = None;
        self.current_step_index = 0;
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.current_plan
            .as_ref()
            .and_then(|plan| plan.step(self.current_step_index))
    }

    pub fn advance(&mut self) {
        self.current_step_index += 1;
    }

    /// Planned steps after the one at the cursor
    pub fn remaining_steps(&self) -> usize {
        self.current_plan
            .as_ref()
            .map(|plan| plan.len().saturating_sub(self.current_step_index + 1))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::PlanSource;

    #[test]
    fn new_state_is_pending_and_empty() {
        let state = OrchestratorState::new("Test task", None);
        assert_eq!(state.task, "Test task");
        assert_eq!(state.status, TaskStatus::Pending);
        assert!(state.current_plan.is_none());
        assert!(state.executed_steps.is_empty());
        assert_eq!(state.current_step_index, 0);
        assert!(state.needs_plan());
    }

    #[test]
    fn cursor_tracks_plan() {
        let mut state = OrchestratorState::new("t", None);
        state.replace_plan(Plan::new(
            vec![Step::navigate("https://a.test"), Step::extract_text("body")],
            "done",
            PlanSource::Fallback,
        ));
        assert!(!state.needs_plan());
        assert_eq!(state.remaining_steps(), 1);

        state.advance();
        assert_eq!(state.current_step().and_then(|s| s.selector()), Some("body"));
        assert_eq!(state.remaining_steps(), 0);

        state.advance();
        assert!(state.needs_plan());
        assert!(state.current_step().is_none());

        state.discard_plan();
        assert_eq!(state.current_step_index, 0);
    }

    #[test]
    fn status_strings() {
        let all = [
            (TaskStatus::Pending, "pending"),
            (TaskStatus::Planning, "planning"),
            (TaskStatus::Executing, "executing"),
            (TaskStatus::Evaluating, "evaluating"),
            (TaskStatus::Replanning, "replanning"),
            (TaskStatus::Completed, "completed"),
            (TaskStatus::Failed, "failed"),
        ];
        for (status, name) in all {
            assert_eq!(status.to_string(), name);
            assert_eq!(serde_json::to_value(status).unwrap(), name);
        }
        assert!(TaskStatus::Failed.is_terminal());
        assert!(!TaskStatus::Replanning.is_terminal());
    }
}
