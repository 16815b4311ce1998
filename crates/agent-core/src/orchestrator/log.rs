use serde::Serialize;

use crate::evaluator::Evaluation;
use crate::executor::StepResult;
use crate::plan::{Plan, Step};

/// One phase record in a run's append-only log.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ExecutionLogEntry {
    Planning { plan: Plan },
    Execution { step: Step, result: StepResult },
    Evaluation { evaluation: Evaluation },
    Replanning { reason: String },
}

impl ExecutionLogEntry {
    pub fn phase(&self) -> &'static str {
        match self {
            ExecutionLogEntry::Planning { .. } => "planning",
            ExecutionLogEntry::Execution { .. } => "execution",
            ExecutionLogEntry::Evaluation { .. } => "evaluation",
            ExecutionLogEntry::Replanning { .. } => "replanning",
        }
    }
}
