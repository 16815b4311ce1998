//! Budgets and switches for one orchestrated run.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Total executed steps before the run fails.
    /// Default: 20
    pub max_steps: usize,

    /// Failed evaluations tolerated before the run fails.
    /// Default: 3
    pub max_retries: usize,

    /// Steps requested from the planner per planning call.
    /// Default: 4
    pub lookahead_steps: usize,

    /// Attempts the executor makes per step before handing the result on.
    /// Default: 1
    pub executor_retries: usize,

    /// Whether a configured language model also judges step results.
    /// Default: true
    pub llm_evaluation: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_steps: 20,
            max_retries: 3,
            lookahead_steps: 4,
            executor_retries: 1,
            llm_evaluation: true,
        }
    }
}

impl OrchestratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a minimal config for testing.
    pub fn minimal() -> Self {
        Self {
            max_steps: 5,
            max_retries: 1,
            lookahead_steps: 2,
            executor_retries: 1,
            llm_evaluation: false,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_lookahead_steps(mut self, lookahead_steps: usize) -> Self {
        self.lookahead_steps = lookahead_steps;
        self
    }

    pub fn with_executor_retries(mut self, executor_retries: usize) -> Self {
        self.executor_retries = executor_retries;
        self
    }

    pub fn with_llm_evaluation(mut self, enabled: bool) -> Self {
        self.llm_evaluation = enabled;
        self
    }
}
