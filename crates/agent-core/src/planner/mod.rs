mod rule_based;
pub mod schema;

use std::sync::Arc;

use perceiver_structural::PageStructure;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::LlmError;
use crate::executor::ExecutedStep;
use crate::llm_provider::{complete_typed, LlmProvider};
use crate::plan::{Plan, PlanSource};
use crate::prompt;

pub use rule_based::RuleBasedPlanner;
pub use schema::{PlanItem, PlanResponse, PLAN_SCHEMA, STEP_SCHEMA};

/// Planner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Steps requested per planning call; not a cap on the whole run.
    pub lookahead_steps: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self { lookahead_steps: 4 }
    }
}

/// Produces plans, preferring the generative backend and falling back to
/// [`RuleBasedPlanner`] whenever its answer is unusable.
#[derive(Clone, Default)]
pub struct PlanGenerator {
    llm: Option<Arc<dyn LlmProvider>>,
    config: PlannerConfig,
    fallback: RuleBasedPlanner,
}

impl PlanGenerator {
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn with_llm(mut self, llm: Arc<dyn LlmProvider>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Always returns a usable (possibly trivial) plan.
    pub async fn plan(
        &self,
        task: &str,
        structure: Option<&PageStructure>,
        executed: &[ExecutedStep],
    ) -> Plan {
        let Some(llm) = &self.llm else {
            return self.fallback.plan(task);
        };

        match self.generate(llm.as_ref(), task, structure, executed).await {
            Ok(plan) => {
                info!(steps = plan.len(), model = llm.model_name(), "Generated plan");
                plan
            }
            Err(err) => {
                warn!(error = %err, "Plan generation failed; using rule-based plan");
                self.fallback.plan(task)
            }
        }
    }

    async fn generate(
        &self,
        llm: &dyn LlmProvider,
        task: &str,
        structure: Option<&PageStructure>,
        executed: &[ExecutedStep],
    ) -> Result<Plan, LlmError> {
        let page_context = structure.map(PageStructure::prompt_context);
        let history = if executed.is_empty() {
            "None".to_string()
        } else {
            serde_json::to_string_pretty(executed).unwrap_or_else(|_| "None".to_string())
        };
        let prompt = prompt::planning_prompt(
            task,
            page_context.as_deref(),
            &history,
            self.config.lookahead_steps,
        );

        let response: PlanResponse = complete_typed(llm, &prompt, &PLAN_SCHEMA).await?;
        if response.steps.is_empty() {
            return Err(LlmError::Schema("plan has no steps".to_string()));
        }
        debug!(
            returned = response.steps.len(),
            lookahead = self.config.lookahead_steps,
            "Mapping plan response"
        );

        let steps = response
            .steps
            .iter()
            .take(self.config.lookahead_steps.max(1))
            .map(PlanItem::to_step)
            .collect();
        Ok(Plan::new(steps, response.success_criteria, PlanSource::Generated))
    }
}
