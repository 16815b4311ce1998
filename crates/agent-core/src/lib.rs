//! Agent core: plan generation, step execution, result evaluation and the
//! orchestrator that loops over them until a task completes or a budget runs out.

pub mod errors;
pub mod evaluator;
pub mod executor;
pub mod llm_provider;
pub mod orchestrator;
pub mod plan;
pub mod planner;
pub mod prompt;

pub use errors::{AgentError, LlmError};
pub use evaluator::{CompletionCheck, Evaluation, EvaluationRequest, ResultEvaluator};
pub use executor::{ExecutedStep, StepExecutor, StepResult};
pub use llm_provider::{
    complete_typed, ChatMessage, ChatRole, LlmProvider, LlmResponse, MockCall, MockLlmProvider,
    TokenUsage,
};
pub use orchestrator::{
    ExecutionLogEntry, Orchestrator, OrchestratorConfig, OrchestratorState, TaskAnalysis,
    TaskResult, TaskStatus,
};
pub use plan::{Plan, PlanSource, Step, StepMetadata};
pub use planner::{PlanGenerator, PlanItem, PlanResponse, PlannerConfig, RuleBasedPlanner};
