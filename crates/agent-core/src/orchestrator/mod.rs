//! Orchestration of a task run.
//!
//! ```text
//! pending → planning → executing → evaluating → completed
//!                ↑                      │
//!                └──── replanning ◄─────┴──→ failed
//! ```
//!
//! Budgets (`max_steps`, `max_retries`) are the only way a run stops early.

pub mod config;
pub mod controller;
pub mod log;
pub mod state;

pub use config::OrchestratorConfig;
pub use controller::{Orchestrator, TaskAnalysis, TaskResult};
pub use log::ExecutionLogEntry;
pub use state::{OrchestratorState, TaskStatus};
