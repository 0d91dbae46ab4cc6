//! 核心编排层：错误类型、成本函数、Task Runner、编排上下文

pub mod cost;
pub mod error;
pub mod orchestrator;
pub mod task_runner;

pub use cost::{cost_per_token, ModelType};
pub use error::{AgentError, CostError, SetupError, TaskError};
pub use orchestrator::OrchestrationContext;
pub use task_runner::{run_task, RunStatus, Stage, StageOutcome, TaskResult, TaskRun};
