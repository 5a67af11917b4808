//! 计划-执行-评估核心：分解、分派、停止判定、聚合、评估与主流程

pub mod aggregator;
pub mod critic;
pub mod engine;
pub mod executor;
pub mod planner;
pub mod stop;
pub mod task;

pub use aggregator::Aggregator;
pub use critic::{Critic, Verdict};
pub use engine::Orchestrator;
pub use executor::StepExecutor;
pub use planner::{parse_plan_output, Planner};
pub use stop::{LlmStopPolicy, StopPolicy};
pub use task::{AgentDescriptor, Plan, Step, StepResult, Task};
