//! 编排错误分类
//!
//! 传播策略：解析类失败（计划 / 评估）就地恢复为保守默认值，不中断整次任务；
//! 只有名册完整性（UnknownAgent）与构造期配置错误（Config）向调用方冒泡。

use thiserror::Error;

/// 一次编排运行中可能出现的错误
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// 计划文本无法解析出任何有效步骤（仅在调用方要求至少一步时致命）
    #[error("Plan parse error: {0}")]
    PlanParse(String),

    /// 步骤引用了名册中不存在的智能体，对当前运行致命
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    /// 评估输出无法解析；Critic 内部捕获并降级为中性裁决，不会外泄
    #[error("Evaluation parse error: {0}")]
    EvaluationParse(String),

    /// 构造期配置错误（max_iterations 非正、名册重名等）
    #[error("Config error: {0}")]
    Config(String),

    /// LLM 调用失败（传输层）
    #[error("LLM error: {0}")]
    Llm(String),
}
