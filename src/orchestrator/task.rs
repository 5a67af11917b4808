//! 编排数据模型
//!
//! Task / Step / Plan / StepResult 为一次 run 调用内的短生命周期数据，由 Orchestrator 独占；
//! AgentDescriptor 来自名册，会话期间只读共享。Plan 与 Step 支持结构化（JSON）序列化，
//! 对应 LLM 被指示输出的首选格式。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// 名册条目投影：name 为稳定唯一标识，role 为自由文本能力描述，驱动计划提示词
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    pub name: String,
    pub role: String,
}

/// 一次用户调用的任务；创建后只读
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub input: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

impl Task {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            context: None,
            metadata: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// 计划中的单步：agent 必须命中名册中的某个 AgentDescriptor.name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub agent: String,
    pub subtask: String,
}

/// 有序步骤序列；由 Planner 产出，StepExecutor 只读消费。
/// 反序列化要求 steps 在场（缺 steps 的 JSON 不算结构化计划），goal 可缺省。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub goal: String,
    pub steps: Vec<Step>,
}

/// 单步执行结果；按到达顺序累积，顺序有语义（聚合阶段保序拼接）
#[derive(Debug, Clone)]
pub struct StepResult {
    pub step: Step,
    pub response: String,
}
