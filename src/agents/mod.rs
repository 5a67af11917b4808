//! 智能体层：句柄抽象、名称注册表与装配
//!
//! 所有智能体实现 AgentHandle（respond(query) -> text），由 AgentRegistry 按名注册与查找。
//! 注册表构造一次后只读共享，跨 run 调用无需加锁；按名精确匹配，缺失即 UnknownAgent。

pub mod loader;
pub mod tool_agent;
pub mod worker;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::OrchestratorError;

pub use loader::load_agents;
pub use tool_agent::ToolAgent;
pub use worker::{Worker, WorkerState};

/// 智能体句柄：可按名寻址的能力对象
#[async_trait]
pub trait AgentHandle: Send + Sync {
    /// 名册中的稳定唯一标识
    fn name(&self) -> &str;

    /// 回答一条来自编排器的查询
    async fn respond(&self, query: &str) -> Result<String, OrchestratorError>;
}

impl std::fmt::Debug for dyn AgentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentHandle")
            .field("name", &self.name())
            .finish()
    }
}

/// 名称键控的智能体表：register 拒绝重名（名册是唯一事实源），get 缺失返回 UnknownAgent
#[derive(Default, Debug)]
pub struct AgentRegistry {
    agents: HashMap<String, Arc<dyn AgentHandle>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, agent: Arc<dyn AgentHandle>) -> Result<(), OrchestratorError> {
        let name = agent.name().to_string();
        if self.agents.contains_key(&name) {
            return Err(OrchestratorError::Config(format!(
                "duplicate agent name: {}",
                name
            )));
        }
        self.agents.insert(name, agent);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn AgentHandle>, OrchestratorError> {
        self.agents
            .get(name)
            .cloned()
            .ok_or_else(|| OrchestratorError::UnknownAgent(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
