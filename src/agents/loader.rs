//! 智能体装配：从名册构建注册表
//!
//! 声明了 tools 的条目装配为 ToolAgent（绑定命名的工具子集），其余装配为有界重试 Worker。
//! 绑定了未注册工具、重名、空名册都是构造期配置错误。

use std::sync::Arc;

use crate::agents::{AgentRegistry, ToolAgent, Worker};
use crate::config::{OrchestratorSection, RosterConfig};
use crate::error::OrchestratorError;
use crate::llm::LlmClient;
use crate::orchestrator::{AgentDescriptor, Critic};
use crate::tools::ToolExecutor;

/// 从名册构建 (注册表, 描述符列表)；描述符保持名册声明顺序
pub fn load_agents(
    llm: Arc<dyn LlmClient>,
    roster: &RosterConfig,
    executor: Arc<ToolExecutor>,
    cfg: &OrchestratorSection,
) -> Result<(AgentRegistry, Vec<AgentDescriptor>), OrchestratorError> {
    roster.validate()?;

    let available = executor.tool_names();
    let mut registry = AgentRegistry::new();

    for spec in &roster.agents {
        if spec.tools.is_empty() {
            let worker = Worker::new(
                spec.name.clone(),
                llm.clone(),
                Critic::new(llm.clone()),
                spec.role_prompt(),
                cfg.max_iterations,
            )?;
            registry.register(Arc::new(worker))?;
        } else {
            for tool in &spec.tools {
                if !available.iter().any(|t| t == tool) {
                    return Err(OrchestratorError::Config(format!(
                        "agent {} is bound to unknown tool: {}",
                        spec.name, tool
                    )));
                }
            }
            let agent = ToolAgent::new(
                spec.name.clone(),
                llm.clone(),
                executor.clone(),
                spec.role_prompt(),
                spec.tools.clone(),
                cfg.max_agent_steps,
            )?;
            registry.register(Arc::new(agent))?;
        }
        tracing::debug!(agent = %spec.name, tools = spec.tools.len(), "agent loaded");
    }

    Ok((registry, roster.descriptors()))
}
