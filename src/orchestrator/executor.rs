//! StepExecutor：按序分派计划步骤
//!
//! 对每个 Step 构造重述任务与子任务的提示词，按名查找智能体并调用；
//! 未知名称是致命的 UnknownAgent（Planner 已在解析期过滤，执行期命中说明名册不一致）。
//! 每步之后咨询 StopPolicy，为 true 则提前终止，剩余步骤不执行：
//! 智能体调用即一次 LLM 往返，省掉不必要的步骤是第一级设计目标而非优化。

use std::sync::Arc;

use crate::agents::AgentRegistry;
use crate::error::OrchestratorError;
use crate::orchestrator::{Plan, StepResult, StopPolicy, Task};

/// 单步提示词模板：{task} / {query}
const STEP_PROMPT: &str = "\
Given the User's task: {task}\n\
And the following query from the orchestrator: {query}\n\
Please provide a response to the query.";

pub struct StepExecutor {
    registry: Arc<AgentRegistry>,
    stop: Arc<dyn StopPolicy>,
    prompt_template: String,
}

impl StepExecutor {
    pub fn new(registry: Arc<AgentRegistry>, stop: Arc<dyn StopPolicy>) -> Self {
        Self {
            registry,
            stop,
            prompt_template: STEP_PROMPT.to_string(),
        }
    }

    pub(crate) fn set_stop_policy(&mut self, stop: Arc<dyn StopPolicy>) {
        self.stop = stop;
    }

    /// 顺序执行计划；返回按到达顺序累积的 StepResult 序列
    pub async fn execute(
        &self,
        task: &Task,
        plan: &Plan,
    ) -> Result<Vec<StepResult>, OrchestratorError> {
        let mut results = Vec::with_capacity(plan.steps.len());
        let mut responses: Vec<String> = Vec::with_capacity(plan.steps.len());

        for (index, step) in plan.steps.iter().enumerate() {
            let agent = self.registry.get(&step.agent)?;
            let prompt = self
                .prompt_template
                .replace("{task}", &task.input)
                .replace("{query}", &step.subtask);
            tracing::debug!(step = index, agent = %step.agent, subtask = %step.subtask, "dispatching step");

            let response = match agent.respond(&prompt).await {
                Ok(response) => response,
                Err(e @ OrchestratorError::UnknownAgent(_)) => return Err(e),
                Err(e) => {
                    // 单个智能体失败不挨饿聚合阶段：记录错误文本并继续
                    tracing::warn!(agent = %step.agent, error = %e, "agent failed, recording error as response");
                    format!("Error: {}", e)
                }
            };
            tracing::debug!(agent = %step.agent, response = %response, "step response");

            responses.push(response.clone());
            results.push(StepResult {
                step: step.clone(),
                response,
            });

            if self.stop.should_stop(task, &responses).await {
                tracing::debug!(
                    executed = results.len(),
                    planned = plan.steps.len(),
                    "stop policy satisfied, terminating early"
                );
                break;
            }
        }

        Ok(results)
    }
}
