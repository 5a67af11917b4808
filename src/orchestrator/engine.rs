//! Orchestrator：计划-执行-评估主流程
//!
//! run(task) = 构造 Task -> Planner 分解 -> StepExecutor 按序分派（每步咨询 StopPolicy）
//! -> Aggregator 合并 -> Critic 对合并结果做最终评估 -> (final_answer, verdict)。
//! 一次 run 内严格单逻辑线程；Plan 与 StepResult 序列归本次调用独占，调用结束即丢弃。

use std::sync::Arc;

use uuid::Uuid;

use crate::agents::AgentRegistry;
use crate::config::OrchestratorSection;
use crate::error::OrchestratorError;
use crate::llm::LlmClient;
use crate::orchestrator::{
    Aggregator, AgentDescriptor, Critic, LlmStopPolicy, Planner, StepExecutor, StopPolicy, Task,
    Verdict,
};

pub struct Orchestrator {
    planner: Planner,
    executor: StepExecutor,
    aggregator: Aggregator,
    critic: Critic,
    roster: Vec<AgentDescriptor>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("roster", &self.roster)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// 组装编排器；名册为空是构造期配置错误
    pub fn new(
        llm: Arc<dyn LlmClient>,
        registry: Arc<AgentRegistry>,
        roster: Vec<AgentDescriptor>,
        cfg: &OrchestratorSection,
    ) -> Result<Self, OrchestratorError> {
        if roster.is_empty() {
            return Err(OrchestratorError::Config(
                "agent roster is empty".to_string(),
            ));
        }

        let planner = Planner::new(llm.clone()).with_require_steps(cfg.require_steps);
        let stop: Arc<dyn StopPolicy> = Arc::new(LlmStopPolicy::new(llm.clone()));
        Ok(Self {
            planner,
            executor: StepExecutor::new(registry, stop),
            aggregator: Aggregator::new(llm.clone()),
            critic: Critic::new(llm),
            roster,
        })
    }

    /// 替换停止判定（测试注入确定性桩）
    pub fn with_stop_policy(mut self, stop: Arc<dyn StopPolicy>) -> Self {
        self.executor.set_stop_policy(stop);
        self
    }

    /// 执行一次任务，返回最终回答与对它的裁决。
    /// 只会因 UnknownAgent 或规划期 LLM 传输失败而出错，其余子组件失败各自降级。
    pub async fn run(&self, task_text: &str) -> Result<(String, Verdict), OrchestratorError> {
        let run_id = Uuid::new_v4();
        let task = Task::new(task_text);
        tracing::info!(%run_id, task = %task.input, "orchestration started");

        let plan = self.planner.decompose(&task, &self.roster).await?;
        tracing::debug!(%run_id, goal = %plan.goal, steps = plan.steps.len(), "plan ready");

        let results = self.executor.execute(&task, &plan).await?;
        let responses: Vec<String> = results.iter().map(|r| r.response.clone()).collect();
        tracing::debug!(%run_id, executed = results.len(), "steps done");

        let answer = self.aggregator.combine(&task, &responses).await;
        let verdict = self
            .critic
            .evaluate(&task, "orchestrator", &task.input, &answer)
            .await;

        tracing::info!(%run_id, has_error = verdict.has_error, "orchestration finished");
        Ok((answer, verdict))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentHandle;
    use crate::llm::ScriptedLlm;
    use async_trait::async_trait;

    struct StubAgent {
        name: String,
        reply: String,
    }

    #[async_trait]
    impl AgentHandle for StubAgent {
        fn name(&self) -> &str {
            &self.name
        }

        async fn respond(&self, _query: &str) -> Result<String, OrchestratorError> {
            Ok(self.reply.clone())
        }
    }

    fn roster() -> Vec<AgentDescriptor> {
        vec![AgentDescriptor {
            name: "math".into(),
            role: "arithmetic".into(),
        }]
    }

    fn registry() -> Arc<AgentRegistry> {
        let mut registry = AgentRegistry::new();
        registry
            .register(Arc::new(StubAgent {
                name: "math".into(),
                reply: "4".into(),
            }))
            .unwrap();
        Arc::new(registry)
    }

    #[test]
    fn test_empty_roster_rejected() {
        let llm = Arc::new(ScriptedLlm::new(Vec::<String>::new()));
        let err = Orchestrator::new(
            llm,
            Arc::new(AgentRegistry::new()),
            vec![],
            &OrchestratorSection::default(),
        )
        .unwrap_err();
        assert!(matches!(err, OrchestratorError::Config(_)));
    }

    #[tokio::test]
    async fn test_run_single_step() {
        // 调用序：plan、stop、aggregate、eval
        let llm = Arc::new(ScriptedLlm::new(vec![
            "math: 2+2;",
            "Yes",
            "The answer is 4.",
            "false: : correct",
        ]));
        let orchestrator = Orchestrator::new(
            llm,
            registry(),
            roster(),
            &OrchestratorSection::default(),
        )
        .unwrap();

        let (answer, verdict) = orchestrator.run("What is 2+2?").await.unwrap();
        assert_eq!(answer, "The answer is 4.");
        assert!(!verdict.has_error);
        assert_eq!(verdict.explanation, "correct");
    }

    #[tokio::test]
    async fn test_run_with_empty_plan_still_answers() {
        // 规划输出无法解析 -> 空计划 -> 执行器短路 -> 聚合降级为空拼接，但评估仍运行
        let llm = Arc::new(ScriptedLlm::new(vec![
            "cannot help with that",
            "A shrug.",
            "false: : nothing to check",
        ]));
        let orchestrator = Orchestrator::new(
            llm,
            registry(),
            roster(),
            &OrchestratorSection::default(),
        )
        .unwrap();

        let (answer, verdict) = orchestrator.run("unplannable").await.unwrap();
        assert_eq!(answer, "A shrug.");
        assert!(!verdict.has_error);
    }
}
