//! Worker：带有界重试的无工具智能体
//!
//! 对单次 respond 包一层评估-重试循环：每轮一次 LLM 调用，Critic 裁决本轮回答；
//! 无错即完成，有错则采用裁决建议的新问题继续，直到迭代预算耗尽。
//! 预算耗尽按软成功处理，返回最后一轮回答（下游聚合不应被饿着）。
//! WorkerState 归单次 respond 独占，结束即丢弃，从不跨任务或跨智能体共享。

use std::sync::Arc;

use async_trait::async_trait;

use crate::agents::AgentHandle;
use crate::error::OrchestratorError;
use crate::llm::{LlmClient, Message};
use crate::orchestrator::{Critic, Task};

/// 单次重试循环的私有状态：iteration 从 0 起计，history 按 (user, assistant) 对累积
#[derive(Debug, Default)]
pub struct WorkerState {
    pub iteration: usize,
    pub history: Vec<Message>,
    pub question: String,
}

impl WorkerState {
    /// INIT：iteration=0，当前问题取任务输入，历史为空
    pub fn init(input: &str) -> Self {
        Self {
            iteration: 0,
            history: Vec::new(),
            question: input.to_string(),
        }
    }
}

pub struct Worker {
    name: String,
    llm: Arc<dyn LlmClient>,
    critic: Critic,
    role_prompt: String,
    max_iterations: usize,
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("name", &self.name)
            .field("max_iterations", &self.max_iterations)
            .finish_non_exhaustive()
    }
}

impl Worker {
    /// max_iterations 必须为正，否则构造期拒绝
    pub fn new(
        name: impl Into<String>,
        llm: Arc<dyn LlmClient>,
        critic: Critic,
        role_prompt: impl Into<String>,
        max_iterations: usize,
    ) -> Result<Self, OrchestratorError> {
        if max_iterations == 0 {
            return Err(OrchestratorError::Config(
                "max_iterations must be positive".to_string(),
            ));
        }
        Ok(Self {
            name: name.into(),
            llm,
            critic,
            role_prompt: role_prompt.into(),
            max_iterations,
        })
    }
}

#[async_trait]
impl AgentHandle for Worker {
    fn name(&self) -> &str {
        &self.name
    }

    async fn respond(&self, query: &str) -> Result<String, OrchestratorError> {
        let task = Task::new(query);
        let mut state = WorkerState::init(query);

        loop {
            let mut messages = vec![Message::system(self.role_prompt.clone())];
            messages.extend(state.history.iter().cloned());
            messages.push(Message::user(state.question.clone()));

            let response = self
                .llm
                .complete(&messages)
                .await
                .map_err(OrchestratorError::Llm)?;

            state.history.push(Message::user(state.question.clone()));
            state.history.push(Message::assistant(response.clone()));

            let verdict = self
                .critic
                .evaluate(&task, &self.name, &state.question, &response)
                .await;

            if !verdict.has_error {
                tracing::debug!(agent = %self.name, iteration = state.iteration, "worker done");
                return Ok(response);
            }
            if state.iteration + 1 >= self.max_iterations {
                // 预算耗尽：软成功，返回最后可用回答
                tracing::debug!(
                    agent = %self.name,
                    iterations = self.max_iterations,
                    "worker budget exhausted, returning last response"
                );
                return Ok(response);
            }

            state.iteration += 1;
            if verdict.new_question.trim().is_empty() {
                tracing::warn!(agent = %self.name, "verdict suggested no new question, re-asking");
            } else {
                state.question = verdict.new_question;
            }
            tracing::debug!(agent = %self.name, iteration = state.iteration, question = %state.question, "worker retrying");
        }
    }
}
