//! Stop Policy：是否可以停止继续询问智能体
//!
//! LlmStopPolicy 用一次 LLM 调用做 Yes/No 判定，本质是启发式的非确定性 oracle；
//! 回答大小写敏感地匹配字面肯定 token，其余内容（否定、拒答、展开说明、调用失败）一律视为继续。
//! trait 形态便于执行器测试注入确定性桩。

use std::sync::Arc;

use async_trait::async_trait;

use crate::llm::{LlmClient, Message};
use crate::orchestrator::Task;

/// 停止判定：给定任务与目前累积的响应，决定是否不再执行后续步骤
#[async_trait]
pub trait StopPolicy: Send + Sync {
    async fn should_stop(&self, task: &Task, responses: &[String]) -> bool;
}

/// 停止判定提示词模板：{task} / {responses}
const STOP_PROMPT: &str = "\
Given the following task from the user: {task}\n\
And the following responses from agents: {responses}\n\
Please determine if the orchestrator can stop querying agents.\n\
ANSWER: Yes/No";

/// 肯定 token，大小写敏感
const AFFIRMATIVE: &str = "Yes";

/// 基于 LLM 的停止判定
pub struct LlmStopPolicy {
    llm: Arc<dyn LlmClient>,
    prompt_template: String,
}

impl LlmStopPolicy {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            prompt_template: STOP_PROMPT.to_string(),
        }
    }
}

#[async_trait]
impl StopPolicy for LlmStopPolicy {
    async fn should_stop(&self, task: &Task, responses: &[String]) -> bool {
        let prompt = self
            .prompt_template
            .replace("{task}", &task.input)
            .replace("{responses}", &responses.join("\n"));
        match self.llm.complete(&[Message::user(prompt)]).await {
            Ok(answer) => answer.contains(AFFIRMATIVE),
            Err(e) => {
                tracing::warn!(error = %e, "stop policy call failed, continuing");
                false
            }
        }
    }
}
