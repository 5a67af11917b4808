//! Aggregator：合并各步响应为最终回答
//!
//! 一次 LLM 调用；提示词按发射顺序拼接全部响应（不重排）。输出不做结构校验，
//! 非空文本即接受；调用失败或输出为空时降级为按序拼接的原始响应，保证下游始终拿到回答。

use std::sync::Arc;

use crate::llm::{LlmClient, Message};
use crate::orchestrator::Task;

/// 聚合提示词模板：{task} / {responses}
const COMBINE_PROMPT: &str = "\
Given the following original query from the user:\n{task}\n\n\
And the following responses from agents:\n{responses}\n\n\
Please combine these responses into a coherent final answer.";

pub struct Aggregator {
    llm: Arc<dyn LlmClient>,
    prompt_template: String,
}

impl Aggregator {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            prompt_template: COMBINE_PROMPT.to_string(),
        }
    }

    /// 合并响应；responses 的顺序即 StepExecutor 的发射顺序
    pub async fn combine(&self, task: &Task, responses: &[String]) -> String {
        let joined = responses.join("\n");
        let prompt = self
            .prompt_template
            .replace("{task}", &task.input)
            .replace("{responses}", &joined);

        match self.llm.complete(&[Message::user(prompt)]).await {
            Ok(combined) if !combined.trim().is_empty() => combined,
            Ok(_) => {
                tracing::warn!("aggregator returned empty text, falling back to joined responses");
                joined
            }
            Err(e) => {
                tracing::warn!(error = %e, "aggregator call failed, falling back to joined responses");
                joined
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedLlm;

    #[tokio::test]
    async fn test_prompt_preserves_emission_order() {
        let llm = Arc::new(ScriptedLlm::new(vec!["combined"]));
        let aggregator = Aggregator::new(llm.clone());
        let out = aggregator
            .combine(&Task::new("t"), &["A".into(), "B".into(), "C".into()])
            .await;
        assert_eq!(out, "combined");

        // 提示词中按发射顺序出现，而非重排
        let calls = llm.calls();
        assert!(calls[0].contains("A\nB\nC"));
    }

    #[tokio::test]
    async fn test_failure_degrades_to_joined() {
        let aggregator = Aggregator::new(Arc::new(ScriptedLlm::new(Vec::<String>::new())));
        let out = aggregator
            .combine(&Task::new("t"), &["4".into(), "Paris".into()])
            .await;
        assert_eq!(out, "4\nParis");
    }

    #[tokio::test]
    async fn test_empty_output_degrades_to_joined() {
        let aggregator = Aggregator::new(Arc::new(ScriptedLlm::new(vec!["  "])));
        let out = aggregator.combine(&Task::new("t"), &["only".into()]).await;
        assert_eq!(out, "only");
    }
}
