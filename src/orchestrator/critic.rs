//! Critic：响应评估与裁决解析
//!
//! 对 (task, agent, query, response) 四元组做一次 LLM 调用，要求按三段式裁决返回。
//! 两种输出约定：结构化 JSON {has_error, new_question, explanation}，
//! 或分隔文本 `has_error: new_question: explanation`（最多两次切分）。
//! 解析失败不抛错：降级为 has_error=false 并把原始文本放入 explanation，让调用方继续前进。

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::OrchestratorError;
use crate::llm::{LlmClient, Message};
use crate::orchestrator::planner::extract_json_block;
use crate::orchestrator::Task;

/// 三段式裁决：是否有错、建议的新问题、解释
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub has_error: bool,
    #[serde(default)]
    pub new_question: String,
    #[serde(default)]
    pub explanation: String,
}

impl Verdict {
    /// 中性裁决：解析失败或评估不可用时的保守默认
    pub fn neutral(explanation: impl Into<String>) -> Self {
        Self {
            has_error: false,
            new_question: String::new(),
            explanation: explanation.into(),
        }
    }
}

/// 评估提示词模板：{task} / {agent} / {query} / {response}
const EVAL_PROMPT: &str = "\
Given the following question from the user:\n{task}\n\n\
The response from {agent} to the query {query} is:\n{response}\n\n\
An error means that either an exception has triggered, or the response is completely irrelevant to the question.\n\
If there is an error, suggest a modified question that will not trigger it: the question itself may be rephrased, \
or augmented with context that will help the downstream system answer it.\n\
Please evaluate the response in the following format: 'has_error: new_question: explanation'\n\
A JSON object {\"has_error\": bool, \"new_question\": \"...\", \"explanation\": \"...\"} is also accepted.";

/// 解析裁决文本：结构化优先，分隔文本兜底
pub(crate) fn parse_verdict(raw: &str) -> Result<Verdict, OrchestratorError> {
    if let Some(json) = extract_json_block(raw) {
        if let Ok(verdict) = serde_json::from_str::<Verdict>(json) {
            return Ok(verdict);
        }
    }

    // 分隔约定：最多两次切分，首段为布尔标记
    let mut parts = raw.trim().splitn(3, ':');
    let flag = parts.next().unwrap_or("").trim().to_lowercase();
    let has_error = match flag.as_str() {
        "true" | "yes" | "has_error" => true,
        "false" | "no" => false,
        _ => {
            return Err(OrchestratorError::EvaluationParse(format!(
                "unrecognized error flag: {}",
                raw
            )))
        }
    };
    let new_question = parts.next().unwrap_or("").trim().to_string();
    let explanation = parts.next().unwrap_or("").trim().to_string();
    Ok(Verdict {
        has_error,
        new_question,
        explanation,
    })
}

/// Critic：持有 LLM 与提示词模板，evaluate 返回裁决（永不失败）
pub struct Critic {
    llm: Arc<dyn LlmClient>,
    prompt_template: String,
}

impl Critic {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            prompt_template: EVAL_PROMPT.to_string(),
        }
    }

    pub fn with_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = template.into();
        self
    }

    pub async fn evaluate(
        &self,
        task: &Task,
        agent_name: &str,
        query: &str,
        response: &str,
    ) -> Verdict {
        let prompt = self
            .prompt_template
            .replace("{task}", &task.input)
            .replace("{agent}", agent_name)
            .replace("{query}", query)
            .replace("{response}", response);

        let raw = match self.llm.complete(&[Message::user(prompt)]).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(agent = %agent_name, error = %e, "evaluation call failed");
                return Verdict::neutral(format!("evaluation unavailable: {}", e));
            }
        };

        match parse_verdict(&raw) {
            Ok(verdict) => {
                tracing::debug!(agent = %agent_name, has_error = verdict.has_error, "verdict");
                verdict
            }
            Err(e) => {
                tracing::warn!(agent = %agent_name, error = %e, "verdict parse failed, degrading");
                Verdict::neutral(raw)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedLlm;

    #[test]
    fn test_parse_delimited() {
        let v = parse_verdict("true: What is 2+2 exactly?: the answer was irrelevant").unwrap();
        assert!(v.has_error);
        assert_eq!(v.new_question, "What is 2+2 exactly?");
        assert_eq!(v.explanation, "the answer was irrelevant");
    }

    #[test]
    fn test_parse_delimited_at_most_two_splits() {
        // explanation 自身含冒号，不再切分
        let v = parse_verdict("false: : all good: really").unwrap();
        assert!(!v.has_error);
        assert_eq!(v.explanation, "all good: really");
    }

    #[test]
    fn test_parse_structured() {
        let v = parse_verdict(
            r#"{"has_error": true, "new_question": "try again", "explanation": "stack trace"}"#,
        )
        .unwrap();
        assert!(v.has_error);
        assert_eq!(v.new_question, "try again");
    }

    #[test]
    fn test_parse_garbage_is_error() {
        assert!(parse_verdict("the response looks fine to me").is_err());
    }

    #[tokio::test]
    async fn test_evaluate_degrades_on_garbage() {
        let critic = Critic::new(Arc::new(ScriptedLlm::new(vec![
            "I think the response is quite good overall.",
        ])));
        let v = critic
            .evaluate(&Task::new("t"), "math", "2+2", "4")
            .await;
        assert!(!v.has_error);
        assert!(v.explanation.contains("quite good"));
    }

    #[tokio::test]
    async fn test_evaluate_degrades_on_llm_failure() {
        let critic = Critic::new(Arc::new(ScriptedLlm::new(Vec::<String>::new())));
        let v = critic.evaluate(&Task::new("t"), "math", "q", "r").await;
        assert!(!v.has_error);
        assert!(v.explanation.contains("evaluation unavailable"));
    }
}
