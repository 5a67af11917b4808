//! ToolAgent：绑定了可调用工具的智能体
//!
//! 有界 think-act-observe 循环：每轮一次 LLM 调用，输出要么是 JSON Tool Call
//! （{"tool": "...", "args": {...}}），要么是直接回答。工具结果作为 Observation 写回
//! 对话供下一轮使用；只允许调用构造时绑定的工具子集，越界调用与非法 JSON 都以
//! 反馈消息纠正而非中断。步数预算耗尽返回最后一轮输出（软成功）。

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::agents::AgentHandle;
use crate::error::OrchestratorError;
use crate::llm::{LlmClient, Message};
use crate::orchestrator::planner::extract_json_block;
use crate::tools::ToolExecutor;

/// LLM 输出的 Tool Call（简化 JSON：{"tool": "add", "args": {"x": 1, "y": 2}}）
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ToolCall {
    tool: String,
    #[serde(default)]
    args: serde_json::Value,
}

/// 单轮输出的三种形态
enum AgentOutput {
    Answer(String),
    Call(ToolCall),
    /// JSON 块存在但无法解析为 Tool Call；携带纠正提示
    Malformed(String),
}

fn parse_agent_output(output: &str) -> AgentOutput {
    let Some(json) = extract_json_block(output) else {
        return AgentOutput::Answer(output.trim().to_string());
    };
    match serde_json::from_str::<ToolCall>(json) {
        Ok(call) if !call.tool.is_empty() => AgentOutput::Call(call),
        Ok(_) => AgentOutput::Answer(output.trim().to_string()),
        Err(e) => AgentOutput::Malformed(format!(
            "Your previous output contained invalid JSON ({}). To call a tool, output exactly one JSON object of the form {{\"tool\": \"<name>\", \"args\": {{...}}}} and nothing else.",
            e
        )),
    }
}

pub struct ToolAgent {
    name: String,
    llm: Arc<dyn LlmClient>,
    executor: Arc<ToolExecutor>,
    role_prompt: String,
    /// 该智能体可用的工具名子集
    allowed_tools: Vec<String>,
    max_steps: usize,
}

impl ToolAgent {
    pub fn new(
        name: impl Into<String>,
        llm: Arc<dyn LlmClient>,
        executor: Arc<ToolExecutor>,
        role_prompt: impl Into<String>,
        allowed_tools: Vec<String>,
        max_steps: usize,
    ) -> Result<Self, OrchestratorError> {
        if max_steps == 0 {
            return Err(OrchestratorError::Config(
                "max_agent_steps must be positive".to_string(),
            ));
        }
        Ok(Self {
            name: name.into(),
            llm,
            executor,
            role_prompt: role_prompt.into(),
            allowed_tools,
            max_steps,
        })
    }

    fn system_prompt(&self) -> String {
        format!(
            "{}\n\nAvailable tools:\n{}\n\nTo call a tool, output exactly one JSON object: {{\"tool\": \"<name>\", \"args\": {{...}}}}.\nWhen you have the final answer, reply with plain text instead.",
            self.role_prompt,
            self.executor.schema_json_for(&self.allowed_tools)
        )
    }
}

#[async_trait]
impl AgentHandle for ToolAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn respond(&self, query: &str) -> Result<String, OrchestratorError> {
        let mut messages = vec![
            Message::system(self.system_prompt()),
            Message::user(query.to_string()),
        ];
        let mut last_output = String::new();

        for step in 0..self.max_steps {
            let output = self
                .llm
                .complete(&messages)
                .await
                .map_err(OrchestratorError::Llm)?;
            last_output = output.clone();

            match parse_agent_output(&output) {
                AgentOutput::Answer(answer) => {
                    tracing::debug!(agent = %self.name, step = step, "tool agent answered");
                    return Ok(answer);
                }
                AgentOutput::Call(call) => {
                    let observation = if !self.allowed_tools.iter().any(|t| t == &call.tool) {
                        tracing::warn!(agent = %self.name, tool = %call.tool, "tool not bound to agent");
                        format!(
                            "Tool '{}' is not available to this agent. Available tools: {}",
                            call.tool,
                            self.allowed_tools.join(", ")
                        )
                    } else {
                        match self.executor.execute(&call.tool, call.args).await {
                            Ok(result) => result,
                            Err(e) => format!("Error: {}", e),
                        }
                    };
                    messages.push(Message::assistant(output));
                    messages.push(Message::user(format!(
                        "Observation from {}: {}",
                        call.tool, observation
                    )));
                }
                AgentOutput::Malformed(correction) => {
                    messages.push(Message::assistant(output));
                    messages.push(Message::user(correction));
                }
            }
        }

        // 步数预算耗尽：返回最后输出
        tracing::debug!(agent = %self.name, steps = self.max_steps, "tool agent budget exhausted");
        Ok(last_output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedLlm;
    use crate::tools::{EchoTool, ToolRegistry};

    fn executor() -> Arc<ToolExecutor> {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);
        Arc::new(ToolExecutor::new(registry, 5))
    }

    fn agent(llm: Arc<ScriptedLlm>, allowed: Vec<String>, max_steps: usize) -> ToolAgent {
        ToolAgent::new("worker", llm, executor(), "You are a helper.", allowed, max_steps).unwrap()
    }

    #[test]
    fn test_zero_steps_rejected() {
        let llm = Arc::new(ScriptedLlm::new(Vec::<String>::new()));
        assert!(ToolAgent::new("w", llm, executor(), "p", vec![], 0).is_err());
    }

    #[tokio::test]
    async fn test_plain_answer_returned_directly() {
        let llm = Arc::new(ScriptedLlm::new(vec!["the capital is Paris"]));
        let out = agent(llm.clone(), vec!["echo".into()], 4)
            .respond("capital of France?")
            .await
            .unwrap();
        assert_eq!(out, "the capital is Paris");
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_tool_call_then_answer() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            r#"{"tool": "echo", "args": {"text": "hi"}}"#,
            "done: hi",
        ]));
        let out = agent(llm.clone(), vec!["echo".into()], 4)
            .respond("say hi")
            .await
            .unwrap();
        assert_eq!(out, "done: hi");
        assert_eq!(llm.call_count(), 2);

        // 第二轮提示应包含第一轮的 Observation
        let calls = llm.calls();
        assert!(calls[1].contains("Observation from echo"));
        assert!(calls[1].contains("hi"));
    }

    #[tokio::test]
    async fn test_unbound_tool_is_rejected_with_feedback() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            r#"{"tool": "shell", "args": {}}"#,
            "fine, no shell then",
        ]));
        let out = agent(llm.clone(), vec!["echo".into()], 4)
            .respond("run ls")
            .await
            .unwrap();
        assert_eq!(out, "fine, no shell then");
        assert!(llm.calls()[1].contains("not available to this agent"));
    }

    #[tokio::test]
    async fn test_budget_exhaustion_returns_last_output() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            r#"{"tool": "echo", "args": {"text": "a"}}"#,
            r#"{"tool": "echo", "args": {"text": "b"}}"#,
        ]));
        let out = agent(llm, vec!["echo".into()], 2)
            .respond("loop forever")
            .await
            .unwrap();
        assert!(out.contains("\"b\""));
    }

    #[tokio::test]
    async fn test_malformed_json_gets_correction() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            r#"{"tool": "echo", "args": }"#,
            "plain answer after correction",
        ]));
        let out = agent(llm.clone(), vec!["echo".into()], 4)
            .respond("q")
            .await
            .unwrap();
        assert_eq!(out, "plain answer after correction");
        assert!(llm.calls()[1].contains("invalid JSON"));
    }
}
