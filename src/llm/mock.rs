//! Mock 与脚本化 LLM 客户端（无需 API）
//!
//! MockLlmClient 回显最后一条 User 消息，便于在没有任何 API Key 时跑通整条编排管线；
//! ScriptedLlm 按预设顺序弹出回复并记录每次收到的提示，供各组件测试做确定性断言。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{LlmClient, Message, Role};

/// Mock 客户端：回显用户最后一条消息
#[derive(Debug, Default)]
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| matches!(m.role, Role::User))
            .map(|m| m.content.as_str())
            .unwrap_or("(no input)");

        Ok(format!("Mock response to {}", last_user))
    }
}

/// 脚本化客户端：每次 complete 弹出队首回复；队列耗尽返回 Err
///
/// calls 记录每次调用时全部消息的拼接文本（"role: content" 按行），用于断言提示内容与调用次数。
#[derive(Debug, Default)]
pub struct ScriptedLlm {
    responses: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn new<S: Into<String>>(responses: Vec<S>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// 已收到的调用（每项为该次全部消息的拼接文本）
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

fn render(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| {
            let role = match m.role {
                Role::User => "user",
                Role::Assistant => "assistant",
                Role::System => "system",
            };
            format!("{}: {}", role, m.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        self.calls.lock().unwrap().push(render(messages));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| "ScriptedLlm: no more responses".to_string())
    }
}
