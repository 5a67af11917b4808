//! 工具执行器
//!
//! 持有 ToolRegistry 与全局超时，execute(tool_name, args) 在超时内调用 registry.execute；
//! 每次调用输出结构化审计日志（JSON 一行）。

use std::time::{Duration, Instant};

use tokio::time::timeout;

use crate::tools::ToolRegistry;

/// 工具执行器：对每次调用施加超时
pub struct ToolExecutor {
    registry: ToolRegistry,
    timeout: Duration,
}

impl ToolExecutor {
    pub fn new(registry: ToolRegistry, timeout_secs: u64) -> Self {
        Self {
            registry,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// 执行指定工具；超时与工具失败都以 Err(String) 表达，供上层作为 Observation 写回
    pub async fn execute(&self, tool_name: &str, args: serde_json::Value) -> Result<String, String> {
        let start = Instant::now();
        let args_preview = args_preview(&args);
        let result = timeout(self.timeout, self.registry.execute(tool_name, args)).await;

        let (ok, outcome): (bool, &str) = match &result {
            Ok(Ok(_)) => (true, "ok"),
            Ok(Err(_)) => (false, "error"),
            Err(_) => (false, "timeout"),
        };
        let duration_ms = start.elapsed().as_millis() as u64;
        let audit = serde_json::json!({
            "event": "tool_audit",
            "tool": tool_name,
            "ok": ok,
            "outcome": outcome,
            "duration_ms": duration_ms,
            "args_preview": args_preview,
        });
        tracing::info!(audit = %audit.to_string(), "tool");

        match result {
            Ok(inner) => inner,
            Err(_) => Err(format!("Tool timeout: {tool_name}")),
        }
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.registry.tool_names()
    }

    pub fn schema_json_for(&self, names: &[String]) -> String {
        self.registry.schema_json_for(names)
    }
}

fn args_preview(args: &serde_json::Value) -> String {
    let s = args.to_string();
    if s.len() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::EchoTool;

    #[tokio::test]
    async fn test_executor_passes_through() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);
        let executor = ToolExecutor::new(registry, 5);
        let out = executor
            .execute("echo", serde_json::json!({"text": "ping"}))
            .await
            .unwrap();
        assert_eq!(out, "ping");
    }

    #[tokio::test]
    async fn test_executor_unknown_tool() {
        let executor = ToolExecutor::new(ToolRegistry::new(), 5);
        assert!(executor
            .execute("nope", serde_json::Value::Null)
            .await
            .is_err());
    }
}
