//! 工具注册表
//!
//! 所有工具实现 Tool trait（name / description / parameters_schema / execute），
//! 由 ToolRegistry 按名注册与查找；ToolExecutor 在调用时加超时并输出审计日志。
//! 工具失败表达为 Err(String)，上层作为 Observation 写回对话，不进入编排错误分类。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

/// 工具 trait：名称、描述（供 LLM 理解）、参数 schema、异步执行（args 为 JSON）
#[async_trait]
pub trait Tool: Send + Sync {
    /// 工具名称（用于 JSON 中的 "tool" 字段）
    fn name(&self) -> &str;

    /// 工具描述（供 LLM 理解功能）
    fn description(&self) -> &str;

    /// 参数 JSON Schema（供 LLM 生成正确的参数格式）
    /// 默认返回空对象，表示无参数或参数格式不限
    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    /// 执行工具
    async fn execute(&self, args: Value) -> Result<String, String>;
}

/// 工具注册表：按名称存储 Arc<dyn Tool>
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: impl Tool + 'static) {
        let name = tool.name().to_string();
        self.tools.insert(name, Arc::new(tool));
    }

    pub async fn execute(&self, name: &str, args: Value) -> Result<String, String> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| format!("Unknown tool: {name}"))?;
        tool.execute(args).await
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// 生成指定工具子集的 schema JSON，供 ToolAgent 的 system prompt 使用；
    /// 子集中未注册的名称直接跳过（装配期已校验）
    pub fn schema_json_for(&self, names: &[String]) -> String {
        let tools: Vec<Value> = names
            .iter()
            .filter_map(|name| self.tools.get(name).map(|tool| (name, tool)))
            .map(|(name, tool)| {
                serde_json::json!({
                    "name": name,
                    "description": tool.description(),
                    "parameters": tool.parameters_schema()
                })
            })
            .collect();
        serde_json::to_string_pretty(&tools).unwrap_or_else(|_| "[]".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::EchoTool;

    #[tokio::test]
    async fn test_register_and_execute() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);
        let out = registry
            .execute("echo", serde_json::json!({"text": "hi"}))
            .await
            .unwrap();
        assert_eq!(out, "hi");
    }

    #[tokio::test]
    async fn test_unknown_tool_errors() {
        let registry = ToolRegistry::new();
        let err = registry.execute("ghost", Value::Null).await.unwrap_err();
        assert!(err.contains("ghost"));
    }

    #[test]
    fn test_schema_subset() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);
        let schema = registry.schema_json_for(&["echo".to_string(), "missing".to_string()]);
        assert!(schema.contains("\"echo\""));
        assert!(!schema.contains("missing"));
    }
}
