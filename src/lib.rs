//! Crew - Rust 多智能体编排系统
//!
//! 模块划分：
//! - **agents**: 智能体句柄（有界重试 Worker / 工具智能体）、注册表与装配
//! - **config**: 应用配置（TOML + 环境变量）与智能体名册（YAML）加载
//! - **error**: 错误分类（计划解析 / 未知智能体 / 评估解析 / 配置 / LLM）
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / Mock / 脚本化测试桩）
//! - **observability**: 日志初始化
//! - **orchestrator**: 计划-执行-评估核心（Planner、StepExecutor、StopPolicy、Aggregator、Critic）
//! - **tools**: 工具箱（calculator、search、market、echo）与执行器

pub mod agents;
pub mod config;
pub mod error;
pub mod llm;
pub mod observability;
pub mod orchestrator;
pub mod tools;

pub use error::OrchestratorError;
