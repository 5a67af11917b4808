//! LLM 层：客户端抽象与实现（OpenAI 兼容 / Mock / 脚本化测试桩）

pub mod mock;
pub mod openai;
pub mod traits;

use std::sync::Arc;

use crate::config::AppConfig;

pub use mock::{MockLlmClient, ScriptedLlm};
pub use openai::{OpenAiClient, TokenUsage};
pub use traits::{LlmClient, Message, Role};

/// DeepSeek 的 OpenAI 兼容端点（provider = "deepseek" 且未配置 base_url 时使用）
const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";

/// 根据配置与环境变量选择 LLM 后端（DeepSeek / OpenAI 兼容 / Mock）
pub fn create_llm_from_config(cfg: &AppConfig) -> Arc<dyn LlmClient> {
    let provider = cfg.llm.provider.to_lowercase();
    let deepseek_key = std::env::var("DEEPSEEK_API_KEY").ok();
    let openai_key = std::env::var("OPENAI_API_KEY").ok();

    if provider == "deepseek" && (deepseek_key.is_some() || openai_key.is_some()) {
        let key = deepseek_key.or(openai_key);
        let base = cfg.llm.base_url.as_deref().unwrap_or(DEEPSEEK_BASE_URL);
        tracing::info!(model = %cfg.llm.model, base_url = %base, "Using DeepSeek LLM");
        Arc::new(OpenAiClient::new(Some(base), &cfg.llm.model, key.as_deref()))
    } else if openai_key.is_some() {
        tracing::info!(model = %cfg.llm.model, "Using OpenAI-compatible LLM");
        Arc::new(OpenAiClient::new(
            cfg.llm.base_url.as_deref(),
            &cfg.llm.model,
            openai_key.as_deref(),
        ))
    } else {
        tracing::warn!("No API key set or provider unknown, using Mock LLM");
        Arc::new(MockLlmClient)
    }
}
