//! 工具层：Tool trait、注册表、带超时的执行器与内置工具
//!
//! 内置：四则运算（add / subtract / multiply / divide）、search（URL 抓取）、
//! crypto_price / fx_rate（行情）、echo（离线验证）。

pub mod calculator;
pub mod echo;
pub mod executor;
pub mod market;
pub mod registry;
pub mod search;

use std::sync::Arc;

use crate::config::ToolsSection;

pub use calculator::{AddTool, DivideTool, MultiplyTool, SubtractTool};
pub use echo::EchoTool;
pub use executor::ToolExecutor;
pub use market::{CryptoPriceTool, FxRateTool};
pub use registry::{Tool, ToolRegistry};
pub use search::SearchTool;

/// 按配置装配全部内置工具
pub fn build_tool_executor(cfg: &ToolsSection) -> Arc<ToolExecutor> {
    let mut registry = ToolRegistry::new();
    registry.register(AddTool);
    registry.register(SubtractTool);
    registry.register(MultiplyTool);
    registry.register(DivideTool);
    registry.register(EchoTool);
    registry.register(SearchTool::new(
        cfg.search.allowed_domains.clone(),
        cfg.search.timeout_secs,
        cfg.search.max_result_chars,
    ));
    registry.register(CryptoPriceTool::new(
        cfg.market.crypto_url.clone(),
        cfg.market.timeout_secs,
    ));
    registry.register(FxRateTool::new(
        cfg.market.fx_url.clone(),
        cfg.market.timeout_secs,
    ));
    Arc::new(ToolExecutor::new(registry, cfg.tool_timeout_secs))
}
