//! 应用配置与智能体名册
//!
//! 应用配置：先读 config/default.toml，再用环境变量 `CREW__*` 覆盖（双下划线表示嵌套，
//! 如 `CREW__LLM__PROVIDER=openai`）。
//! 名册：单独的 YAML 文档（config/agents.yaml），一次编排会话加载一次，之后只读。

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::OrchestratorError;
use crate::orchestrator::AgentDescriptor;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub orchestrator: OrchestratorSection,
    #[serde(default)]
    pub tools: ToolsSection,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmSection::default(),
            orchestrator: OrchestratorSection::default(),
            tools: ToolsSection::default(),
        }
    }
}

/// [llm] 段：后端选择
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// 后端：openai / deepseek；实际选择还取决于可用的 API Key
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: None,
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

/// [orchestrator] 段：重试与步数预算
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrchestratorSection {
    /// Worker 单次回答的最大评估-重试轮数；必须为正
    pub max_iterations: usize,
    /// 工具智能体单次回答的最大 think-act 步数
    pub max_agent_steps: usize,
    /// 计划解析出零个有效步骤时是否视为错误
    pub require_steps: bool,
}

impl Default for OrchestratorSection {
    fn default() -> Self {
        Self {
            max_iterations: 3,
            max_agent_steps: 8,
            require_steps: false,
        }
    }
}

/// [tools] 段：工具超时、Search 域名白名单、行情数据端点
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    /// 单次工具调用超时（秒）
    pub tool_timeout_secs: u64,
    pub search: SearchSection,
    pub market: MarketSection,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            tool_timeout_secs: default_tool_timeout_secs(),
            search: SearchSection::default(),
            market: MarketSection::default(),
        }
    }
}

fn default_tool_timeout_secs() -> u64 {
    30
}

/// [tools.search] 段：抓取 URL 的超时、最大字符数、允许的域名白名单
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    pub timeout_secs: u64,
    pub max_result_chars: usize,
    pub allowed_domains: Vec<String>,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_search_timeout_secs(),
            max_result_chars: default_max_result_chars(),
            allowed_domains: default_allowed_domains(),
        }
    }
}

fn default_search_timeout_secs() -> u64 {
    15
}

fn default_max_result_chars() -> usize {
    8000
}

fn default_allowed_domains() -> Vec<String> {
    vec![
        "en.wikipedia.org".into(),
        "zh.wikipedia.org".into(),
        "github.com".into(),
        "raw.githubusercontent.com".into(),
        "stackoverflow.com".into(),
        "docs.rs".into(),
        "crates.io".into(),
        "doc.rust-lang.org".into(),
        "developer.mozilla.org".into(),
        "arxiv.org".into(),
        "news.ycombinator.com".into(),
        "api.coingecko.com".into(),
        "open.er-api.com".into(),
    ]
}

/// [tools.market] 段：行情工具的数据端点与超时
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketSection {
    /// 加密货币现价端点（CoinGecko simple/price 兼容）
    pub crypto_url: String,
    /// 法币汇率端点（open.er-api.com v6 兼容，base 拼在路径尾部）
    pub fx_url: String,
    pub timeout_secs: u64,
}

impl Default for MarketSection {
    fn default() -> Self {
        Self {
            crypto_url: "https://api.coingecko.com/api/v3/simple/price".to_string(),
            fx_url: "https://open.er-api.com/v6/latest".to_string(),
            timeout_secs: 15,
        }
    }
}

/// 从 config 目录加载应用配置，环境变量 CREW__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 CREW__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("CREW")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

/// 名册：一次编排会话的全部已知智能体
#[derive(Debug, Clone, Deserialize)]
pub struct RosterConfig {
    pub agents: Vec<AgentSpec>,
}

/// 名册中的单个智能体：name 为稳定唯一标识，role 为自由文本能力描述，
/// prompt 可选（缺省时由 role 生成），tools 为构造时绑定的工具标识子集
#[derive(Debug, Clone, Deserialize)]
pub struct AgentSpec {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub tools: Vec<String>,
}

impl AgentSpec {
    /// 角色提示词：显式 prompt 优先，否则从 role 合成
    pub fn role_prompt(&self) -> String {
        self.prompt
            .clone()
            .unwrap_or_else(|| format!("You are a {} assistant.", self.role))
    }
}

impl RosterConfig {
    /// 名册的 (name, role) 投影，按声明顺序，供计划提示词使用
    pub fn descriptors(&self) -> Vec<AgentDescriptor> {
        self.agents
            .iter()
            .map(|a| AgentDescriptor {
                name: a.name.clone(),
                role: a.role.clone(),
            })
            .collect()
    }

    /// 构造期校验：名册非空、名称非空且唯一
    pub fn validate(&self) -> Result<(), OrchestratorError> {
        if self.agents.is_empty() {
            return Err(OrchestratorError::Config(
                "agent roster is empty".to_string(),
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for agent in &self.agents {
            if agent.name.trim().is_empty() {
                return Err(OrchestratorError::Config(
                    "agent name must not be empty".to_string(),
                ));
            }
            if !seen.insert(agent.name.as_str()) {
                return Err(OrchestratorError::Config(format!(
                    "duplicate agent name in roster: {}",
                    agent.name
                )));
            }
        }
        Ok(())
    }
}

/// 从 YAML 文件加载并校验名册
pub fn load_roster(path: &Path) -> Result<RosterConfig, OrchestratorError> {
    let roster: RosterConfig = config::Config::builder()
        .add_source(config::File::from(path.to_path_buf()))
        .build()
        .and_then(|c| c.try_deserialize())
        .map_err(|e| {
            OrchestratorError::Config(format!("roster {}: {}", path.display(), e))
        })?;
    roster.validate()?;
    Ok(roster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.orchestrator.max_iterations, 3);
        assert_eq!(cfg.orchestrator.max_agent_steps, 8);
        assert!(!cfg.orchestrator.require_steps);
        assert_eq!(cfg.llm.provider, "openai");
    }

    #[test]
    fn test_roster_validate_duplicate() {
        let roster = RosterConfig {
            agents: vec![
                AgentSpec {
                    name: "math".into(),
                    role: "arithmetic".into(),
                    prompt: None,
                    tools: vec![],
                },
                AgentSpec {
                    name: "math".into(),
                    role: "more arithmetic".into(),
                    prompt: None,
                    tools: vec![],
                },
            ],
        };
        let err = roster.validate().unwrap_err();
        assert!(err.to_string().contains("math"));
    }

    #[test]
    fn test_roster_validate_empty() {
        let roster = RosterConfig { agents: vec![] };
        assert!(roster.validate().is_err());
    }

    #[test]
    fn test_load_roster_yaml() {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            "agents:\n  - name: math\n    role: arithmetic\n    tools: [add, multiply]\n  - name: geo\n    role: geography"
        )
        .unwrap();

        let roster = load_roster(file.path()).unwrap();
        assert_eq!(roster.agents.len(), 2);
        assert_eq!(roster.agents[0].tools, vec!["add", "multiply"]);
        assert!(roster.agents[1].tools.is_empty());

        let descriptors = roster.descriptors();
        assert_eq!(descriptors[0].name, "math");
        assert_eq!(descriptors[1].role, "geography");
    }

    #[test]
    fn test_role_prompt_fallback() {
        let spec = AgentSpec {
            name: "geo".into(),
            role: "geography".into(),
            prompt: None,
            tools: vec![],
        };
        assert!(spec.role_prompt().contains("geography"));

        let spec = AgentSpec {
            prompt: Some("You are the oracle.".into()),
            ..spec
        };
        assert_eq!(spec.role_prompt(), "You are the oracle.");
    }
}
