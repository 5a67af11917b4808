//! Crew - 多智能体编排 CLI
//!
//! 入口：解析参数（--verbose / --config / --agents-config / 任务文本），
//! 初始化日志，加载配置与名册，装配工具与智能体，执行一次编排并输出最终回答。
//! --verbose 只提升诊断日志详细度，不改变逻辑结果。

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use crew::agents::load_agents;
use crew::config::{load_config, load_roster, AppConfig};
use crew::llm::create_llm_from_config;
use crew::orchestrator::Orchestrator;
use crew::tools::build_tool_executor;

const USAGE: &str = "Usage: crew [--verbose] [--config <path>] [--agents-config <path>] <task...>";

struct CliArgs {
    verbose: bool,
    config_path: Option<PathBuf>,
    agents_path: PathBuf,
    query: String,
}

fn parse_args() -> anyhow::Result<CliArgs> {
    let mut verbose = false;
    let mut config_path = None;
    let mut agents_path = PathBuf::from("config/agents.yaml");
    let mut query_words: Vec<String> = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--verbose" => verbose = true,
            "--config" => {
                let value = args.next().context("--config requires a path")?;
                config_path = Some(PathBuf::from(value));
            }
            "--agents-config" => {
                let value = args.next().context("--agents-config requires a path")?;
                agents_path = PathBuf::from(value);
            }
            _ => query_words.push(arg),
        }
    }

    if query_words.is_empty() {
        anyhow::bail!("no task given\n{}", USAGE);
    }

    Ok(CliArgs {
        verbose,
        config_path,
        agents_path,
        query: query_words.join(" "),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = parse_args()?;
    crew::observability::init(args.verbose);

    let cfg = load_config(args.config_path.clone()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });

    let roster = load_roster(&args.agents_path)
        .with_context(|| format!("loading roster {}", args.agents_path.display()))?;

    let llm = create_llm_from_config(&cfg);
    let tools = build_tool_executor(&cfg.tools);
    let (registry, descriptors) =
        load_agents(llm.clone(), &roster, tools, &cfg.orchestrator)
            .context("assembling agents")?;

    let orchestrator = Orchestrator::new(
        llm.clone(),
        Arc::new(registry),
        descriptors,
        &cfg.orchestrator,
    )
    .context("assembling orchestrator")?;

    let (answer, verdict) = orchestrator
        .run(&args.query)
        .await
        .context("orchestration run failed")?;

    println!("{}", answer);
    if verdict.has_error {
        tracing::warn!(
            new_question = %verdict.new_question,
            explanation = %verdict.explanation,
            "final answer flagged by evaluator"
        );
    } else {
        tracing::debug!(explanation = %verdict.explanation, "final answer accepted");
    }

    let (prompt_tokens, completion_tokens, total_tokens) = llm.token_usage();
    tracing::info!(prompt_tokens, completion_tokens, total_tokens, "token usage");

    Ok(())
}
