//! Planner：任务分解与计划解析
//!
//! 调用一次 LLM 得到计划文本，随后两种解析策略兜底：优先结构化 JSON
//! （{goal, steps:[{agent, subtask}]}），失败则按 `agent: subtask;` 分隔文本解析。
//! 缺分隔符或命中未知智能体的片段记录诊断后丢弃，不中断整个计划；
//! 解析出零步是合法的空计划，除非通过 require_steps 要求至少一步。

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::OrchestratorError;
use crate::llm::{LlmClient, Message};
use crate::orchestrator::{AgentDescriptor, Plan, Step, Task};

/// 计划提示词模板：{date} / {agents_list} / {task}
const PLANNER_PROMPT: &str = "\
DATE: {date}\n\n\
You are the orchestrator. At your disposal, you have the following list of agents: {agents_list}\n\
Your job is to decompose the user's task into simple steps, each to be executed by a specific agent that you can choose from the agents list.\n\
Preferred output is a JSON object of the form {\"goal\": \"...\", \"steps\": [{\"agent\": \"<agent_name>\", \"subtask\": \"<subtask>\"}]}.\n\
A plain text form is also accepted:\n\
<agent_name>: <subtask>; <agent_name>: <subtask>;\n\
EXAMPLES:\n\
mathematician: What is the square root of 16?;\n\
crypto_trader: Price of Bitcoin in USD; mathematician: Calculate price of BTC in EUR;\n\n\
TASK: {task}\n\n";

/// 从文本中提取 JSON 块（```json ... ``` 围栏或最外层花括号）
pub(crate) fn extract_json_block(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + 7..];
        return Some(
            rest.find("```")
                .map(|end| rest[..end].trim())
                .unwrap_or_else(|| rest.trim()),
        );
    }
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end > start {
        Some(&trimmed[start..=end])
    } else {
        None
    }
}

/// 解析计划文本：结构化优先，分隔文本兜底；两条路径归一化为同一 Plan 类型。
/// 无效片段（缺 `:`、未知智能体）以 warn 诊断丢弃。
pub fn parse_plan_output(raw: &str, roster: &[AgentDescriptor], goal: &str) -> Plan {
    let known: HashSet<&str> = roster.iter().map(|a| a.name.as_str()).collect();

    if let Some(json) = extract_json_block(raw) {
        if let Ok(plan) = serde_json::from_str::<Plan>(json) {
            let mut steps = Vec::with_capacity(plan.steps.len());
            for step in plan.steps {
                if known.contains(step.agent.as_str()) {
                    steps.push(step);
                } else {
                    tracing::warn!(agent = %step.agent, "dropping plan step for unknown agent");
                }
            }
            let goal = if plan.goal.is_empty() {
                goal.to_string()
            } else {
                plan.goal
            };
            return Plan { goal, steps };
        }
    }

    let mut steps = Vec::new();
    for fragment in raw.split(';') {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            continue;
        }
        match fragment.split_once(':') {
            Some((agent, subtask)) => {
                let agent = agent.trim();
                let subtask = subtask.trim();
                if !known.contains(agent) {
                    tracing::warn!(agent = %agent, "dropping plan step for unknown agent");
                    continue;
                }
                steps.push(Step {
                    agent: agent.to_string(),
                    subtask: subtask.to_string(),
                });
            }
            None => {
                tracing::warn!(fragment = %fragment, "dropping plan fragment without ':' separator");
            }
        }
    }

    Plan {
        goal: goal.to_string(),
        steps,
    }
}

/// Planner：持有 LLM 与提示词模板，decompose 将任务与名册变为有序计划
pub struct Planner {
    llm: Arc<dyn LlmClient>,
    prompt_template: String,
    /// 为 true 时零步计划视为 PlanParse 错误
    require_steps: bool,
}

impl Planner {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            prompt_template: PLANNER_PROMPT.to_string(),
            require_steps: false,
        }
    }

    pub fn with_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = template.into();
        self
    }

    pub fn with_require_steps(mut self, require: bool) -> Self {
        self.require_steps = require;
        self
    }

    /// 分解任务：一次 LLM 调用 + 防御性解析
    pub async fn decompose(
        &self,
        task: &Task,
        roster: &[AgentDescriptor],
    ) -> Result<Plan, OrchestratorError> {
        let agents_list = roster
            .iter()
            .map(|a| format!("(\"{}\", \"{}\")", a.name, a.role))
            .collect::<Vec<_>>()
            .join(", ");
        let date = chrono::Utc::now().format("%Y-%m-%d").to_string();
        let prompt = self
            .prompt_template
            .replace("{date}", &date)
            .replace("{agents_list}", &agents_list)
            .replace("{task}", &task.input);

        let raw = self
            .llm
            .complete(&[Message::user(prompt)])
            .await
            .map_err(OrchestratorError::Llm)?;
        tracing::debug!(raw = %raw, "planner output");

        let plan = parse_plan_output(&raw, roster, &task.input);
        if self.require_steps && plan.steps.is_empty() {
            return Err(OrchestratorError::PlanParse(format!(
                "no valid steps in plan output: {}",
                raw
            )));
        }
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedLlm;

    fn roster() -> Vec<AgentDescriptor> {
        vec![
            AgentDescriptor {
                name: "math".into(),
                role: "arithmetic".into(),
            },
            AgentDescriptor {
                name: "geo".into(),
                role: "geography".into(),
            },
        ]
    }

    #[test]
    fn test_delimited_preserves_count_and_order() {
        let plan = parse_plan_output("math: 2+2; geo: capital of France;", &roster(), "g");
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[0].agent, "math");
        assert_eq!(plan.steps[0].subtask, "2+2");
        assert_eq!(plan.steps[1].agent, "geo");
        assert_eq!(plan.steps[1].subtask, "capital of France");
    }

    #[test]
    fn test_delimited_drops_blank_and_malformed_fragments() {
        let plan = parse_plan_output(
            "math: 1+1; just some prose without separator; ; geo: where is Oslo;",
            &roster(),
            "g",
        );
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[1].subtask, "where is Oslo");
    }

    #[test]
    fn test_delimited_drops_unknown_agent() {
        let plan = parse_plan_output("oracle: when?; math: 2+2;", &roster(), "g");
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].agent, "math");
    }

    #[test]
    fn test_structured_form_preferred() {
        let raw = r#"Here is the plan:
```json
{"goal": "answer both", "steps": [{"agent": "math", "subtask": "2+2"}, {"agent": "geo", "subtask": "capital of France"}]}
```"#;
        let plan = parse_plan_output(raw, &roster(), "fallback goal");
        assert_eq!(plan.goal, "answer both");
        assert_eq!(plan.steps.len(), 2);
    }

    #[test]
    fn test_structured_drops_unknown_agent() {
        let raw = r#"{"steps": [{"agent": "oracle", "subtask": "when?"}, {"agent": "geo", "subtask": "Oslo"}]}"#;
        let plan = parse_plan_output(raw, &roster(), "g");
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].agent, "geo");
        // 结构化形态缺 goal 时回落到任务文本
        assert_eq!(plan.goal, "g");
    }

    #[test]
    fn test_unparseable_yields_empty_plan() {
        let plan = parse_plan_output("no separators here at all", &roster(), "g");
        assert!(plan.steps.is_empty());
    }

    #[tokio::test]
    async fn test_decompose_embeds_roster_and_task() {
        let llm = Arc::new(ScriptedLlm::new(vec!["math: 2+2;"]));
        let planner = Planner::new(llm.clone());
        let plan = planner
            .decompose(&Task::new("What is 2+2?"), &roster())
            .await
            .unwrap();
        assert_eq!(plan.steps.len(), 1);

        let calls = llm.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains("math"));
        assert!(calls[0].contains("arithmetic"));
        assert!(calls[0].contains("What is 2+2?"));
    }

    #[tokio::test]
    async fn test_decompose_require_steps() {
        let llm = Arc::new(ScriptedLlm::new(vec!["nothing to plan"]));
        let planner = Planner::new(llm).with_require_steps(true);
        let err = planner
            .decompose(&Task::new("task"), &roster())
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::PlanParse(_)));
    }

    #[tokio::test]
    async fn test_decompose_empty_plan_is_valid_by_default() {
        let llm = Arc::new(ScriptedLlm::new(vec!["nothing to plan"]));
        let planner = Planner::new(llm);
        let plan = planner
            .decompose(&Task::new("task"), &roster())
            .await
            .unwrap();
        assert!(plan.steps.is_empty());
    }
}
