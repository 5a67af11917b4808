//! Search/Web 工具：抓取 URL 内容
//!
//! 仅允许配置白名单中的域名；GET 请求带超时；HTML 响应用 html2text 提取可读文本；
//! 超过 max_result_chars 时截断并追加标记。

use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::tools::Tool;

/// 从 URL 中提取 host（小写、去端口）
fn host_of(url: &str) -> Option<String> {
    let rest = url
        .trim()
        .strip_prefix("https://")
        .or_else(|| url.trim().strip_prefix("http://"))?;
    let host = rest.split('/').next()?.split(':').next()?;
    if host.is_empty() {
        None
    } else {
        Some(host.to_lowercase())
    }
}

/// 判断内容是否像 HTML
fn looks_like_html(body: &str) -> bool {
    let s = body.trim_start();
    s.starts_with("<!") || s.starts_with("<html") || s.starts_with("<HTML") || s.contains("<head")
}

pub struct SearchTool {
    client: Client,
    allowed_domains: HashSet<String>,
    max_result_chars: usize,
}

impl SearchTool {
    pub fn new(allowed_domains: Vec<String>, timeout_secs: u64, max_result_chars: usize) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .user_agent("crew/0.1 (+https://crates.io)")
            .build()
            .unwrap_or_default();
        Self {
            client,
            allowed_domains: allowed_domains.into_iter().map(|d| d.to_lowercase()).collect(),
            max_result_chars,
        }
    }

    fn check_allowed(&self, url: &str) -> Result<(), String> {
        let host = host_of(url).ok_or_else(|| "Invalid or missing URL".to_string())?;
        if self.allowed_domains.contains(&host) {
            Ok(())
        } else {
            Err(format!("Domain not in allowlist: {}", host))
        }
    }

    async fn fetch(&self, url: &str) -> Result<String, String> {
        self.check_allowed(url)?;
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;
        if !resp.status().is_success() {
            return Err(format!("HTTP {}", resp.status()));
        }
        let body = resp
            .text()
            .await
            .map_err(|e| format!("Read body: {}", e))?;

        let body = if looks_like_html(&body) {
            html2text::from_read(body.as_bytes(), 120)
                .unwrap_or_else(|_| body.clone())
        } else {
            body
        };

        if body.chars().count() > self.max_result_chars {
            Ok(body.chars().take(self.max_result_chars).collect::<String>()
                + "\n...[truncated]")
        } else {
            Ok(body)
        }
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Fetch URL content from allowlisted domains (Wikipedia, GitHub, docs.rs, MDN, arxiv, etc). Args: {\"url\": \"https://...\"}."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {"type": "string"}
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let url = args.get("url").and_then(Value::as_str).unwrap_or("").trim();
        if url.is_empty() {
            return Err("Missing url".to_string());
        }
        tracing::info!(url = %url, "search tool fetch");
        self.fetch(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool() -> SearchTool {
        SearchTool::new(vec!["en.wikipedia.org".into()], 5, 100)
    }

    #[test]
    fn test_host_extraction() {
        assert_eq!(
            host_of("https://En.Wikipedia.org:443/wiki/Paris"),
            Some("en.wikipedia.org".to_string())
        );
        assert_eq!(host_of("ftp://example.com"), None);
    }

    #[test]
    fn test_allowlist_enforced() {
        assert!(tool().check_allowed("https://en.wikipedia.org/wiki/Paris").is_ok());
        assert!(tool().check_allowed("https://evil.example.com/").is_err());
    }

    #[tokio::test]
    async fn test_missing_url_arg() {
        let err = tool().execute(serde_json::json!({})).await.unwrap_err();
        assert!(err.contains("url"));
    }
}
