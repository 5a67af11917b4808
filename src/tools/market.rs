//! 行情工具：加密货币现价与法币汇率
//!
//! crypto_price 调 CoinGecko simple/price 兼容端点（?ids=<id>&vs_currencies=<cur>），
//! fx_rate 调 open.er-api.com v6 兼容端点（/latest/<BASE>，在 rates 表里取 <QUOTE>）。
//! 端点与超时来自配置，便于自建代理或测试替换。

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::tools::Tool;

fn build_client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .user_agent("crew/0.1 (+https://crates.io)")
        .build()
        .unwrap_or_default()
}

/// 加密货币现价：{"coin": "bitcoin", "currency": "usd"}
pub struct CryptoPriceTool {
    client: Client,
    base_url: String,
}

impl CryptoPriceTool {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: build_client(timeout_secs),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Tool for CryptoPriceTool {
    fn name(&self) -> &str {
        "crypto_price"
    }

    fn description(&self) -> &str {
        "Current spot price of a cryptocurrency. Args: {\"coin\": \"bitcoin\", \"currency\": \"usd\"}."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "coin": {"type": "string"},
                "currency": {"type": "string"}
            },
            "required": ["coin", "currency"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let coin = args
            .get("coin")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "Missing arg: coin".to_string())?;
        let currency = args
            .get("currency")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "Missing arg: currency".to_string())?;

        let url = format!(
            "{}?ids={}&vs_currencies={}",
            self.base_url, coin, currency
        );
        let body: Value = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?
            .json()
            .await
            .map_err(|e| format!("Bad JSON: {}", e))?;

        let price = body
            .get(&coin)
            .and_then(|c| c.get(&currency))
            .and_then(Value::as_f64)
            .ok_or_else(|| format!("No price for {} in {}", coin, currency))?;
        Ok(format!("{} {} = {} {}", 1, coin, price, currency))
    }
}

/// 法币汇率：{"base": "USD", "quote": "EUR"}
pub struct FxRateTool {
    client: Client,
    base_url: String,
}

impl FxRateTool {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: build_client(timeout_secs),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Tool for FxRateTool {
    fn name(&self) -> &str {
        "fx_rate"
    }

    fn description(&self) -> &str {
        "Foreign exchange rate between two currencies. Args: {\"base\": \"USD\", \"quote\": \"EUR\"}."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "base": {"type": "string"},
                "quote": {"type": "string"}
            },
            "required": ["base", "quote"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let base = args
            .get("base")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "Missing arg: base".to_string())?;
        let quote = args
            .get("quote")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "Missing arg: quote".to_string())?;

        let url = format!("{}/{}", self.base_url, base);
        let body: Value = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?
            .json()
            .await
            .map_err(|e| format!("Bad JSON: {}", e))?;

        let rate = body
            .get("rates")
            .and_then(|r| r.get(&quote))
            .and_then(Value::as_f64)
            .ok_or_else(|| format!("No rate for {}/{}", base, quote))?;
        Ok(format!("1 {} = {} {}", base, rate, quote))
    }
}
