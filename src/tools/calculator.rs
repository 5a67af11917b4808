//! 四则运算工具：add / subtract / multiply / divide
//!
//! 参数统一为 {"x": number, "y": number}；除零是错误而非 NaN。

use async_trait::async_trait;
use serde_json::Value;

use crate::tools::Tool;

fn number_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "x": {"type": "number"},
            "y": {"type": "number"}
        },
        "required": ["x", "y"]
    })
}

fn parse_operands(args: &Value) -> Result<(f64, f64), String> {
    let x = args
        .get("x")
        .and_then(Value::as_f64)
        .ok_or_else(|| "Missing or non-numeric arg: x".to_string())?;
    let y = args
        .get("y")
        .and_then(Value::as_f64)
        .ok_or_else(|| "Missing or non-numeric arg: y".to_string())?;
    Ok((x, y))
}

fn format_result(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

pub struct AddTool;

#[async_trait]
impl Tool for AddTool {
    fn name(&self) -> &str {
        "add"
    }

    fn description(&self) -> &str {
        "Adds two numbers. Args: {\"x\": number, \"y\": number}."
    }

    fn parameters_schema(&self) -> Value {
        number_schema()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let (x, y) = parse_operands(&args)?;
        Ok(format_result(x + y))
    }
}

pub struct SubtractTool;

#[async_trait]
impl Tool for SubtractTool {
    fn name(&self) -> &str {
        "subtract"
    }

    fn description(&self) -> &str {
        "Subtracts y from x. Args: {\"x\": number, \"y\": number}."
    }

    fn parameters_schema(&self) -> Value {
        number_schema()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let (x, y) = parse_operands(&args)?;
        Ok(format_result(x - y))
    }
}

pub struct MultiplyTool;

#[async_trait]
impl Tool for MultiplyTool {
    fn name(&self) -> &str {
        "multiply"
    }

    fn description(&self) -> &str {
        "Multiplies two numbers. Args: {\"x\": number, \"y\": number}."
    }

    fn parameters_schema(&self) -> Value {
        number_schema()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let (x, y) = parse_operands(&args)?;
        Ok(format_result(x * y))
    }
}

pub struct DivideTool;

#[async_trait]
impl Tool for DivideTool {
    fn name(&self) -> &str {
        "divide"
    }

    fn description(&self) -> &str {
        "Divides x by y. Args: {\"x\": number, \"y\": number}. Division by zero is an error."
    }

    fn parameters_schema(&self) -> Value {
        number_schema()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let (x, y) = parse_operands(&args)?;
        if y == 0.0 {
            return Err("Cannot divide by zero".to_string());
        }
        Ok(format_result(x / y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add() {
        let out = AddTool
            .execute(serde_json::json!({"x": 2, "y": 2}))
            .await
            .unwrap();
        assert_eq!(out, "4");
    }

    #[tokio::test]
    async fn test_divide_by_zero() {
        let err = DivideTool
            .execute(serde_json::json!({"x": 1, "y": 0}))
            .await
            .unwrap_err();
        assert!(err.contains("zero"));
    }

    #[tokio::test]
    async fn test_fractional_result() {
        let out = DivideTool
            .execute(serde_json::json!({"x": 10, "y": 4}))
            .await
            .unwrap();
        assert_eq!(out, "2.5");
    }

    #[tokio::test]
    async fn test_missing_operand() {
        let err = MultiplyTool
            .execute(serde_json::json!({"x": 3}))
            .await
            .unwrap_err();
        assert!(err.contains("y"));
    }
}
