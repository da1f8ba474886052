//! JS 执行器 - 基础设施层
//!
//! 持有 page 资源，只暴露"执行 JS"的能力

use anyhow::{Context, Result};
use chromiumoxide::element::Element;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

/// JS 执行器
///
/// 职责：
/// - 持有 Page 资源
/// - 在页面或某个元素上执行 JS
/// - 不认识题目 / 选项
#[derive(Debug, Clone)]
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于其他操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 在页面上执行 JS 表达式并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self
            .page
            .evaluate(js_code.into())
            .await
            .context("页面脚本执行失败")?;
        Ok(result.into_value().unwrap_or(JsonValue::Null))
    }

    /// 执行 JS 并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 以元素为 `this` 调用 JS 函数，返回函数的返回值
    ///
    /// `function_declaration` 形如 `function() { ... }`
    pub async fn call_on(&self, element: &Element, function_declaration: &str) -> Result<JsonValue> {
        let returns = element
            .call_js_fn(function_declaration, false)
            .await
            .context("元素脚本执行失败")?;
        Ok(returns.result.value.unwrap_or(JsonValue::Null))
    }
}
