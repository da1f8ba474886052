//! 浏览器页面文档 - 基础设施层
//!
//! 用 CDP 元素句柄实现 [`QuizDom`]，修改页面的动作都是注入到元素上的小段 JS

use anyhow::Result;
use async_trait::async_trait;
use chromiumoxide::element::Element;
use chromiumoxide::Page;

use crate::dom::{
    Probe, QuizDom, HIGHLIGHT_BORDER, HIGHLIGHT_SHADOW, MARKED_ATTR, MARKER_ATTR, MARKER_STYLE,
    MARKER_TEXT,
};
use crate::infrastructure::JsExecutor;

const TEXT_CONTENT_FN: &str = "function() { return this.textContent || ''; }";

/// 真实浏览器页面
#[derive(Debug, Clone)]
pub struct PageDom {
    executor: JsExecutor,
}

impl PageDom {
    pub fn new(page: Page) -> Self {
        Self {
            executor: JsExecutor::new(page),
        }
    }
}

/// JS 字符串字面量
fn js_str(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// 删除旧标记、追加新标记、设置标记状态
fn annotate_fn() -> String {
    format!(
        r#"function() {{
    const markerAttr = {marker_attr};
    const markerText = {marker_text};
    Array.from(this.children)
        .filter(n => n.hasAttribute(markerAttr))
        .forEach(n => n.remove());
    const marker = document.createElement('span');
    marker.setAttribute(markerAttr, 'true');
    marker.style.cssText = {style};
    marker.textContent = markerText;
    this.appendChild(marker);
    this.setAttribute({marked_attr}, 'true');
}}"#,
        marker_attr = js_str(MARKER_ATTR),
        marker_text = js_str(MARKER_TEXT),
        style = js_str(MARKER_STYLE),
        marked_attr = js_str(MARKED_ATTR),
    )
}

fn highlight_fn() -> String {
    format!(
        "function() {{ this.style.border = {}; this.style.boxShadow = {}; }}",
        js_str(HIGHLIGHT_BORDER),
        js_str(HIGHLIGHT_SHADOW)
    )
}

#[async_trait]
impl QuizDom for PageDom {
    type Node = Element;

    async fn query_all(&self, probe: &Probe) -> Result<Vec<Element>> {
        Ok(self.executor.page().find_elements(probe.css()).await?)
    }

    async fn query_within(&self, scope: &Element, probe: &Probe) -> Result<Option<Element>> {
        for element in scope.find_elements(probe.css()).await? {
            if element.attribute(MARKER_ATTR).await?.is_none() {
                return Ok(Some(element));
            }
        }
        Ok(None)
    }

    async fn text_content(&self, node: &Element) -> Result<String> {
        let value = self.executor.call_on(node, TEXT_CONTENT_FN).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn is_marked(&self, node: &Element) -> Result<bool> {
        Ok(node.attribute(MARKED_ATTR).await?.as_deref() == Some("true"))
    }

    async fn annotate(&self, node: &Element) -> Result<()> {
        self.executor.call_on(node, &annotate_fn()).await?;
        Ok(())
    }

    async fn highlight(&self, node: &Element) -> Result<()> {
        self.executor.call_on(node, &highlight_fn()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_str_escapes() {
        assert_eq!(js_str("(correct answer)"), "\"(correct answer)\"");
        assert_eq!(js_str("a\"b"), "\"a\\\"b\"");
    }

    #[test]
    fn test_annotate_fn_embeds_constants() {
        let js = annotate_fn();
        assert!(js.starts_with("function() {"));
        assert!(js.contains("\"data-quiz-marker\""));
        assert!(js.contains("\"data-quiz-marked\""));
        assert!(js.contains("\"(correct answer)\""));
        assert!(highlight_fn().contains("\"2px solid #00ff00\""));
    }

    #[test]
    fn test_annotate_fn_removes_only_attributed_markers() {
        let js = annotate_fn();
        assert!(js.contains(".filter(n => n.hasAttribute(markerAttr))"));
        assert!(!js.contains("tagName"));
    }
}
