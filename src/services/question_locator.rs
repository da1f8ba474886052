//! 题目定位 - 业务能力层
//!
//! 只负责"找到当前显示的题干"，找不到是正常情况（切题间隙、不支持的页面）

use tracing::{debug, warn};

use crate::dom::{probe_first, Probe, QuizDom};

/// 题干元素的候选选择器，按顺序尝试
pub const QUESTION_PROBES: &[Probe] = &[
    Probe::Class("question-text-color"),
    Probe::ClassContains("question-text"),
    Probe::ClassContains("questionText"),
    Probe::Class("question-content"),
    Probe::AttrEquals("data-testid", "question-text"),
];

/// 返回当前题干的原始文本
///
/// 没有任何选择器命中、或者页面访问出错时返回 None
pub async fn locate_question<D: QuizDom + ?Sized>(dom: &D) -> Option<String> {
    let (probe, node) = match probe_first(dom, QUESTION_PROBES).await {
        Ok(Some(hit)) => hit,
        Ok(None) => {
            debug!("未找到题干元素");
            return None;
        }
        Err(e) => {
            warn!("⚠️ 查找题干元素失败: {}", e);
            return None;
        }
    };

    match dom.text_content(&node).await {
        Ok(text) => {
            debug!("题干命中选择器 {}", probe);
            Some(text)
        }
        Err(e) => {
            warn!("⚠️ 读取题干文本失败: {}", e);
            None
        }
    }
}
