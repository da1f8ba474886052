//! 选项标记 - 业务能力层
//!
//! 负责在页面上找到正确选项并加标记。标记本身会修改页面、触发下一轮处理，
//! 所以同一个节点只能标记一次（见 [`MARKED_ATTR`](crate::dom::MARKED_ATTR)）

use regex::Regex;
use tracing::{debug, info, warn};

use crate::dom::{probe_all, probe_text_within, Probe, QuizDom};
use crate::models::AnswerRecord;
use crate::services::normalizer::normalize;

/// 选项容器的候选选择器
pub const OPTION_PROBES: &[Probe] = &[
    Probe::Class("option"),
    Probe::ClassContains("option-"),
    Probe::ClassContains("Option"),
    Probe::AttrContains("data-testid", "option"),
    Probe::Class("answer-choice"),
];

/// 选项容器内承载文字的元素的候选选择器
pub const OPTION_TEXT_PROBES: &[Probe] = &[
    Probe::Class("resizeable"),
    Probe::ClassContains("option-text"),
    Probe::ClassContains("optionText"),
    Probe::ClassContains("text"),
    Probe::Tag("span"),
    Probe::Tag("div"),
];

const ANNOTATION_PATTERN: &str = r"(?i)\(correct answer\)";

/// 标记正确选项
///
/// # 返回
/// 本次新标记的选项数量，已经标记过的选项不计入
pub async fn mark_options<D: QuizDom + ?Sized>(record: &AnswerRecord, dom: &D) -> usize {
    let Some(correct_texts) = record.correct_option_texts() else {
        warn!("⚠️ 题库记录缺少 answer 或 options，跳过标记");
        return 0;
    };

    let correct: Vec<String> = correct_texts
        .into_iter()
        .map(normalize)
        .filter(|t| !t.is_empty())
        .collect();

    if correct.is_empty() {
        warn!("⚠️ 题库记录没有有效的正确选项");
        return 0;
    }

    let options = match probe_all(dom, OPTION_PROBES).await {
        Ok(Some((probe, nodes))) => {
            debug!("选项命中选择器 {}，共 {} 个", probe, nodes.len());
            nodes
        }
        Ok(None) => {
            debug!("未找到选项元素");
            return 0;
        }
        Err(e) => {
            warn!("⚠️ 查找选项元素失败: {}", e);
            return 0;
        }
    };

    let annotation = Regex::new(ANNOTATION_PATTERN).ok();
    let mut marked = 0;

    for option in &options {
        match mark_single(dom, option, &correct, annotation.as_ref()).await {
            Ok(true) => marked += 1,
            Ok(false) => {}
            Err(e) => warn!("⚠️ 标记选项失败: {}", e),
        }
    }

    if marked > 0 {
        info!("✓ 标记了 {} 个正确答案", marked);
    }

    marked
}

/// 处理单个选项容器，返回是否新标记
async fn mark_single<D: QuizDom + ?Sized>(
    dom: &D,
    option: &D::Node,
    correct: &[String],
    annotation: Option<&Regex>,
) -> anyhow::Result<bool> {
    let found = probe_text_within(dom, option, OPTION_TEXT_PROBES).await?;
    let text_node = found.as_ref().unwrap_or(option);

    if dom.is_marked(text_node).await? {
        return Ok(false);
    }

    let raw = dom.text_content(text_node).await?;
    let text = normalize(&strip_annotation(&raw, annotation));

    if !correct.iter().any(|c| *c == text) {
        return Ok(false);
    }

    dom.annotate(text_node).await?;
    dom.highlight(option).await?;
    Ok(true)
}

/// 去掉之前注入的 "(correct answer)"，避免影响比较
fn strip_annotation(text: &str, annotation: Option<&Regex>) -> String {
    match annotation {
        Some(re) => re.replace_all(text, "").trim().to_string(),
        None => text.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDom, MARKED_ATTR};

    const TWO_OPTIONS: &str = r#"<html><body>
        <div class="question-text-color">What is 2+2?</div>
        <div class="option"><div class="resizeable">3</div></div>
        <div class="option"><div class="resizeable">4</div></div>
    </body></html>"#;

    fn record() -> AnswerRecord {
        AnswerRecord::new("What is 2+2?", &["3", "4"], &[1])
    }

    #[test]
    fn test_strip_annotation() {
        let re = Regex::new(ANNOTATION_PATTERN).ok();
        assert_eq!(strip_annotation(" 4 (Correct Answer) ", re.as_ref()), "4");
        assert_eq!(strip_annotation(" 4 ", None), "4");
    }

    #[test]
    fn test_marks_only_correct_option() {
        let dom = MemoryDom::parse(TWO_OPTIONS);
        let marked = tokio_test::block_on(mark_options(&record(), &dom));
        assert_eq!(marked, 1);

        let texts = dom.select(&Probe::Class("resizeable"));
        let options = dom.select(&Probe::Class("option"));
        assert_eq!(dom.attr_of(texts[0], MARKED_ATTR), None);
        assert_eq!(dom.attr_of(options[0], "style"), None);
        assert_eq!(dom.attr_of(texts[1], MARKED_ATTR).as_deref(), Some("true"));
        assert!(dom.attr_of(options[1], "style").unwrap().contains("border"));
    }

    #[test]
    fn test_marking_is_idempotent() {
        let dom = MemoryDom::parse(TWO_OPTIONS);
        assert_eq!(tokio_test::block_on(mark_options(&record(), &dom)), 1);
        assert_eq!(tokio_test::block_on(mark_options(&record(), &dom)), 0);

        let texts = dom.select(&Probe::Class("resizeable"));
        assert_eq!(dom.marker_count(texts[1]), 1);
        assert_eq!(dom.marker_count(texts[0]), 0);
    }

    #[test]
    fn test_multi_answer() {
        let dom = MemoryDom::parse(
            r#"<html><body>
                <button data-testid="option-0"><span>Red</span></button>
                <button data-testid="option-1"><span>Green</span></button>
                <button data-testid="option-2"><span>Blue</span></button>
            </body></html>"#,
        );
        let record = AnswerRecord::new("Primary colors?", &["red", "green", "BLUE"], &[0, 2]);
        assert_eq!(tokio_test::block_on(mark_options(&record, &dom)), 2);
    }

    #[test]
    fn test_container_text_fallback() {
        let dom = MemoryDom::parse(
            r#"<html><body><div class="answer-choice">Paris</div><div class="answer-choice">Rome</div></body></html>"#,
        );
        let record = AnswerRecord::new("Capital of France?", &["Rome", "Paris"], &[1]);
        assert_eq!(tokio_test::block_on(mark_options(&record, &dom)), 1);
        // 标记节点注入后，容器里的 span 不能被当成选项文字
        assert_eq!(tokio_test::block_on(mark_options(&record, &dom)), 0);

        let choices = dom.select(&Probe::Class("answer-choice"));
        assert_eq!(dom.marker_count(choices[0]), 1);
    }

    #[test]
    fn test_malformed_records_are_noops() {
        let dom = MemoryDom::parse(TWO_OPTIONS);

        let mut missing_answer = record();
        missing_answer.correct_indices = None;
        assert_eq!(tokio_test::block_on(mark_options(&missing_answer, &dom)), 0);

        let out_of_range = AnswerRecord::new("What is 2+2?", &["3", "4"], &[5, -2]);
        assert_eq!(tokio_test::block_on(mark_options(&out_of_range, &dom)), 0);

        assert!(dom.select(&Probe::AttrEquals(MARKED_ATTR, "true")).is_empty());
    }

    #[test]
    fn test_no_option_containers() {
        let dom = MemoryDom::parse("<html><body><p>Loading next question</p></body></html>");
        assert_eq!(tokio_test::block_on(mark_options(&record(), &dom)), 0);
    }
}
