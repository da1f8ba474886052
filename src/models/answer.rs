//! 题库数据模型
//!
//! 外部答案数据的内存表示，加载后不再修改

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::warn;

/// 单个选项
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    #[serde(default)]
    pub text: Option<String>,
}

impl AnswerOption {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// 一道题及其正确答案
///
/// 字段都可能缺失，缺失的记录在匹配和标记时按空处理，不会报错
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// 题干原文
    #[serde(default)]
    pub question: Option<String>,

    /// 选项列表，下标与平台上的选项顺序一致
    #[serde(default)]
    pub options: Option<Vec<AnswerOption>>,

    /// 正确选项下标，支持多选
    #[serde(default, rename = "answer", alias = "correctIndices")]
    pub correct_indices: Option<Vec<i64>>,
}

impl AnswerRecord {
    /// 构造一条完整记录
    pub fn new(question: impl Into<String>, options: &[&str], correct_indices: &[i64]) -> Self {
        Self {
            question: Some(question.into()),
            options: Some(options.iter().map(|t| AnswerOption::new(*t)).collect()),
            correct_indices: Some(correct_indices.to_vec()),
        }
    }

    pub fn question_text(&self) -> &str {
        self.question.as_deref().unwrap_or_default()
    }

    /// 根据下标解析出正确选项的原文
    ///
    /// 越界、负数、缺文本、空文本的下标直接跳过；
    /// `answer` 或 `options` 缺失时返回 None
    pub fn correct_option_texts(&self) -> Option<Vec<&str>> {
        let indices = self.correct_indices.as_ref()?;
        let options = self.options.as_ref()?;

        let texts = indices
            .iter()
            .filter_map(|&i| usize::try_from(i).ok())
            .filter_map(|i| options.get(i))
            .filter_map(|opt| opt.text.as_deref())
            .filter(|t| !t.is_empty())
            .collect();

        Some(texts)
    }
}

/// 一次答题会话的题库
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerDataset {
    records: Vec<AnswerRecord>,
}

impl AnswerDataset {
    pub fn new(records: Vec<AnswerRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[AnswerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 从 `answers` 数组解析题库
    ///
    /// 逐条宽松解析，无法解析的条目记录警告后跳过
    pub fn from_answers(answers: &[JsonValue]) -> Self {
        let records = answers
            .iter()
            .enumerate()
            .filter_map(|(idx, value)| {
                match serde_json::from_value::<AnswerRecord>(value.clone()) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        warn!("⚠️ 跳过第 {} 条无法解析的题目: {}", idx + 1, e);
                        None
                    }
                }
            })
            .collect();

        Self { records }
    }
}

impl From<Vec<AnswerRecord>> for AnswerDataset {
    fn from(records: Vec<AnswerRecord>) -> Self {
        Self::new(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_correct_option_texts() {
        let record = AnswerRecord::new("Q", &["3", "4", ""], &[1, 2, 7, -1]);
        assert_eq!(record.correct_option_texts(), Some(vec!["4"]));
    }

    #[test]
    fn test_correct_option_texts_missing_fields() {
        let mut record = AnswerRecord::new("Q", &["3", "4"], &[1]);
        record.correct_indices = None;
        assert_eq!(record.correct_option_texts(), None);

        let mut record = AnswerRecord::new("Q", &["3", "4"], &[1]);
        record.options = None;
        assert_eq!(record.correct_option_texts(), None);
    }

    #[test]
    fn test_from_answers_lenient() {
        let answers = vec![
            json!({"question": "What is 2+2?", "options": [{"text": "3"}, {"text": "4"}], "answer": [1]}),
            json!("not an object"),
            json!({"question": "Only a question"}),
            json!({"question": "Alias", "options": [{"text": "a"}], "correctIndices": [0]}),
            json!({"question": null, "options": [{}], "answer": [0]}),
        ];

        let dataset = AnswerDataset::from_answers(&answers);
        assert_eq!(dataset.len(), 4);
        assert_eq!(dataset.records()[0].question_text(), "What is 2+2?");
        assert_eq!(dataset.records()[1].options, None);
        assert_eq!(dataset.records()[2].correct_indices, Some(vec![0]));
        assert_eq!(dataset.records()[3].question_text(), "");
        assert_eq!(dataset.records()[3].correct_option_texts(), Some(vec![]));
    }
}
