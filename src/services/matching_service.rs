/// 题目匹配服务
///
/// 负责在题库中找到与页面题干对应的记录：先精确匹配，再模糊匹配
use tracing::{debug, info};

use crate::models::{AnswerDataset, AnswerRecord};
use crate::services::normalizer::{normalize, normalize_opt};
use crate::services::similarity::similarity;

/// 默认模糊匹配阈值
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.6;

/// 匹配方式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchKind {
    /// 规范化后完全相同
    Exact,
    /// 相似度达到阈值
    Fuzzy { score: f64 },
}

/// 匹配结果，只在一次处理中有效
#[derive(Debug, Clone, Copy)]
pub struct Match<'a> {
    pub record: &'a AnswerRecord,
    /// 记录在题库中的位置
    pub index: usize,
    pub kind: MatchKind,
}

/// 题目匹配服务
#[derive(Debug, Clone)]
pub struct MatchingService {
    threshold: f64,
}

impl Default for MatchingService {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

impl MatchingService {
    /// 创建新的匹配服务
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// 找到与题干最匹配的记录
    ///
    /// # 参数
    /// - `question`: 页面上的题干原文
    /// - `dataset`: 题库
    ///
    /// # 返回
    /// 找不到足够可信的记录时返回 None
    pub fn find_best_match<'a>(
        &self,
        question: &str,
        dataset: &'a AnswerDataset,
    ) -> Option<Match<'a>> {
        let observed = normalize(question);

        // 精确匹配优先
        if let Some(found) = self.try_exact_match(&observed, dataset) {
            info!("✓ 精确匹配到第 {} 题", found.index + 1);
            return Some(found);
        }

        let found = self.try_fuzzy_match(&observed, dataset)?;
        if let MatchKind::Fuzzy { score } = found.kind {
            info!("✓ 模糊匹配到第 {} 题 (相似度: {:.2})", found.index + 1, score);
        }
        Some(found)
    }

    /// 精确匹配，题库顺序中第一个相同的记录获胜
    fn try_exact_match<'a>(&self, observed: &str, dataset: &'a AnswerDataset) -> Option<Match<'a>> {
        dataset
            .records()
            .iter()
            .enumerate()
            .find(|(_, record)| normalize_opt(record.question.as_deref()) == observed)
            .map(|(index, record)| Match {
                record,
                index,
                kind: MatchKind::Exact,
            })
    }

    /// 模糊匹配，分数相同时保留先出现的记录
    fn try_fuzzy_match<'a>(&self, observed: &str, dataset: &'a AnswerDataset) -> Option<Match<'a>> {
        let mut best: Option<(usize, &AnswerRecord, f64)> = None;

        for (index, record) in dataset.records().iter().enumerate() {
            let score = similarity(observed, &normalize_opt(record.question.as_deref()));
            if best.map_or(true, |(_, _, s)| score > s) {
                best = Some((index, record, score));
            }
        }

        let (index, record, score) = best?;
        if score >= self.threshold {
            Some(Match {
                record,
                index,
                kind: MatchKind::Fuzzy { score },
            })
        } else {
            debug!("最高相似度 {:.2} 低于阈值 {}", score, self.threshold);
            None
        }
    }
}
