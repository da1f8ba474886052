//! 答题会话
//!
//! 封装一次答题期间共享的状态：题库、匹配配置、通知方。
//! 激活时创建，停止时丢弃，不使用全局变量

use std::sync::Arc;

use crate::config::Config;
use crate::models::AnswerDataset;
use crate::services::{LogNotifier, MatchingService, Notice, Notifier};

/// 答题会话
pub struct QuizSession {
    dataset: AnswerDataset,
    matcher: MatchingService,
    notifier: Arc<dyn Notifier>,
}

impl QuizSession {
    /// 创建空会话，题库为空时匹配总是失败
    pub fn new(matcher: MatchingService, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            dataset: AnswerDataset::default(),
            matcher,
            notifier,
        }
    }

    /// 按配置创建会话，通知写入日志
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            MatchingService::new(config.similarity_threshold),
            Arc::new(LogNotifier),
        )
    }

    /// 整体替换题库
    pub fn replace_dataset(&mut self, dataset: AnswerDataset) {
        self.notifier.notify(Notice::DatasetLoaded(dataset.len()));
        self.dataset = dataset;
    }

    pub fn with_dataset(mut self, dataset: AnswerDataset) -> Self {
        self.replace_dataset(dataset);
        self
    }

    pub fn dataset(&self) -> &AnswerDataset {
        &self.dataset
    }

    pub fn matcher(&self) -> &MatchingService {
        &self.matcher
    }

    pub fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }
}
