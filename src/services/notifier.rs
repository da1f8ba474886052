//! 通知服务 - 业务能力层
//!
//! 只负责"告诉用户发生了什么"，发出即忘，展示方式由实现方决定

use std::fmt;
use std::sync::Mutex;

use tracing::{debug, error, info};

/// 通知内容
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// 题库加载完成，题目数量
    DatasetLoaded(usize),
    /// 本次标记了几个正确选项
    AnswersMarked(usize),
    /// 当前题目在题库中找不到
    NoMatch,
    /// 题库加载失败
    LoadFailed(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::DatasetLoaded(n) => write!(f, "已加载 {} 道题目", n),
            Notice::AnswersMarked(n) => write!(f, "找到 {} 个正确答案", n),
            Notice::NoMatch => write!(f, "题库中没有匹配的题目"),
            Notice::LoadFailed(reason) => write!(f, "题库加载失败: {}", reason),
        }
    }
}

/// 通知接收方
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// 写入日志的通知
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match &notice {
            Notice::DatasetLoaded(_) => info!("📚 {}", notice),
            Notice::AnswersMarked(_) => info!("🎯 {}", notice),
            Notice::NoMatch => debug!("{}", notice),
            Notice::LoadFailed(_) => error!("❌ {}", notice),
        }
    }
}

/// 记录所有通知，测试中用来检查发出了哪些通知
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取出目前收到的通知
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|n| n.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        let mut notices = self
            .notices
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        notices.push(notice);
    }
}
