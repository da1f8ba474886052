//! 题目处理流程 - 流程层
//!
//! 核心职责：定义"当前这一题"的完整处理流程
//!
//! 流程顺序：
//! 1. 定位题干
//! 2. 精确 / 模糊匹配题库
//! 3. 标记正确选项
//!
//! 每一步的"找不到"都是正常结果，整个流程不会返回错误

use tracing::debug;

use crate::dom::QuizDom;
use crate::services::{locate_question, mark_options, MatchKind, Notice};
use crate::utils::logging::truncate_text;
use crate::workflow::session::QuizSession;

/// 一次处理的结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProcessResult {
    /// 题库为空
    NoDataset,
    /// 页面上没有题干
    NoQuestion,
    /// 题库中没有匹配的题目
    NoMatch,
    /// 匹配成功，`newly_marked` 为本次新标记的选项数
    Marked {
        record_index: usize,
        kind: MatchKind,
        newly_marked: usize,
    },
}

impl ProcessResult {
    /// 本次新标记的数量
    pub fn newly_marked(&self) -> usize {
        match self {
            ProcessResult::Marked { newly_marked, .. } => *newly_marked,
            _ => 0,
        }
    }
}

/// 对当前页面跑一次 定位 → 匹配 → 标记
pub async fn process_question<D: QuizDom + ?Sized>(
    session: &QuizSession,
    dom: &D,
) -> ProcessResult {
    if session.dataset().is_empty() {
        debug!("题库尚未加载");
        return ProcessResult::NoDataset;
    }

    let Some(question) = locate_question(dom).await else {
        return ProcessResult::NoQuestion;
    };
    if question.trim().is_empty() {
        return ProcessResult::NoQuestion;
    }

    debug!("处理题目: {}", truncate_text(question.trim(), 50));

    let Some(found) = session.matcher().find_best_match(&question, session.dataset()) else {
        debug!("题库中没有匹配: {}", truncate_text(question.trim(), 50));
        session.notify(Notice::NoMatch);
        return ProcessResult::NoMatch;
    };

    let newly_marked = mark_options(found.record, dom).await;
    if newly_marked > 0 {
        session.notify(Notice::AnswersMarked(newly_marked));
    }

    ProcessResult::Marked {
        record_index: found.index,
        kind: found.kind,
        newly_marked,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::dom::MemoryDom;
    use crate::models::AnswerRecord;
    use crate::services::{MatchingService, RecordingNotifier};

    fn session(notifier: Arc<RecordingNotifier>) -> QuizSession {
        QuizSession::new(MatchingService::default(), notifier)
            .with_dataset(vec![AnswerRecord::new("What is 2+2?", &["3", "4"], &[1])].into())
    }

    #[tokio::test]
    async fn test_empty_dataset() {
        let dom = MemoryDom::parse("<html><body></body></html>");
        let session = QuizSession::new(MatchingService::default(), Arc::new(RecordingNotifier::new()));
        assert_eq!(process_question(&session, &dom).await, ProcessResult::NoDataset);
    }

    #[tokio::test]
    async fn test_blank_question_text() {
        let dom = MemoryDom::parse(r#"<html><body><div class="question-content">  </div></body></html>"#);
        let session = session(Arc::new(RecordingNotifier::new()));
        assert_eq!(process_question(&session, &dom).await, ProcessResult::NoQuestion);
    }

    #[tokio::test]
    async fn test_no_match_notifies() {
        let notifier = Arc::new(RecordingNotifier::new());
        let dom = MemoryDom::parse(
            r#"<html><body><div class="question-content">Which ocean is the largest one?</div></body></html>"#,
        );
        let session = session(notifier.clone());

        assert_eq!(process_question(&session, &dom).await, ProcessResult::NoMatch);
        assert_eq!(notifier.notices().last(), Some(&Notice::NoMatch));
    }

    #[tokio::test]
    async fn test_marked_notifies_once() {
        let notifier = Arc::new(RecordingNotifier::new());
        let dom = MemoryDom::parse(
            r#"<html><body>
                <div class="question-content">What is 2+2?</div>
                <div class="option">3</div><div class="option">4</div>
            </body></html>"#,
        );
        let session = session(notifier.clone());

        let first = process_question(&session, &dom).await;
        let second = process_question(&session, &dom).await;

        assert_eq!(first.newly_marked(), 1);
        assert_eq!(second.newly_marked(), 0);
        assert_eq!(
            notifier.notices(),
            vec![Notice::DatasetLoaded(1), Notice::AnswersMarked(1)]
        );
    }
}
