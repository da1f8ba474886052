//! 变化驱动的调度器
//!
//! 页面每批变化都会重置防抖计时器，计时器到期才跑一次处理流程。
//! 标记本身也会改页面，这一轮由选项上的标记状态兜住，不会无限循环

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use crate::dom::QuizDom;
use crate::workflow::{process_question, QuizSession};

/// 默认防抖延迟
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// 调度触发源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// 页面结构发生变化（一批）
    Mutation,
    /// 立即处理一次，取消等待中的防抖
    RunNow,
}

/// 调度统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStats {
    /// 处理流程运行次数
    pub runs: usize,
    /// 累计新标记的选项数
    pub marked: usize,
}

/// 变化驱动的调度器
#[derive(Debug, Clone)]
pub struct Scheduler {
    debounce: Duration,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Scheduler {
    pub fn new(debounce: Duration) -> Self {
        Self { debounce }
    }

    /// 运行调度循环
    ///
    /// 启动时先处理一次；之后按触发源调度。`shutdown` 完成或触发通道关闭时退出，
    /// 等待中的防抖计时随之丢弃
    pub async fn run<D, S>(
        &self,
        session: &QuizSession,
        dom: &D,
        mut triggers: UnboundedReceiver<Trigger>,
        shutdown: S,
    ) -> SchedulerStats
    where
        D: QuizDom + ?Sized,
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let mut stats = SchedulerStats::default();
        self.tick(session, dom, &mut stats).await;

        let mut deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    debug!("收到停止信号");
                    break;
                }
                trigger = triggers.recv() => match trigger {
                    Some(Trigger::Mutation) => {
                        deadline = Some(Instant::now() + self.debounce);
                    }
                    Some(Trigger::RunNow) => {
                        deadline = None;
                        self.tick(session, dom, &mut stats).await;
                    }
                    None => {
                        debug!("触发通道已关闭");
                        break;
                    }
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    deadline = None;
                    self.tick(session, dom, &mut stats).await;
                }
            }
        }

        info!(
            "🛑 调度器停止: 共处理 {} 次，标记 {} 个正确答案",
            stats.runs, stats.marked
        );
        stats
    }

    async fn tick<D: QuizDom + ?Sized>(
        &self,
        session: &QuizSession,
        dom: &D,
        stats: &mut SchedulerStats,
    ) {
        let result = process_question(session, dom).await;
        stats.runs += 1;
        stats.marked += result.newly_marked();
        debug!("第 {} 次处理: {:?}", stats.runs, result);
    }
}
