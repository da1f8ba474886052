//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：检查配置、连接浏览器、找到答题页面
//! 2. **题库加载**：本地文件或答题码，失败时通知并结束
//! 3. **生命周期**：挂载页面监听 → 调度器运行 → Ctrl-C 后断开监听
//! 4. **离线模式**：对保存下来的页面跑一次标记

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chromiumoxide::{Browser, Page};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::WeakUnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::browser;
use crate::clients::AnswerClient;
use crate::config::Config;
use crate::dom::MemoryDom;
use crate::error::{ConfigError, LoadError};
use crate::infrastructure::{MutationWatch, PageDom};
use crate::models::{load_answers_file, AccessCode, AnswerDataset};
use crate::orchestrator::{Scheduler, Trigger};
use crate::services::{LogNotifier, MatchingService, Notice, Notifier};
use crate::utils::logging::{log_startup, print_final_stats};
use crate::workflow::{process_question, ProcessResult, QuizSession};

/// 应用主结构
pub struct App {
    config: Config,
    _browser: Browser,
    page: Page,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        ensure_answer_source(&config)?;
        log_startup(&config);

        let (browser, page, platform) =
            browser::connect_to_quiz_page(config.browser_debug_port, Some(&config.target_url))
                .await?;

        match platform {
            Some(p) => info!("🧭 当前平台: {}", p),
            None => warn!("⚠️ 当前页面不是已知的答题平台，选择器可能无法命中"),
        }

        Ok(Self {
            config,
            _browser: browser,
            page,
        })
    }

    /// 运行应用主逻辑，直到 Ctrl-C 或页面关闭
    pub async fn run(&self) -> Result<()> {
        let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);

        let Some(dataset) = load_dataset(&self.config, notifier.as_ref()).await else {
            warn!("⚠️ 没有可用的题库，程序结束");
            return Ok(());
        };

        let session = QuizSession::new(
            MatchingService::new(self.config.similarity_threshold),
            notifier,
        )
        .with_dataset(dataset);

        let dom = PageDom::new(self.page.clone());
        let (watch, triggers) = MutationWatch::install(&self.page).await?;
        let manual = spawn_manual_trigger(watch.trigger_sender());
        info!("💡 回车可立即重新标记，Ctrl-C 退出");

        let scheduler = Scheduler::new(self.config.debounce());
        let stats = scheduler
            .run(&session, &dom, triggers, async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("⚠️ 无法监听 Ctrl-C: {}", e);
                    std::future::pending::<()>().await;
                }
            })
            .await;

        manual.abort();
        if let Err(e) = watch.disconnect().await {
            debug!("断开页面监听失败（页面可能已关闭）: {}", e);
        }

        print_final_stats(&stats);
        Ok(())
    }
}

/// 离线模式：对保存的页面跑一次处理，结果写到 `<文件名>.marked.html`
pub async fn run_snapshot(config: &Config, snapshot: &Path) -> Result<ProcessResult> {
    log_startup(config);

    let html = tokio::fs::read_to_string(snapshot)
        .await
        .with_context(|| format!("无法读取页面快照: {}", snapshot.display()))?;

    let notifier = LogNotifier;
    let dataset = load_dataset(config, &notifier).await.unwrap_or_default();
    let session = QuizSession::from_config(config).with_dataset(dataset);

    let dom = MemoryDom::parse(&html);
    let result = process_question(&session, &dom).await;
    info!("📄 快照处理结果: {:?}", result);

    let output = marked_output_path(snapshot);
    tokio::fs::write(&output, dom.to_html())
        .await
        .with_context(|| format!("无法写入标记结果: {}", output.display()))?;
    info!("结果已保存至: {}", output.display());

    Ok(result)
}

fn ensure_answer_source(config: &Config) -> Result<(), ConfigError> {
    if config.answers_file.is_none() && config.quiz_code.is_none() {
        return Err(ConfigError::NoAnswerSource);
    }
    Ok(())
}

fn marked_output_path(snapshot: &Path) -> PathBuf {
    let stem = snapshot
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    snapshot.with_file_name(format!("{}.marked.html", stem))
}

/// 加载题库，失败时发出通知并返回 None
async fn load_dataset(config: &Config, notifier: &dyn Notifier) -> Option<AnswerDataset> {
    match fetch_dataset(config).await {
        Ok(dataset) => Some(dataset),
        Err(e) => {
            notifier.notify(Notice::LoadFailed(e.to_string()));
            None
        }
    }
}

async fn fetch_dataset(config: &Config) -> Result<AnswerDataset, LoadError> {
    if let Some(path) = &config.answers_file {
        return load_answers_file(Path::new(path)).await;
    }

    let raw = config.quiz_code.as_deref().unwrap_or_default();
    let code = AccessCode::parse(raw)?;
    AnswerClient::new(config)?.fetch(&code).await
}

/// 每读到一行标准输入就请求立即处理一次
fn spawn_manual_trigger(sender: WeakUnboundedSender<Trigger>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(_)) = lines.next_line().await {
            let Some(tx) = sender.upgrade() else { break };
            if tx.send(Trigger::RunNow).is_err() {
                break;
            }
        }
    })
}
