//! 页面变化监听 - 基础设施层
//!
//! 在页面里挂一个 MutationObserver，每批变化通过 CDP binding 通知到 Rust 侧，
//! 转成 [`Trigger::Mutation`]。页面重新加载后自动重新挂载并请求立即处理一次

use anyhow::{Context, Result};
use chromiumoxide::cdp::browser_protocol::page::EventLoadEventFired;
use chromiumoxide::cdp::js_protocol::runtime::{AddBindingParams, EventBindingCalled};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, WeakUnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::infrastructure::JsExecutor;
use crate::orchestrator::Trigger;

/// 页面调用的 binding 名称
pub const MUTATION_BINDING: &str = "__quizHelperMutation";
const OBSERVER_SLOT: &str = "__quizHelperObserver";

fn install_script() -> String {
    format!(
        r#"(() => {{
    if (!document.body) return false;
    if (window.{slot}) window.{slot}.disconnect();
    const observer = new MutationObserver(() => {{
        if (typeof window.{binding} === 'function') window.{binding}('');
    }});
    observer.observe(document.body, {{ childList: true, subtree: true }});
    window.{slot} = observer;
    window.addEventListener('beforeunload', () => observer.disconnect(), {{ once: true }});
    return true;
}})()"#,
        slot = OBSERVER_SLOT,
        binding = MUTATION_BINDING,
    )
}

fn remove_script() -> String {
    format!(
        "(() => {{ if (window.{slot}) {{ window.{slot}.disconnect(); delete window.{slot}; }} return true; }})()",
        slot = OBSERVER_SLOT
    )
}

async fn install_observer(executor: &JsExecutor) -> Result<()> {
    let installed: bool = executor.eval_as(install_script()).await?;
    if installed {
        debug!("MutationObserver 已挂载");
    } else {
        warn!("⚠️ 页面还没有 body，MutationObserver 未挂载");
    }
    Ok(())
}

/// 页面变化监听
///
/// 持有转发任务，析构时中止；[`MutationWatch::disconnect`] 额外断开页面里的 observer。
/// 页面关闭后两个转发任务结束，触发通道随之关闭
pub struct MutationWatch {
    executor: JsExecutor,
    sender: WeakUnboundedSender<Trigger>,
    tasks: Vec<JoinHandle<()>>,
}

impl MutationWatch {
    /// 挂载监听，返回监听句柄和触发通道
    pub async fn install(page: &Page) -> Result<(Self, UnboundedReceiver<Trigger>)> {
        let executor = JsExecutor::new(page.clone());

        page.execute(AddBindingParams::new(MUTATION_BINDING))
            .await
            .context("注册页面 binding 失败")?;

        let mut bindings = page.event_listener::<EventBindingCalled>().await?;
        let mut loads = page.event_listener::<EventLoadEventFired>().await?;
        let (sender, receiver) = unbounded_channel();

        let mutation_tx = sender.clone();
        let forward = tokio::spawn(async move {
            while let Some(event) = bindings.next().await {
                if event.name == MUTATION_BINDING && mutation_tx.send(Trigger::Mutation).is_err() {
                    break;
                }
            }
            debug!("binding 事件流结束");
        });

        let reload_tx = sender.clone();
        let reload_executor = executor.clone();
        let reinstall = tokio::spawn(async move {
            while loads.next().await.is_some() {
                info!("🔄 页面重新加载，重新挂载监听");
                if let Err(e) = install_observer(&reload_executor).await {
                    warn!("⚠️ 重新挂载监听失败: {}", e);
                }
                if reload_tx.send(Trigger::RunNow).is_err() {
                    break;
                }
            }
        });

        install_observer(&executor).await?;
        info!("👀 开始监听页面变化");

        Ok((
            Self {
                executor,
                sender: sender.downgrade(),
                tasks: vec![forward, reinstall],
            },
            receiver,
        ))
    }

    /// 用于发送手动触发，不会让触发通道保持打开
    pub fn trigger_sender(&self) -> WeakUnboundedSender<Trigger> {
        self.sender.clone()
    }

    /// 断开页面里的 observer 并停止转发
    pub async fn disconnect(self) -> Result<()> {
        let result = self.executor.eval(remove_script()).await;
        info!("👋 已停止监听页面变化");
        result.map(|_| ())
    }
}

impl Drop for MutationWatch {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripts_reference_binding() {
        let install = install_script();
        assert!(install.contains("window.__quizHelperMutation('')"));
        assert!(install.contains("childList: true, subtree: true"));
        assert!(install.contains("beforeunload"));
        assert!(remove_script().contains("window.__quizHelperObserver.disconnect()"));
    }
}
