use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::{AppError, AppResult};
use crate::models::Platform;

/// 连接到浏览器并获取答题页面
///
/// 优先使用已经打开的 Quizizz / Wayground 页面，找不到时新开页面并导航到 `fallback_url`
pub async fn connect_to_quiz_page(
    port: u16,
    fallback_url: Option<&str>,
) -> AppResult<(Browser, Page, Option<Platform>)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        AppError::browser_connection_failed(port, e)
    })?;
    debug!("浏览器连接成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let pages = browser.pages().await?;
    debug!("获取到 {} 个页面", pages.len());

    for p in pages.iter() {
        if let Ok(Some(url)) = p.url().await {
            debug!("检查页面: {}", url);
            if let Some(platform) = Platform::detect(&url) {
                info!("✓ 找到 {} 页面: {}", platform, url);
                return Ok((browser, p.clone(), Some(platform)));
            }
        }
    }

    let Some(url) = fallback_url else {
        return Err(AppError::Browser(crate::error::BrowserError::NoQuizPage));
    };

    debug!("未找到答题页面，创建新页面并导航到: {}", url);
    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建新页面失败: {}", e);
        e
    })?;
    page.goto(url).await.map_err(|e| {
        error!("导航到 {} 失败: {}", url, e);
        e
    })?;
    info!("已导航到: {}", url);

    Ok((browser, page, Platform::detect(url)))
}
