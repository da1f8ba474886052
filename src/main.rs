use std::path::Path;

use anyhow::Result;
use quiz_answer_overlay::app::{self, App};
use quiz_answer_overlay::config::Config;
use quiz_answer_overlay::logger;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env()?;

    // 初始化日志
    logger::init(config.verbose_logging);

    if let Some(snapshot) = config.page_snapshot.clone() {
        app::run_snapshot(&config, Path::new(&snapshot)).await?;
        return Ok(());
    }

    // 初始化并运行应用
    App::initialize(config).await?.run().await
}
