//! 日志初始化
//!
//! `RUST_LOG` 优先；未设置时默认 info，详细模式下本 crate 输出 debug

use tracing_subscriber::EnvFilter;

/// 初始化日志，重复调用时忽略
pub fn init(verbose: bool) {
    let default_directive = if verbose {
        "info,quiz_answer_overlay=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
