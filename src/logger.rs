//! 日志初始化
//!
//! `RUST_LOG` 优先；未设置时默认 `info`，开启详细日志时为 `debug`

use crate::config::Config;
use tracing_subscriber::EnvFilter;

/// 按环境变量初始化日志
pub fn init() {
    init_with(Config::from_env().verbose_logging);
}

/// 初始化日志，重复调用时忽略
pub fn init_with(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
