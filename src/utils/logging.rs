/// 日志工具模块
///
/// 提供终端输出用的横幅和文本截断
use crate::config::Config;
use tracing::info;

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 OdapClean 启动 - {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    info!("🌐 API: {}", config.api_base_url);
    info!("💾 本地存储: {}", config.storage_path);
    info!("{}", "=".repeat(60));
}

/// 做题列表开始
pub fn log_run_start(total: usize, source: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📝 开始做题: {} 共 {} 题", source, total);
    info!("{}", "=".repeat(60));
}

/// 做题列表完成
pub fn log_run_complete(solved: usize, correct: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 本轮完成: 提交 {} 题，正确 {} 题", solved, correct);
    info!("{}", "─".repeat(60));
}

/// 截断过长的文本，按字符计数
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{}...", truncated)
}
