// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 核心自身不初始化日志, 由宿主进程在启动时调用
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 初始化人读格式日志
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: info）
///   例如: RUST_LOG=release_dates_engine=trace
///
/// # 示例
/// ```no_run
/// use release_dates_engine::logging;
/// logging::init();
/// ```
pub fn init() {
    fmt()
        .with_env_filter(default_filter())
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// 初始化 JSON 行格式日志 (宿主服务聚合采集用)
pub fn init_json() {
    fmt()
        .json()
        .with_env_filter(default_filter())
        .with_current_span(true)
        .init();
}

/// 初始化测试环境的日志系统 (详细级别, 写入测试捕获器)
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// 从环境变量读取过滤器, 默认 info
fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
