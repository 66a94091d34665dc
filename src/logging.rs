// ==========================================
// 日志系统初始化
// ==========================================
// 基于 tracing / tracing-subscriber
// 日志级别由 RUST_LOG 环境变量控制
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 默认过滤器: 第三方库保持 warn, 本系统输出 info
const DEFAULT_FILTER: &str = "warn,reagent_tray_dss=info";

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 覆盖默认过滤器
///   例如: RUST_LOG=debug 或 RUST_LOG=reagent_tray_dss=trace
///
/// # 示例
/// ```no_run
/// use reagent_tray_dss::logging;
/// logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// 初始化测试环境的日志系统
///
/// 输出重定向到测试捕获,重复初始化静默忽略
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("reagent_tray_dss=debug"))
        .with_test_writer()
        .try_init();
}
