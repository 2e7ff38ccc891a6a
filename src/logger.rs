use tracing_subscriber::{EnvFilter, fmt};

/// 初始化日志系统
///
/// 支持通过 RUST_LOG 环境变量控制日志级别
/// 默认级别: info
///
/// 日志写入 stderr，stdout 只保留请求报告，
/// 这样 `pingfile run a.json > out.txt` 不会混入日志。
///
/// 示例:
/// - RUST_LOG=debug pingfile run api.json
/// - RUST_LOG=pingfile=trace pingfile run -m a.json b.yaml
pub fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    tracing::debug!("Logger initialized");
}
