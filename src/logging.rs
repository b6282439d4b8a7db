use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            enable_file_logs: false,
            log_dir: "./logs".to_string(),
        }
    }
}

/// stdout 留给帧报告，终端日志写 stderr
pub fn init_tracing(config: &LogConfig) -> Result<(), InitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false);

    let registry = Registry::default().with(env_filter).with(stderr_layer);

    // 全局 subscriber 已设置时 try_init 返回错误（如测试中重复初始化），忽略即可
    if config.enable_file_logs {
        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("facial-pain-monitor")
            .filename_suffix("log")
            .max_log_files(30)
            .build(&config.log_dir)?;
        let file_layer = fmt::layer()
            .with_writer(file_appender)
            .with_ansi(false)
            .json();
        if registry.with(file_layer).try_init().is_err() {
            tracing::debug!("Tracing already initialised");
        }
    } else if registry.try_init().is_err() {
        tracing::debug!("Tracing already initialised");
    }
    Ok(())
}
