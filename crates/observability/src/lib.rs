//! # Observability
//!
//! 可观测性模块：Tracing + 指标。
//!
//! ## 功能
//!
//! - Tracing 初始化 (JSON/Pretty/Compact 格式)
//! - 帧级指标记录（metrics facade）
//! - 诊断聚合与运行摘要
//!
//! ## 使用示例
//!
//! ```ignore
//! use observability::{init_logging, LoggingConfig};
//!
//! init_logging(LoggingConfig::default())?;
//!
//! // 每处理一帧记录一次指标
//! observability::record_frame_metrics(&output, &diag);
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

// Re-exports
pub use crate::metrics::{
    record_frame_dropped, record_frame_metrics, DiagnosticsAggregator, DiagnosticsSummary,
    RunningStats, StatsSummary,
};

/// 日志格式
#[derive(Debug, Clone, Copy, Default)]
pub enum LogFormat {
    /// JSON 结构化日志
    Json,
    /// 人类可读格式
    #[default]
    Pretty,
    /// 紧凑单行格式
    Compact,
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 输出格式
    pub format: LogFormat,

    /// 默认日志级别（被 RUST_LOG 环境变量覆盖）
    pub default_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            default_level: "info".to_string(),
        }
    }
}

/// 初始化 Tracing
///
/// 进程内只能调用一次；重复初始化返回错误。
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_level));

    let fmt_layer = match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Compact => fmt::layer().compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    Ok(())
}

/// 安装进程级 Prometheus 记录器（无 HTTP 端点）
///
/// 管线为同步单线程，不开监听端口；调用方持有 handle，
/// 结束时用 `handle.render()` 导出文本格式指标。
pub fn init_metrics_recorder() -> Result<PrometheusHandle> {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .context("Failed to install metrics recorder")?;

    tracing::info!("Metrics recorder installed");
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_logging_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.default_level, "info");
        assert!(matches!(config.format, LogFormat::Pretty));
    }
}
