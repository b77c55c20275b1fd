//! Metrics 模块
//!
//! Prometheus 导出与仓储操作指标

use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// 仓储操作总数
pub const REPOSITORY_OPERATIONS_TOTAL: &str = "catalog_repository_operations_total";
/// 仓储操作耗时（毫秒）
pub const REPOSITORY_OPERATION_DURATION_MS: &str = "catalog_repository_operation_duration_ms";

/// 安装 Prometheus recorder
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// 记录一次仓储操作
///
/// `outcome` 为 `ok` 或错误类别标签
pub fn record_repository_operation(operation: &'static str, outcome: &'static str, elapsed: Duration) {
    let labels = [("operation", operation), ("outcome", outcome)];

    counter!(REPOSITORY_OPERATIONS_TOTAL, &labels).increment(1);
    histogram!(REPOSITORY_OPERATION_DURATION_MS, &labels).record(elapsed.as_secs_f64() * 1000.0);
}
