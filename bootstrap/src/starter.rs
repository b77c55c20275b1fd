//! 服务启动器
//!
//! 提供统一的服务启动模式

use std::net::SocketAddr;

use axum::Router;
use config::AppConfig;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::health::health_routes;
use crate::infrastructure::Infrastructure;
use crate::runtime::{init_runtime, shutdown_signal};

/// 运行 HTTP 服务
///
/// 1. 加载配置
/// 2. 初始化运行时（日志）和 Prometheus recorder
/// 3. 校验配置并装配基础设施
/// 4. 调用闭包构建业务路由，合并 /health 与 /metrics
/// 5. 启动服务器并处理 graceful shutdown
///
/// # 示例
///
/// ```ignore
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     bootstrap::run_http("config", |infra| my_routes(infra)).await
/// }
/// ```
pub async fn run_http<F>(config_dir: &str, router_builder: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(&Infrastructure) -> Router,
{
    let config = AppConfig::load(config_dir)?;

    init_runtime(&config);

    info!("Starting {} service", config.app_name);

    let metrics_handle = match telemetry::init_metrics() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "Prometheus recorder not installed");
            None
        }
    };

    let infra = Infrastructure::from_config(&config)?;

    let app = router_builder(&infra)
        .merge(health_routes(metrics_handle))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(%addr, "HTTP server starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Service stopped");

    Ok(())
}
