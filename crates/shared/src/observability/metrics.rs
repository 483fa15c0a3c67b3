//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。
//! 未安装 recorder 时（如单元测试）记录指标是空操作。

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::ObservabilityConfig;

/// Metrics 资源守卫
pub struct MetricsHandle {
    server_handle: tokio::task::JoinHandle<()>,
}

impl MetricsHandle {
    pub(super) fn shutdown(self) {
        self.server_handle.abort();
    }
}

/// 初始化 Prometheus 指标导出
///
/// 启动一个独立的 HTTP 服务器在指定端口暴露 `/metrics` 端点。
pub async fn init(service_name: &str, config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    register_metrics(service_name);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    let server_handle = tokio::spawn(serve(listener, handle));

    Ok(MetricsHandle { server_handle })
}

/// 描述 worker 记录的指标
///
/// 这些描述会出现在 /metrics 端点的 HELP 注释中
fn register_metrics(service_name: &str) {
    metrics::describe_counter!(
        "messages_received_total",
        "Records moved from a partition stream onto the shared queue"
    );
    metrics::describe_counter!(
        "messages_delivered_total",
        "Messages accepted by the delivery provider"
    );
    metrics::describe_counter!(
        "messages_dropped_total",
        "Messages dropped after a decode or delivery failure, or seen on the unsplit main queue"
    );
    metrics::describe_counter!(
        "partition_streams_closed_total",
        "Partition fan-in tasks that ended"
    );
    metrics::describe_histogram!(
        "delivery_duration_seconds",
        "Time from dispatch to provider acceptance in seconds"
    );

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

fn router(handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/metrics", get(move || std::future::ready(handle.render())))
        .route("/health", get(|| async { "OK" }))
}

async fn serve(listener: TcpListener, handle: PrometheusHandle) {
    if let Err(e) = axum::serve(listener, router(handle)).await {
        error!("Metrics server error: {}", e);
    }
}
