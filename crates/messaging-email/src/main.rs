//! 邮件通知服务
//!
//! 从 Kafka 的邮件主题消费账号激活消息，经 SendGrid 动态模板发送。

use std::sync::Arc;

use messaging_email::SERVICE_NAME;
use messaging_email::config::EmailServiceConfig;
use messaging_shared::config;
use messaging_shared::observability;
use messaging_shared::shutdown::ShutdownCoordinator;
use messaging_shared::worker::NotificationWorker;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config: EmailServiceConfig = config::load(SERVICE_NAME)?;

    let _observability = observability::init(&config.service_name, &config.observability).await?;
    info!("Starting {}...", config.service_name);

    let shutdown = ShutdownCoordinator::new();
    let _signals = shutdown.spawn_signal_listener()?;

    let pipeline = messaging_email::build_pipeline(&config)?;
    let worker = NotificationWorker::new(&config.kafka, Arc::new(pipeline))?;
    worker.run(&shutdown).await?;

    info!("{} stopped", config.service_name);
    Ok(())
}
