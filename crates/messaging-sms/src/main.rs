//! 短信通知服务
//!
//! 从 Kafka 的短信主题消费 MFA 验证码消息，渲染后经 Nexmo 发送。

use std::sync::Arc;

use messaging_shared::config;
use messaging_shared::observability;
use messaging_shared::shutdown::ShutdownCoordinator;
use messaging_shared::worker::NotificationWorker;
use messaging_sms::SERVICE_NAME;
use messaging_sms::config::SmsServiceConfig;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config: SmsServiceConfig = config::load(SERVICE_NAME)?;

    let _observability = observability::init(&config.service_name, &config.observability).await?;
    info!("Starting {}...", config.service_name);

    let shutdown = ShutdownCoordinator::new();
    let _signals = shutdown.spawn_signal_listener()?;

    let pipeline = messaging_sms::build_pipeline(&config)?;
    let worker = NotificationWorker::new(&config.kafka, Arc::new(pipeline))?;
    worker.run(&shutdown).await?;

    info!("{} stopped", config.service_name);
    Ok(())
}
