//! 短信通知 worker
//!
//! 消费短信主题的各分区，把 MFA 记录渲染为短信并通过 Nexmo 发送。

pub mod config;
pub mod nexmo;
pub mod templates;

use std::sync::Arc;

use messaging_shared::delivery::{DeliveryClient, DryRunClient};
use messaging_shared::error::MessagingError;
use messaging_shared::pipeline::NotificationPipeline;
use tracing::info;

use crate::config::SmsServiceConfig;
use crate::nexmo::NexmoClient;
use crate::templates::{SmsMessage, SmsRenderer};

pub const SERVICE_NAME: &str = "messaging-sms";

/// 按配置选择投递客户端
pub fn delivery_client(
    config: &SmsServiceConfig,
) -> Result<Arc<dyn DeliveryClient<SmsMessage>>, MessagingError> {
    if config.delivery.dry_run {
        info!("演练模式：短信不会真正发送");
        return Ok(Arc::new(DryRunClient::<SmsMessage>::new()));
    }

    Ok(Arc::new(NexmoClient::new(
        &config.nexmo,
        config.delivery.timeout(),
    )?))
}

/// 组装短信处理管道
pub fn build_pipeline(
    config: &SmsServiceConfig,
) -> Result<NotificationPipeline<SmsRenderer>, MessagingError> {
    let client = delivery_client(config)?;
    Ok(NotificationPipeline::new(
        SmsRenderer::new(&config.phone),
        client,
    ))
}
