//! 邮件通知 worker
//!
//! 消费邮件主题的各分区，把账号激活记录映射为 SendGrid 动态模板邮件并发送。

pub mod config;
pub mod sendgrid;
pub mod templates;

use std::sync::Arc;

use messaging_shared::delivery::{DeliveryClient, DryRunClient};
use messaging_shared::error::MessagingError;
use messaging_shared::pipeline::NotificationPipeline;
use tracing::info;

use crate::config::EmailServiceConfig;
use crate::sendgrid::SendGridClient;
use crate::templates::{EmailMessage, EmailRenderer};

pub const SERVICE_NAME: &str = "messaging-email";

/// 按配置选择投递客户端
pub fn delivery_client(
    config: &EmailServiceConfig,
) -> Result<Arc<dyn DeliveryClient<EmailMessage>>, MessagingError> {
    if config.delivery.dry_run {
        info!("演练模式：邮件不会真正发送");
        return Ok(Arc::new(DryRunClient::<EmailMessage>::new()));
    }

    Ok(Arc::new(SendGridClient::new(
        &config.sendgrid,
        config.delivery.timeout(),
    )?))
}

/// 组装邮件处理管道
pub fn build_pipeline(
    config: &EmailServiceConfig,
) -> Result<NotificationPipeline<EmailRenderer>, MessagingError> {
    let client = delivery_client(config)?;
    Ok(NotificationPipeline::new(
        EmailRenderer::new(&config.email),
        client,
    ))
}
