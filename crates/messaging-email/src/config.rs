//! 邮件服务配置

use messaging_shared::config::{DeliveryConfig, KafkaConfig, ObservabilityConfig};
use serde::Deserialize;

/// 邮件服务顶层配置
#[derive(Debug, Clone, Deserialize)]
pub struct EmailServiceConfig {
    pub service_name: String,
    #[serde(default)]
    pub kafka: KafkaConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub email: SenderConfig,
    #[serde(default)]
    pub sendgrid: SendGridConfig,
}

/// 发件人
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    pub from_name: String,
    pub from_address: String,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            from_name: "RSO Bicycle".to_string(),
            from_address: "no-reply@rso-bicycle.local".to_string(),
        }
    }
}

/// SendGrid 凭据与接入点
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SendGridConfig {
    pub api_key: String,
    pub base_url: String,
}

impl Default for SendGridConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.sendgrid.com".to_string(),
        }
    }
}
