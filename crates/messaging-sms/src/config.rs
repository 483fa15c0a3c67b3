//! 短信服务配置

use messaging_shared::config::{DeliveryConfig, KafkaConfig, ObservabilityConfig};
use serde::Deserialize;

/// 短信服务顶层配置
#[derive(Debug, Clone, Deserialize)]
pub struct SmsServiceConfig {
    pub service_name: String,
    #[serde(default)]
    pub kafka: KafkaConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub phone: PhoneConfig,
    #[serde(default)]
    pub nexmo: NexmoConfig,
}

/// 发送方配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PhoneConfig {
    /// 短信发送方显示名称
    pub from_name: String,
}

impl Default for PhoneConfig {
    fn default() -> Self {
        Self {
            from_name: "RSO Bicycle".to_string(),
        }
    }
}

/// Nexmo 凭据与接入点
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NexmoConfig {
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
}

impl Default for NexmoConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            base_url: "https://rest.nexmo.com".to_string(),
        }
    }
}
