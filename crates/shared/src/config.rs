//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。
//! 各渠道服务定义自己的顶层配置结构，复用这里的公共段落与加载逻辑。

use config::{Config, Environment, File};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

/// 订阅的单个分区
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TopicPartitionConfig {
    pub name: String,
    #[serde(default)]
    pub partition_id: i32,
}

/// Kafka 配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KafkaConfig {
    pub brokers: String,
    pub client_id: String,
    /// 起始消费位置：earliest / latest
    pub start_offset: String,
    pub topics: Vec<TopicPartitionConfig>,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            client_id: "messaging".to_string(),
            start_offset: "earliest".to_string(),
            topics: Vec::new(),
        }
    }
}

/// 可观测性配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    /// 是否启用 JSON 格式日志
    pub json_logs: bool,
    pub metrics_enabled: bool,
    pub metrics_port: u16,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: true,
            metrics_port: 9090,
        }
    }
}

/// 投递配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// 演练模式：只记录日志，不调用服务商
    pub dry_run: bool,
    /// 服务商 HTTP 请求超时
    pub timeout_seconds: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            timeout_seconds: 10,
        }
    }
}

impl DeliveryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// 从配置文件和环境变量加载配置
///
/// 加载顺序（后加载的会覆盖先加载的同名配置项）：
/// 1. config/default.toml（默认配置）
/// 2. config/{environment}.toml（环境特定配置）
/// 3. config/{service_name}.toml（服务特定配置）
/// 4. 环境变量（SERVICE_ 前缀，`__` 分隔层级，如 SERVICE_KAFKA__BROKERS -> kafka.brokers）
///
/// 文件格式错误或字段类型不匹配返回 `MessagingError::Config`。
pub fn load<T: DeserializeOwned>(service_name: &str) -> Result<T> {
    let env = std::env::var("SERVICE_ENV").unwrap_or_else(|_| "development".to_string());

    let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    let config = Config::builder()
        .set_default("service_name", service_name)?
        .set_default("environment", env.clone())?
        .add_source(File::from(Path::new(&config_dir).join("default.toml")).required(false))
        .add_source(
            File::from(Path::new(&config_dir).join(format!("{}.toml", env))).required(false),
        )
        .add_source(
            File::from(Path::new(&config_dir).join(format!("{}.toml", service_name)))
                .required(false),
        )
        .add_source(
            Environment::with_prefix("SERVICE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(config.try_deserialize()?)
}
